use std::fmt;
use std::rc::Rc;

use crate::activities::{Activity, ActivityParamSet};
use crate::animation::element::ElementRef;
use crate::events::event::EventBase;
use crate::events::{EventRef, TimerEventQueue, WakeupEvent};
use crate::foundation::ids::ActivityId;
use crate::timing::ElapsedTime;

/// Map linear progress through the acceleration and deceleration phases.
///
/// `t` is clamped to `[0, 1]`. Fractions whose sum exceeds 1 are ignored.
pub fn calc_accelerated_time(t: f64, acceleration: f64, deceleration: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let (a, d) = (acceleration, deceleration);
    if !((a > 0.0 || d > 0.0) && a + d <= 1.0) {
        return t;
    }

    let c = 1.0 - 0.5 * a - 0.5 * d;
    let mut tp = 0.0;
    if t < a {
        tp += 0.5 * t * t / a;
    } else {
        tp += 0.5 * a;
        if t <= 1.0 - d {
            tp += t - a;
        } else {
            tp += 1.0 - a - d;
            let rel = t - 1.0 + d;
            tp += rel - 0.5 * rel * rel / d;
        }
    }
    tp / c
}

/// State shared by every activity kind: identity, target, end event and the active flag.
#[derive(Debug)]
pub struct ActivityCore {
    id: ActivityId,
    end_event: Option<EventRef>,
    target: Option<ElementRef>,
    first_perform: bool,
    active: bool,
}

impl ActivityCore {
    pub fn new(end_event: Option<EventRef>) -> Self {
        Self {
            id: ActivityId::next(),
            end_event,
            target: None,
            first_perform: true,
            active: true,
        }
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_disposed(&self) -> bool {
        !self.active && self.end_event.is_none()
    }

    pub fn target(&self) -> Option<&ElementRef> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: ElementRef) {
        self.target = Some(target);
    }

    pub fn activate(&mut self, end_event: EventRef) {
        self.end_event = Some(end_event);
        self.first_perform = true;
        self.active = true;
    }

    /// `true` exactly once per activation, on the first step while active.
    pub fn take_first_perform(&mut self) -> bool {
        if self.active && self.first_perform {
            self.first_perform = false;
            true
        } else {
            false
        }
    }

    pub fn end_activity(&mut self, events: &mut TimerEventQueue) {
        self.active = false;
        if let Some(event) = self.end_event.take() {
            events.push(event);
        }
    }

    pub fn dispose(&mut self) {
        self.active = false;
        if let Some(event) = self.end_event.take() {
            event.dispose();
        }
    }
}

/// Value computation plugged into the continuous and discrete drivers.
pub trait AnimationHooks: fmt::Debug {
    fn start_animation(&mut self, target: Option<&ElementRef>);

    fn end_animation(&mut self);

    /// Apply the final value when the activity is ended before running out.
    fn perform_end(&mut self, auto_reverse: bool);

    /// Put the element into its initial state before the first frame.
    fn init_animated_element(&mut self) {}

    fn perform_continuous(&mut self, _t: f64, _repeat: u32) {}

    fn perform_key_frame(&mut self, _index: usize, _lerp: f64, _repeat: u32) {}

    fn perform_discrete(&mut self, _frame: usize, _repeat: u32) {}
}

/// Locates the key-time segment containing the current progress.
#[derive(Debug, Clone)]
pub struct KeyStopLerp {
    key_stops: Vec<f64>,
    last_index: usize,
    upper_bound: usize,
    distance: f64,
}

impl KeyStopLerp {
    pub fn new(key_stops: Vec<f64>) -> Self {
        let upper_bound = key_stops.len().saturating_sub(2);
        let mut lerp = Self {
            key_stops,
            last_index: 0,
            upper_bound,
            distance: 0.0,
        };
        lerp.reset();
        lerp
    }

    pub fn reset(&mut self) {
        self.last_index = 0;
        self.distance = self.segment_distance(0);
    }

    fn segment_distance(&self, index: usize) -> f64 {
        match (self.key_stops.get(index), self.key_stops.get(index + 1)) {
            (Some(a), Some(b)) if b - a > 0.0 => b - a,
            _ => 0.001,
        }
    }

    /// `(segment index, fraction inside the segment)` for `alpha`.
    pub fn lerp(&mut self, alpha: f64) -> (usize, f64) {
        if self.key_stops.len() < 2 {
            return (0, 0.0);
        }
        while self.last_index < self.upper_bound && alpha > self.key_stops[self.last_index + 1] {
            self.last_index += 1;
            self.distance = self.segment_distance(self.last_index);
        }
        let raw = (alpha - self.key_stops[self.last_index]) / self.distance;
        (self.last_index, raw.clamp(0.0, 1.0))
    }
}

/// Time-driven activity: every step maps the elapsed time to a simple time in `[0, 1]`.
#[derive(Debug)]
pub struct ContinuousActivity<H> {
    core: ActivityCore,
    timer: ElapsedTime,
    min_duration: f64,
    min_frame_count: f64,
    perform_calls: u32,
    repeat_count: Option<f64>,
    auto_reverse: bool,
    acceleration: f64,
    deceleration: f64,
    lerper: Option<KeyStopLerp>,
    hooks: H,
}

impl<H: AnimationHooks> ContinuousActivity<H> {
    pub fn new(params: &ActivityParamSet, hooks: H) -> Self {
        Self {
            core: ActivityCore::new(params.end_event.clone()),
            timer: ElapsedTime::child_of(&params.timer),
            min_duration: params.min_duration,
            min_frame_count: params.min_frame_count,
            perform_calls: 0,
            repeat_count: params.repeat_count,
            auto_reverse: params.auto_reverse,
            acceleration: params.acceleration,
            deceleration: params.deceleration,
            lerper: None,
            hooks,
        }
    }

    /// Key-time variant: progress is split into the segments of `params.discrete_times`.
    pub fn with_key_times(params: &ActivityParamSet, hooks: H) -> Self {
        let mut activity = Self::new(params, hooks);
        activity.lerper = Some(KeyStopLerp::new(params.discrete_times.clone()));
        activity
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn perform_calls(&self) -> u32 {
        self.perform_calls
    }

    fn start_animation(&mut self) {
        self.timer.reset();
        self.hooks.start_animation(self.core.target());
    }

    fn simple_perform(&mut self, simple_time: f64, repeat: u32) {
        let alpha = calc_accelerated_time(simple_time, self.acceleration, self.deceleration);
        match &mut self.lerper {
            Some(lerper) => {
                let (index, lerp) = lerper.lerp(alpha);
                self.hooks.perform_key_frame(index, lerp, repeat);
            }
            None => self.hooks.perform_continuous(alpha, repeat),
        }
    }
}

impl<H: AnimationHooks> Activity for ContinuousActivity<H> {
    fn id(&self) -> ActivityId {
        self.core.id()
    }

    fn activate(&mut self, end_event: EventRef) {
        self.core.activate(end_event);
        self.perform_calls = 0;
        if let Some(lerper) = &mut self.lerper {
            lerper.reset();
        }
    }

    fn perform(&mut self, events: &mut TimerEventQueue) -> bool {
        if !self.core.is_active() {
            return false;
        }
        if self.core.take_first_perform() {
            self.start_animation();
        }

        let mut t = self.timer.elapsed() / self.min_duration;
        let mut ending = false;
        if let Some(count) = self.repeat_count {
            let effective = if self.auto_reverse { 2.0 * count } else { count };
            if effective <= t {
                ending = true;
                t = effective;
            }
        }

        let (repeat, simple_time) = if self.auto_reverse {
            let repeats = t.floor();
            let fraction = t - repeats;
            let repeats = repeats as u32;
            let simple = if repeats % 2 == 1 {
                1.0 - fraction
            } else {
                fraction
            };
            (repeats / 2, simple)
        } else {
            let mut repeats = t.floor();
            let mut simple = t - repeats;
            if let Some(count) = self.repeat_count
                && repeats >= count
            {
                simple = 1.0;
                repeats -= 1.0;
            }
            (repeats.max(0.0) as u32, simple)
        };

        self.simple_perform(simple_time, repeat);
        if ending {
            self.core.end_activity(events);
        }
        self.perform_calls += 1;
        self.core.is_active()
    }

    fn calc_time_lag(&mut self) -> f64 {
        if self.core.take_first_perform() {
            self.start_animation();
        }
        if !self.core.is_active() {
            return 0.0;
        }
        let elapsed_fraction = self.timer.elapsed() / self.min_duration;
        let required_fraction = f64::from(self.perform_calls) / self.min_frame_count;
        if elapsed_fraction < required_fraction {
            0.0
        } else {
            (elapsed_fraction - required_fraction) * self.min_duration
        }
    }

    fn is_active(&self) -> bool {
        self.core.is_active()
    }

    fn dequeued(&mut self) {
        if !self.core.is_active() {
            self.hooks.end_animation();
        }
    }

    fn end(&mut self, events: &mut TimerEventQueue) {
        if !self.core.is_active() || self.core.is_disposed() {
            return;
        }
        if self.core.take_first_perform() {
            self.start_animation();
        }
        self.hooks.perform_end(self.auto_reverse);
        self.hooks.end_animation();
        self.core.end_activity(events);
    }

    fn dispose(&mut self) {
        self.core.dispose();
    }

    fn set_targets(&mut self, target: ElementRef) {
        self.core.set_target(target);
        self.hooks.init_animated_element();
    }
}

/// Frame-stepped activity: shows one discrete value per key time, woken by a [`WakeupEvent`].
#[derive(Debug)]
pub struct DiscreteActivity<H> {
    core: ActivityCore,
    wakeup: Rc<WakeupEvent>,
    discrete_times: Vec<f64>,
    min_duration: f64,
    perform_calls: usize,
    repeat_count: Option<f64>,
    auto_reverse: bool,
    acceleration: f64,
    deceleration: f64,
    hooks: H,
}

impl<H: AnimationHooks> DiscreteActivity<H> {
    pub fn new(params: &ActivityParamSet, hooks: H) -> Self {
        let wakeup = params
            .wakeup_event
            .clone()
            .unwrap_or_else(|| Rc::new(WakeupEvent::new(&params.timer)));
        let discrete_times = if params.discrete_times.is_empty() {
            vec![0.0]
        } else {
            params.discrete_times.clone()
        };
        let core = ActivityCore::new(params.end_event.clone());
        wakeup.set_activity(core.id());
        Self {
            core,
            wakeup,
            discrete_times,
            min_duration: params.min_duration,
            perform_calls: 0,
            repeat_count: params.repeat_count,
            auto_reverse: params.auto_reverse,
            acceleration: params.acceleration,
            deceleration: params.deceleration,
            hooks,
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn frame_index(&self, calls: usize) -> usize {
        let n = self.discrete_times.len();
        if self.auto_reverse {
            let index = calls % (2 * n);
            if index >= n {
                (2 * n - index).min(n - 1)
            } else {
                index
            }
        } else {
            calls % n
        }
    }

    fn repeat_index(&self, calls: usize) -> usize {
        let n = self.discrete_times.len();
        if self.auto_reverse {
            calls / (2 * n)
        } else {
            calls / n
        }
    }

    fn start_animation(&mut self) {
        self.wakeup.start();
        self.hooks.start_animation(self.core.target());
    }
}

impl<H: AnimationHooks> Activity for DiscreteActivity<H> {
    fn id(&self) -> ActivityId {
        self.core.id()
    }

    fn activate(&mut self, end_event: EventRef) {
        self.core.activate(end_event);
        self.wakeup.set_next_timeout(0.0);
        self.perform_calls = 0;
        self.wakeup.set_activity(self.core.id());
    }

    fn perform(&mut self, events: &mut TimerEventQueue) -> bool {
        if !self.core.is_active() {
            return false;
        }
        if self.core.take_first_perform() {
            self.start_animation();
        }

        let n = self.discrete_times.len();
        let frame = self.frame_index(self.perform_calls);
        let repeat = self.repeat_index(self.perform_calls);
        self.hooks
            .perform_discrete(frame, u32::try_from(repeat).unwrap_or(u32::MAX));

        self.perform_calls += 1;
        let mut current_repeat = self.perform_calls as f64 / n as f64;
        if self.auto_reverse {
            current_repeat /= 2.0;
        }

        let more = match self.repeat_count {
            None => true,
            Some(count) => current_repeat < count,
        };
        if more {
            let next = self.frame_index(self.perform_calls);
            let next_time = self.min_duration
                * (self.repeat_index(self.perform_calls) as f64
                    + calc_accelerated_time(
                        self.discrete_times[next],
                        self.acceleration,
                        self.deceleration,
                    ));
            self.wakeup.set_next_timeout(next_time);
            events.push(self.wakeup.clone());
        } else {
            self.core.end_activity(events);
        }
        false
    }

    fn calc_time_lag(&mut self) -> f64 {
        if self.core.take_first_perform() {
            self.start_animation();
        }
        0.0
    }

    fn is_active(&self) -> bool {
        self.core.is_active()
    }

    fn dequeued(&mut self) {
        if !self.core.is_active() {
            self.hooks.end_animation();
        }
    }

    fn end(&mut self, events: &mut TimerEventQueue) {
        if !self.core.is_active() || self.core.is_disposed() {
            return;
        }
        if self.core.take_first_perform() {
            self.start_animation();
        }
        self.hooks.perform_end(self.auto_reverse);
        self.hooks.end_animation();
        self.core.end_activity(events);
    }

    fn dispose(&mut self) {
        self.core.dispose();
        self.wakeup.dispose();
    }

    fn set_targets(&mut self, target: ElementRef) {
        self.core.set_target(target);
        self.hooks.init_animated_element();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activities/base.rs"]
mod tests;
