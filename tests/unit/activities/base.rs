use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Vec2;

use super::*;
use crate::events::{EventAction, make_event};
use crate::timing::ManualClock;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start,
    End,
    PerformEnd(bool),
    Continuous(f64, u32),
    KeyFrame(usize, f64, u32),
    Discrete(usize, u32),
}

#[derive(Debug, Default, Clone)]
struct Recorder(Rc<RefCell<Vec<Call>>>);

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }
}

impl AnimationHooks for Recorder {
    fn start_animation(&mut self, _target: Option<&ElementRef>) {
        self.0.borrow_mut().push(Call::Start);
    }
    fn end_animation(&mut self) {
        self.0.borrow_mut().push(Call::End);
    }
    fn perform_end(&mut self, auto_reverse: bool) {
        self.0.borrow_mut().push(Call::PerformEnd(auto_reverse));
    }
    fn perform_continuous(&mut self, t: f64, repeat: u32) {
        self.0.borrow_mut().push(Call::Continuous(t, repeat));
    }
    fn perform_key_frame(&mut self, index: usize, lerp: f64, repeat: u32) {
        self.0.borrow_mut().push(Call::KeyFrame(index, lerp, repeat));
    }
    fn perform_discrete(&mut self, frame: usize, repeat: u32) {
        self.0.borrow_mut().push(Call::Discrete(frame, repeat));
    }
}

fn setup() -> (ManualClock, TimerEventQueue, ActivityParamSet) {
    let clock = ManualClock::new();
    let timer = ElapsedTime::new(Rc::new(clock.clone()));
    let events = TimerEventQueue::new(timer.clone());
    let mut params = ActivityParamSet::new(timer, Vec2::new(100.0, 100.0));
    params.min_duration = 1.0;
    (clock, events, params)
}

#[test]
fn acceleration_law() {
    assert_eq!(calc_accelerated_time(0.5, 0.0, 0.0), 0.5);
    assert_eq!(calc_accelerated_time(1.5, 0.0, 0.0), 1.0);
    assert!((calc_accelerated_time(0.5, 0.5, 0.5) - 0.5).abs() < 1e-12);
    assert!((calc_accelerated_time(1.0, 0.3, 0.3) - 1.0).abs() < 1e-12);
    assert!(calc_accelerated_time(0.1, 0.5, 0.0) < 0.1);
    // fractions summing above one are ignored
    assert_eq!(calc_accelerated_time(0.25, 0.8, 0.8), 0.25);
}

#[test]
fn key_stop_lerp_walks_segments() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.5, 1.0]);
    assert_eq!(lerp.lerp(0.25), (0, 0.5));
    assert_eq!(lerp.lerp(0.75), (1, 0.5));
    assert_eq!(lerp.lerp(1.0), (1, 1.0));
    lerp.reset();
    assert_eq!(lerp.lerp(0.0), (0, 0.0));
}

#[test]
fn key_stop_lerp_skips_empty_segments() {
    let mut lerp = KeyStopLerp::new(vec![0.0, 0.5, 0.5, 1.0]);
    let (index, t) = lerp.lerp(0.75);
    assert_eq!(index, 2);
    assert!((t - 0.5).abs() < 1e-12);
}

#[test]
fn continuous_activity_runs_to_its_end_event() {
    let (clock, mut events, params) = setup();
    let hooks = Recorder::default();
    let mut activity = ContinuousActivity::new(&params, hooks.clone());
    activity.activate(make_event(EventAction::Marker(1)));

    assert_eq!(activity.calc_time_lag(), 0.0);
    clock.set(0.5);
    assert!(activity.perform(&mut events));
    clock.set(1.2);
    assert!(!activity.perform(&mut events));
    assert!(!activity.is_active());

    assert_eq!(
        hooks.calls(),
        vec![Call::Start, Call::Continuous(0.5, 0), Call::Continuous(1.0, 0)]
    );
    assert_eq!(events.force_empty(), vec![EventAction::Marker(1)]);

    activity.dequeued();
    assert_eq!(hooks.calls().last(), Some(&Call::End));
}

#[test]
fn time_lag_enforces_minimal_frame_count() {
    let (clock, _events, mut params) = setup();
    params.min_frame_count = 10.0;
    let mut activity = ContinuousActivity::new(&params, Recorder::default());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();
    clock.set(0.5);
    assert!((activity.calc_time_lag() - 0.5).abs() < 1e-12);
}

#[test]
fn auto_reverse_plays_back_to_start() {
    let (clock, mut events, mut params) = setup();
    params.auto_reverse = true;
    let hooks = Recorder::default();
    let mut activity = ContinuousActivity::new(&params, hooks.clone());
    activity.activate(make_event(EventAction::Marker(2)));
    activity.calc_time_lag();

    clock.set(1.5);
    assert!(activity.perform(&mut events));
    clock.set(2.5);
    assert!(!activity.perform(&mut events));
    assert_eq!(
        hooks.calls()[1..],
        [Call::Continuous(0.5, 0), Call::Continuous(0.0, 1)]
    );
}

#[test]
fn ending_early_applies_the_final_value() {
    let (_clock, mut events, params) = setup();
    let hooks = Recorder::default();
    let mut activity = ContinuousActivity::new(&params, hooks.clone());
    activity.activate(make_event(EventAction::Marker(3)));
    activity.end(&mut events);
    activity.end(&mut events);
    assert_eq!(
        hooks.calls(),
        vec![Call::Start, Call::PerformEnd(false), Call::End]
    );
    assert_eq!(events.len(), 1);
}

#[test]
fn key_time_activity_reports_segments() {
    let (clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 0.5, 1.0];
    let hooks = Recorder::default();
    let mut activity = ContinuousActivity::with_key_times(&params, hooks.clone());
    activity.activate(make_event(EventAction::Marker(4)));
    activity.calc_time_lag();
    clock.set(0.75);
    activity.perform(&mut events);
    assert_eq!(hooks.calls()[1], Call::KeyFrame(1, 0.5, 0));
}

#[test]
fn discrete_activity_wakes_for_each_frame() {
    let (clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 0.5];
    let hooks = Recorder::default();
    let mut activity = DiscreteActivity::new(&params, hooks.clone());
    activity.activate(make_event(EventAction::Marker(5)));
    activity.calc_time_lag();

    assert!(!activity.perform(&mut events));
    assert!((events.next_timeout() - 0.5).abs() < 1e-12);
    clock.set(0.5);
    assert_eq!(events.process(), vec![EventAction::WakeActivity(activity.id())]);

    assert!(!activity.perform(&mut events));
    assert!(!activity.is_active());
    assert_eq!(
        hooks.calls(),
        vec![Call::Start, Call::Discrete(0, 0), Call::Discrete(1, 0)]
    );
    assert_eq!(events.force_empty(), vec![EventAction::Marker(5)]);
}

#[test]
fn disposed_discrete_activity_stops_waking() {
    let (clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 0.5];
    let mut activity = DiscreteActivity::new(&params, Recorder::default());
    activity.activate(make_event(EventAction::Marker(5)));
    assert!(!activity.perform(&mut events));
    assert_eq!(events.len(), 1);

    activity.dispose();
    clock.set(0.5);
    assert!(events.process().is_empty());
}
