use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use image::RgbaImage;
use kurbo::Point;
use serde::Serialize;

use crate::activities::{ActivityParamSet, Direction, simple_activity};
use crate::animation::effect::Effect;
use crate::compositor::SlideCompositor;
use crate::events::{
    EventAction, EventMultiplexer, EventRef, HandlerNotice, RewindedHandler, make_delay,
    make_event,
};
use crate::foundation::config::EngineConfig;
use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::foundation::ids::{ActivityId, NodeId};
use crate::handler::context::SlideShowContext;
use crate::handler::presentation::MetaPresentation;
use crate::render::GlBackend;
use crate::timing::{ElapsedTime, FrameSynchronization};
use crate::transitions::{
    TransitionAnimation, TransitionParameters, TransitionRegistry, TransitionStage,
};

/// Rounds one event pump may take before giving up on a self-feeding event chain.
const MAX_PUMP_ROUNDS: usize = 1024;

/// Something the host can observe about the show, in the order it happened.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PresenterEvent {
    TransitionStart { slide: usize, from: Option<usize> },
    SlideShown { slide: usize },
    EffectStart { slide: usize, effect: usize },
    EffectEnd { slide: usize, effect: usize },
    InteractiveStart { slide: usize, node: u32 },
    InteractiveEnd { slide: usize, node: u32 },
    AnimationsEnd { slide: usize },
    AutoAdvance { slide: usize },
    Exit,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Seconds on the show timer.
    pub time: f64,
    #[serde(flatten)]
    pub event: PresenterEvent,
}

#[derive(Debug, Default)]
enum AutoAdvance {
    #[default]
    Idle,
    Scheduled(EventRef),
    /// The pending advance was cancelled by rewinding effect `n`; replaying it re-arms the advance.
    Rewinded(usize),
}

/// Drives a presentation: switches slides, plays their transitions and steps through effects.
///
/// Nothing here runs on its own. The host calls [`tick`](Self::tick) and schedules the next call
/// after the returned number of seconds; user input goes through [`next_effect`](Self::next_effect),
/// [`handle_click`](Self::handle_click) and the skip and rewind operations.
#[derive(Debug)]
pub struct SlideShowHandler {
    presentation: MetaPresentation,
    ctx: SlideShowContext,
    frame_sync: FrameSynchronization,
    registry: TransitionRegistry,
    stage: Rc<RefCell<TransitionStage>>,
    compositor: Box<dyn SlideCompositor>,
    enabled: bool,
    idle: bool,
    starting: bool,
    transition_running: bool,
    transition_activity: Option<ActivityId>,
    next_effect_running: bool,
    first_auto_effect_running: bool,
    skipping: bool,
    skipping_all: bool,
    interactive_playing: usize,
    current_effect: usize,
    started_effects: Vec<Effect>,
    started_index: HashMap<Option<NodeId>, usize>,
    auto_advance: AutoAdvance,
    update_depth: u32,
    wakeup: Option<f64>,
    timeline: Vec<TimelineEntry>,
}

impl SlideShowHandler {
    pub fn new(
        presentation: MetaPresentation,
        config: EngineConfig,
        timer: ElapsedTime,
        backend: Box<dyn GlBackend>,
        compositor: Box<dyn SlideCompositor>,
    ) -> SlideShowResult<Self> {
        config.validate()?;
        let frame_sync = FrameSynchronization::new(config.preferred_frame_duration(), timer.clone());
        let ctx = SlideShowContext::new(config, timer, presentation.slide_size());
        Ok(Self {
            presentation,
            ctx,
            frame_sync,
            registry: TransitionRegistry::with_builtin(),
            stage: TransitionStage::shared(backend),
            compositor,
            enabled: true,
            idle: true,
            starting: false,
            transition_running: false,
            transition_activity: None,
            next_effect_running: false,
            first_auto_effect_running: false,
            skipping: false,
            skipping_all: false,
            interactive_playing: 0,
            current_effect: 0,
            started_effects: Vec::new(),
            started_index: HashMap::new(),
            auto_advance: AutoAdvance::Idle,
            update_depth: 0,
            wakeup: None,
            timeline: Vec::new(),
        })
    }

    pub fn presentation(&self) -> &MetaPresentation {
        &self.presentation
    }

    pub fn context(&self) -> &SlideShowContext {
        &self.ctx
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    pub fn stage(&self) -> &Rc<RefCell<TransitionStage>> {
        &self.stage
    }

    pub fn current_slide(&self) -> Option<usize> {
        self.presentation.current()
    }

    /// Index of the next main sequence effect to play.
    pub fn current_effect(&self) -> usize {
        self.current_effect
    }

    /// Main sequence effects of the current slide known so far.
    pub fn next_effect_count(&self) -> usize {
        self.ctx.next_effects.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn is_transition_playing(&self) -> bool {
        self.transition_running
    }

    pub fn is_main_effect_playing(&self) -> bool {
        self.next_effect_running
    }

    pub fn is_interactive_effect_playing(&self) -> bool {
        self.interactive_playing > 0
    }

    pub fn is_any_effect_playing(&self) -> bool {
        self.is_main_effect_playing() || self.is_interactive_effect_playing()
    }

    pub fn has_any_effect_started(&self) -> bool {
        !self.started_effects.is_empty()
    }

    pub fn is_auto_advance_pending(&self) -> bool {
        matches!(self.auto_advance, AutoAdvance::Scheduled(_))
    }

    /// The wake-up handed out by the last update.
    pub fn pending_wakeup(&self) -> Option<f64> {
        self.wakeup
    }

    pub fn take_timeline(&mut self) -> Vec<TimelineEntry> {
        mem::take(&mut self.timeline)
    }

    /// Disabling drops everything scheduled; slides then switch without transitions or effects.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.dispose();
        }
    }

    pub fn dispose(&mut self) {
        self.clear_auto_advance();
        self.dispose_slide_events();
        self.wakeup = None;
        self.idle = true;
    }

    /// Show the first slide of the show, with its transition.
    pub fn start(&mut self, slide: usize) -> SlideShowResult<()> {
        self.starting = true;
        self.display_slide(slide, false)
    }

    /// Run every due event and activity, then report the next wake-up or `None` when idle.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn update(&mut self) -> Option<f64> {
        self.update_depth += 1;
        let outermost = self.update_depth == 1;
        if outermost {
            self.ctx.timer.hold();
        }

        self.pump_events();
        self.ctx.activities.process(&mut self.ctx.timer_queue);
        let frame_wait = self.frame_sync.synchronize();
        if frame_wait > 0.0 {
            tracing::trace!(frame_wait, "frame finished ahead of its target");
        }
        self.ctx.activities.process_dequeued();
        self.pump_events();

        if outermost {
            self.ctx.timer.release();
        }
        self.update_depth -= 1;
        self.schedule_wakeup()
    }

    /// Host entry point: update, draw the pending transition frame and return the next wake-up.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn tick(&mut self) -> SlideShowResult<Option<f64>> {
        let wakeup = self.update();
        self.stage.borrow_mut().render_pending()?;
        Ok(wakeup)
    }

    fn schedule_wakeup(&mut self) -> Option<f64> {
        let config = &self.ctx.config;
        self.wakeup = if !self.ctx.activities.is_empty() {
            self.frame_sync.activate();
            // wake at the next frame target, never sooner than the host allows
            Some(config.minimum_timeout.max(self.frame_sync.time_to_next_frame()))
        } else if !self.ctx.timer_queue.is_empty() {
            self.frame_sync.deactivate();
            Some(config.clamp_timeout(self.ctx.timer_queue.next_timeout()))
        } else {
            self.frame_sync.deactivate();
            None
        };
        self.idle = self.wakeup.is_none();
        self.wakeup
    }

    fn pump_events(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let fired = self.ctx.timer_queue.process();
            let mut busy = !fired.is_empty();
            for action in fired {
                self.dispatch(action);
            }
            while let Some(action) = self.ctx.take_deferred() {
                busy = true;
                self.dispatch(action);
            }
            while let Some(notice) = self.ctx.multiplexer.take_notice() {
                busy = true;
                self.handle_notice(notice);
            }
            if !busy {
                return;
            }
        }
        tracing::warn!(rounds = MAX_PUMP_ROUNDS, "event pump did not settle");
    }

    fn dispatch(&mut self, action: EventAction) {
        match action {
            EventAction::Node { .. } | EventAction::WakeActivity(_) => {
                let tree = match self.ctx.slide {
                    Some(slide) => self
                        .presentation
                        .slide_mut(slide)
                        .and_then(|s| s.animations.tree_mut()),
                    None => None,
                };
                match (tree, action) {
                    (Some(tree), action) => tree.dispatch(action, &mut self.ctx),
                    (None, EventAction::WakeActivity(id)) => {
                        self.ctx.activities.add_activity(id);
                    }
                    (None, action) => tracing::trace!(?action, "node event without a slide"),
                }
            }
            EventAction::InteractiveSequenceStart(node) => {
                self.notify_interactive_animation_sequence_start(node);
            }
            EventAction::InteractiveSequenceEnd(node) => {
                self.notify_interactive_animation_sequence_end(node);
            }
            EventAction::TransitionEnd {
                new_slide,
                old_slide,
            } => self.notify_transition_end(new_slide, old_slide),
            EventAction::AutoAdvance => self.auto_advance(),
            EventAction::Marker(tag) => tracing::trace!(tag, "marker event"),
        }
    }

    fn handle_notice(&mut self, notice: HandlerNotice) {
        match notice {
            HandlerNotice::NextEffectEnd => self.notify_next_effect_end(),
            HandlerNotice::AnimationsEnd => self.notify_animations_end(),
            HandlerNotice::FirstAutoEffectStarted => self.first_auto_effect_running = true,
            HandlerNotice::FirstAutoEffectEnded => self.first_auto_effect_running = false,
            HandlerNotice::Rewinded(RewindedHandler::ChargeSource(id)) => {
                if let Some(source) = self.ctx.source_elements.get_mut(&id) {
                    source.charge();
                }
            }
            HandlerNotice::Rewinded(RewindedHandler::ChargeInteractiveSequence(node)) => {
                if let Some(sequence) = self.ctx.interactive_sequences.get(&node) {
                    sequence.charge_events();
                }
            }
        }
    }

    fn record(&mut self, event: PresenterEvent) {
        let time = self.ctx.timer.elapsed();
        tracing::debug!(time, ?event, "presenter event");
        self.timeline.push(TimelineEntry { time, event });
    }

    // ---- slides ----

    /// Switch to `new_slide`, playing its transition unless `skip_transition` is set or the show
    /// moves backwards.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn display_slide(&mut self, new_slide: usize, skip_transition: bool) -> SlideShowResult<()> {
        if new_slide >= self.presentation.slide_count() {
            self.exit();
            return Err(SlideShowError::validation(format!(
                "slide {new_slide} out of range ({} slides)",
                self.presentation.slide_count()
            )));
        }
        if self.transition_running {
            self.skip_transition();
        }
        if self.first_auto_effect_running {
            self.skip_first_auto_effect();
        }

        let old_slide = self.presentation.current();
        if let Some(old) = old_slide {
            self.clean_leaving_slide(old, skip_transition);
        }
        self.presentation.go_to(new_slide)?;
        self.notify_slide_start(new_slide, old_slide);

        let forward = match old_slide {
            Some(old) => new_slide > old,
            None => self.starting,
        };
        if self.enabled && !skip_transition && forward {
            if let Some(activity) = self.create_slide_transition(new_slide, old_slide) {
                self.transition_running = true;
                self.transition_activity = Some(activity);
                self.ctx.activities.add_activity(activity);
                self.update();
                return Ok(());
            }
        }
        self.notify_transition_end(new_slide, old_slide);
        Ok(())
    }

    /// Move to the visible slide after the current one. `false` once the show is over.
    pub fn next_slide(&mut self) -> SlideShowResult<bool> {
        match self.presentation.next_slide() {
            Some(next) => {
                self.display_slide(next, false)?;
                Ok(true)
            }
            None => {
                self.exit();
                Ok(false)
            }
        }
    }

    fn exit(&mut self) {
        if let Some(current) = self.presentation.current() {
            self.clean_leaving_slide(current, true);
        }
        self.dispose_slide_events();
        self.record(PresenterEvent::Exit);
        tracing::info!("slideshow finished");
    }

    fn clean_leaving_slide(&mut self, old: usize, skipped: bool) {
        if self.enabled {
            if let Some(slide) = self.presentation.slide_mut(old) {
                if slide.is_animated() {
                    slide.animations.end(skipped, &mut self.ctx);
                    self.dispose_slide_events();
                }
            }
        }
        self.clear_auto_advance();
    }

    fn notify_slide_start(&mut self, new_slide: usize, old_slide: Option<usize>) {
        self.current_effect = 0;
        self.ctx.is_rewinding = false;
        self.skipping = false;
        self.skipping_all = false;
        self.next_effect_running = false;
        self.first_auto_effect_running = false;
        self.interactive_playing = 0;
        self.started_effects.clear();
        self.started_index.clear();

        if let Some(old) = old_slide.and_then(|i| self.presentation.slide(i)) {
            old.animations.notify_slide_end();
        }
        self.ctx.slide = Some(new_slide);
        if let Some(slide) = self.presentation.slide(new_slide) {
            slide.animations.notify_slide_start(&slide.info.shapes);
        }
        self.record(PresenterEvent::TransitionStart {
            slide: new_slide,
            from: old_slide,
        });
    }

    fn create_slide_transition(&mut self, new_slide: usize, old_slide: Option<usize>) -> Option<ActivityId> {
        let slide = self.presentation.slide(new_slide)?;
        let (ty, subtype) = slide.info.transition()?;
        let forward = slide.info.transition_direction;
        let fade_color = slide.info.fade_color();
        let duration = slide
            .info
            .transition_seconds(self.ctx.config.default_transition_duration);

        let Some(entering) = self.compositor.get_slide(new_slide) else {
            tracing::warn!(slide = new_slide, "entering slide not rendered, transition skipped");
            return None;
        };
        let leaving = old_slide
            .and_then(|old| self.compositor.get_slide(old))
            .unwrap_or_else(|| Rc::new(RgbaImage::new(entering.width(), entering.height())));
        let params = TransitionParameters::new(ty, subtype, leaving, entering)
            .with_direction(forward)
            .with_fade_color(fade_color);
        let Some(change) = self.registry.create(&params) else {
            tracing::warn!(%ty, %subtype, "no slide transition for this type");
            return None;
        };

        let mut activity_params =
            ActivityParamSet::new(self.ctx.timer.clone(), self.presentation.slide_size());
        activity_params.end_event = Some(make_event(EventAction::TransitionEnd {
            new_slide,
            old_slide,
        }));
        activity_params.min_duration = duration;
        activity_params.min_frame_count = self.ctx.config.min_frame_count(Some(duration));
        let animation = TransitionAnimation::new(self.stage.clone(), change);
        let activity = simple_activity(&activity_params, Box::new(animation), Direction::Forward);
        tracing::debug!(slide = new_slide, %ty, duration, "slide transition created");
        Some(self.ctx.activities.insert(Box::new(activity)))
    }

    fn notify_transition_end(&mut self, new_slide: usize, old_slide: Option<usize>) {
        if let Some(activity) = self.transition_activity.take() {
            self.ctx.activities.remove(activity);
        }
        self.transition_running = false;

        if self.ctx.is_rewinding {
            self.ctx.is_rewinding = false;
            if let Some(old) = old_slide {
                if let Err(e) = self.display_slide(old, true) {
                    tracing::error!(error = %e, "cannot return to the previous slide");
                }
                self.skip_all_effects();
                return;
            }
        }

        self.record(PresenterEvent::SlideShown { slide: new_slide });
        self.starting = false;
        if !self.enabled {
            self.notify_animations_end();
            return;
        }

        self.dispose_slide_events();
        self.current_effect = 0;
        let started = match self.presentation.slide_mut(new_slide) {
            Some(slide) => slide.is_animated() && slide.animations.start(&mut self.ctx),
            None => false,
        };
        if started {
            self.ctx.multiplexer.register_animations_end_handler();
        } else {
            self.notify_animations_end();
        }
        self.update();
    }

    fn dispose_slide_events(&mut self) {
        self.ctx.clear_queues();
        while self.ctx.take_deferred().is_some() {}
        self.ctx.multiplexer = EventMultiplexer::new();
    }

    // ---- automatic advance ----

    fn notify_animations_end(&mut self) {
        let Some(slide) = self.presentation.current() else {
            return;
        };
        self.record(PresenterEvent::AnimationsEnd { slide });
        if self.presentation.is_last_slide(slide) || !self.ctx.config.auto_advance_enabled {
            return;
        }
        if !matches!(self.auto_advance, AutoAdvance::Idle) {
            tracing::error!(slide, "automatic advance already pending");
            return;
        }
        let Some(delay) = self
            .presentation
            .slide(slide)
            .and_then(|s| s.info.auto_advance_seconds())
        else {
            return;
        };
        let event = make_delay(EventAction::AutoAdvance, delay);
        self.ctx.timer_queue.push(event.clone());
        self.auto_advance = AutoAdvance::Scheduled(event);
        tracing::debug!(slide, delay, "automatic advance scheduled");
    }

    fn auto_advance(&mut self) {
        self.auto_advance = AutoAdvance::Idle;
        if let Some(slide) = self.presentation.current() {
            self.record(PresenterEvent::AutoAdvance { slide });
        }
        if let Err(e) = self.next_slide() {
            tracing::error!(error = %e, "automatic advance failed");
        }
    }

    fn clear_auto_advance(&mut self) {
        if let AutoAdvance::Scheduled(event) = mem::take(&mut self.auto_advance) {
            event.dispose();
        }
    }

    // ---- effects ----

    fn begin_effect(&mut self, mut effect: Effect) {
        if let Err(e) = effect.start() {
            tracing::error!(error = %e, "effect start");
        }
        self.started_index
            .insert(effect.node(), self.started_effects.len());
        self.started_effects.push(effect);
    }

    fn finish_effect(&mut self, node: Option<NodeId>) {
        let effect = self
            .started_index
            .get(&node)
            .and_then(|&i| self.started_effects.get_mut(i));
        match effect {
            Some(effect) => {
                if let Err(e) = effect.end() {
                    tracing::error!(error = %e, "effect end");
                }
            }
            None => tracing::error!(?node, "no started effect to end"),
        }
    }

    fn notify_next_effect_start(&mut self) {
        if self.next_effect_running {
            tracing::error!("next effect started while another one runs");
        }
        self.next_effect_running = true;
        self.ctx.multiplexer.register_next_effect_end_handler();
        self.begin_effect(Effect::main());

        let effect = self.current_effect;
        if let Some(slide) = self.presentation.current() {
            for element in self.presentation.slides()[slide].animations.elements() {
                element.borrow_mut().notify_next_effect_start(effect);
            }
            self.record(PresenterEvent::EffectStart { slide, effect });
        }
    }

    fn notify_next_effect_end(&mut self) {
        if !self.next_effect_running {
            tracing::error!("next effect ended while none runs");
        }
        self.next_effect_running = false;
        self.finish_effect(None);
        if let Some(slide) = self.presentation.current() {
            self.record(PresenterEvent::EffectEnd {
                slide,
                effect: self.current_effect.saturating_sub(1),
            });
        }

        if let AutoAdvance::Rewinded(effect) = self.auto_advance {
            if effect == self.current_effect {
                self.auto_advance = AutoAdvance::Idle;
                self.notify_animations_end();
            }
        }
    }

    pub fn notify_interactive_animation_sequence_start(&mut self, node: NodeId) {
        if !self.enabled {
            return;
        }
        self.interactive_playing += 1;
        self.begin_effect(Effect::interactive(node));
        if let Some(sequence) = self.ctx.interactive_sequences.get_mut(&node) {
            sequence.start();
        }
        if let Some(slide) = self.presentation.current() {
            self.record(PresenterEvent::InteractiveStart { slide, node: node.0 });
        }
    }

    pub fn notify_interactive_animation_sequence_end(&mut self, node: NodeId) {
        if !self.is_interactive_effect_playing() {
            tracing::error!(%node, "interactive sequence ended while none plays");
            return;
        }
        self.interactive_playing -= 1;
        self.finish_effect(Some(node));
        if let Some(sequence) = self.ctx.interactive_sequences.get_mut(&node) {
            sequence.end();
        }
        if let Some(slide) = self.presentation.current() {
            self.record(PresenterEvent::InteractiveEnd { slide, node: node.0 });
        }
    }

    /// The user asked for the next step: finish whatever plays, otherwise start the next effect.
    /// `false` when the slide has no effect left.
    pub fn next_effect(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        if self.transition_running {
            self.skip_transition();
            return true;
        }
        if self.first_auto_effect_running {
            self.skip_first_auto_effect();
            return true;
        }
        if self.is_any_effect_playing() {
            self.skip_all_playing_effects();
            return true;
        }
        if self.current_effect >= self.ctx.next_effects.len() {
            return false;
        }

        self.notify_next_effect_start();
        if let Some(action) = self.ctx.next_effects.fire(self.current_effect) {
            self.dispatch(action);
        }
        self.current_effect += 1;
        self.update();
        true
    }

    /// Click at `point` in slide coordinates: a charged source shape under it starts its
    /// interactive sequence, any other click steps to the next effect.
    pub fn handle_click(&mut self, point: Point) -> bool {
        if !self.enabled {
            return false;
        }
        self.sync_source_bounds();
        let ctx = &mut self.ctx;
        let hit = ctx
            .source_elements
            .values_mut()
            .any(|source| source.handle_click(point, &ctx.multiplexer, &mut ctx.timer_queue));
        if hit {
            self.update();
            return true;
        }
        self.next_effect()
    }

    /// `true` when `point` hovers a shape that reacts to clicks.
    pub fn handle_pointer_move(&mut self, point: Point) -> bool {
        self.sync_source_bounds();
        let mut over = false;
        for source in self.ctx.source_elements.values_mut() {
            over |= source.on_pointer_move(point);
        }
        over
    }

    /// Source shapes take their hit area from the slide's layer info when it has one.
    fn sync_source_bounds(&mut self) {
        let Some(slide) = self.presentation.current_slide() else {
            return;
        };
        for (id, source) in self.ctx.source_elements.iter_mut() {
            if let Some(shape) = slide.info.shapes.get(id) {
                source.set_bounds(shape.bounds.to_rect());
            }
        }
    }

    pub fn skip_transition(&mut self) {
        if self.skipping || self.ctx.is_rewinding {
            return;
        }
        self.skipping = true;
        self.ctx.activities.end_all(&mut self.ctx.timer_queue);
        for action in self.ctx.timer_queue.force_empty() {
            self.dispatch(action);
        }
        self.ctx.activities.end_all(&mut self.ctx.timer_queue);
        self.update();
        self.skipping = false;
    }

    fn skip_first_auto_effect(&mut self) {
        self.skipping = true;
        self.ctx.multiplexer.notify_skip_effect(&mut self.ctx.timer_queue);
        self.update();
        self.skipping = false;
    }

    fn rewind_first_auto_effect(&mut self) {
        self.ctx.is_rewinding = true;
        self.ctx
            .multiplexer
            .notify_rewind_current_effect(&mut self.ctx.timer_queue);
        self.update();
        self.ctx.is_rewinding = false;
    }

    /// Jump every playing effect to its end.
    pub fn skip_all_playing_effects(&mut self) -> bool {
        if !self.is_any_effect_playing() {
            return true;
        }
        self.skipping = true;
        for effect in self.started_effects.iter().filter(|e| e.is_playing()) {
            match effect.node() {
                None => self.ctx.multiplexer.notify_skip_effect(&mut self.ctx.timer_queue),
                Some(node) => self
                    .ctx
                    .multiplexer
                    .notify_skip_interactive_effect(node, &mut self.ctx.timer_queue),
            }
        }
        self.update();
        self.skipping = false;
        true
    }

    /// Play the next effect straight to its end. `false` when no effect is left.
    pub fn skip_next_effect(&mut self) -> bool {
        if self.skipping || self.ctx.is_rewinding {
            return true;
        }
        if self.is_any_effect_playing() {
            tracing::error!("skip next effect while an effect plays");
            return false;
        }
        if self.current_effect >= self.ctx.next_effects.len() {
            return false;
        }

        self.notify_next_effect_start();
        self.skipping = true;
        if let Some(action) = self.ctx.next_effects.fire(self.current_effect) {
            self.dispatch(action);
        }
        self.ctx.multiplexer.notify_skip_effect(&mut self.ctx.timer_queue);
        self.current_effect += 1;
        self.update();
        self.skipping = false;
        true
    }

    pub fn skip_playing_or_next_effect(&mut self) -> bool {
        if self.transition_running {
            self.skip_transition();
            return true;
        }
        if self.is_any_effect_playing() {
            return self.skip_all_playing_effects();
        }
        self.skip_next_effect()
    }

    /// Bring the slide to the state after its last effect.
    pub fn skip_all_effects(&mut self) -> bool {
        if self.skipping_all {
            return true;
        }
        self.skipping_all = true;

        if self.transition_running {
            self.skip_transition();
        }
        if self.is_any_effect_playing() {
            self.skip_all_playing_effects();
        } else if self.current_effect >= self.ctx.next_effects.len() {
            self.skipping_all = false;
            return false;
        }

        // each skipped effect resolves the one after it, so the array keeps growing
        while self.current_effect < self.ctx.next_effects.len() {
            let before = self.current_effect;
            self.skip_next_effect();
            if self.current_effect == before {
                tracing::warn!(effect = before, "effect could not be skipped");
                break;
            }
        }
        self.skipping_all = false;
        true
    }

    pub fn rewind_transition(&mut self) {
        if self.skipping || self.ctx.is_rewinding {
            return;
        }
        self.ctx.is_rewinding = true;
        self.ctx.activities.end_all(&mut self.ctx.timer_queue);
        self.update();
        self.ctx.is_rewinding = false;
    }

    /// Undo the effects back to the last one the user started.
    pub fn rewind_effect(&mut self) {
        if let AutoAdvance::Scheduled(event) = &self.auto_advance {
            event.dispose();
            self.auto_advance = AutoAdvance::Rewinded(self.current_effect);
        }
        if !self.has_any_effect_started() {
            self.rewind_to_previous_slide();
            return;
        }

        self.ctx.is_rewinding = true;
        let first_playing = self.started_effects.iter().position(Effect::is_playing);
        match first_playing {
            Some(first) => {
                for i in (first..self.started_effects.len()).rev() {
                    self.notify_rewind(i);
                }
                self.update();
                for _ in first..self.started_effects.len() {
                    self.pop_started_effect();
                }
            }
            None => {
                let last = self.started_effects.len() - 1;
                self.notify_rewind(last);
                self.pop_started_effect();
                self.update();
            }
        }
        self.ctx.is_rewinding = false;
    }

    fn notify_rewind(&mut self, index: usize) {
        let effect = &self.started_effects[index];
        let (playing, ended, node) = (effect.is_playing(), effect.is_ended(), effect.node());
        let queue = &mut self.ctx.timer_queue;
        match (node, playing, ended) {
            (None, true, _) => {
                self.ctx.multiplexer.notify_rewind_current_effect(queue);
                self.current_effect = self.current_effect.saturating_sub(1);
            }
            (None, false, true) => {
                self.ctx.multiplexer.notify_rewind_last_effect(queue);
                self.current_effect = self.current_effect.saturating_sub(1);
            }
            (Some(node), true, _) => self
                .ctx
                .multiplexer
                .notify_rewind_running_interactive_effect(node, queue),
            (Some(node), false, true) => self
                .ctx
                .multiplexer
                .notify_rewind_ended_interactive_effect(node, queue),
            _ => {}
        }
    }

    fn pop_started_effect(&mut self) {
        if let Some(effect) = self.started_effects.pop() {
            if let Some(node) = effect.node() {
                self.started_index.remove(&Some(node));
            }
        }
    }

    /// Undo every started effect of the slide.
    pub fn rewind_all_effects(&mut self) {
        if !self.has_any_effect_started() {
            self.rewind_to_previous_slide();
            return;
        }
        while self.has_any_effect_started() {
            let before = self.started_effects.len();
            self.rewind_effect();
            if self.started_effects.len() >= before {
                tracing::warn!(effects = before, "effect could not be rewound");
                break;
            }
        }
    }

    /// Go back to the previous slide, shown with all of its effects played.
    pub fn rewind_to_previous_slide(&mut self) {
        if self.first_auto_effect_running {
            self.rewind_first_auto_effect();
        }
        if self.transition_running {
            self.rewind_transition();
            return;
        }
        if self.is_any_effect_playing() {
            return;
        }
        let Some(previous) = self.presentation.previous_slide() else {
            return;
        };
        if let Err(e) = self.display_slide(previous, true) {
            tracing::error!(error = %e, "cannot return to the previous slide");
            return;
        }
        self.skip_all_effects();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handler/handler.rs"]
mod tests;
