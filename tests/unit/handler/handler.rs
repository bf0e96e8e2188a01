use std::collections::BTreeMap;

use image::Rgba;

use super::*;
use crate::animation::element::{AnimatedShapeInfo, BoundsInfo};
use crate::animation::node_info::AnimationNodeInfo;
use crate::handler::presentation::{PresentationInfo, SlideInfo};
use crate::render::{CommandLog, RecordingBackend};
use crate::timing::ManualClock;

const STEP: f64 = 0.02;

struct Show {
    handler: SlideShowHandler,
    clock: Rc<ManualClock>,
    log: CommandLog,
}

impl Show {
    fn new(slides: Vec<SlideInfo>) -> Self {
        Self::with_config(slides, EngineConfig::default())
    }

    fn with_config(slides: Vec<SlideInfo>, config: EngineConfig) -> Self {
        let clock = Rc::new(ManualClock::new());
        let timer = ElapsedTime::new(clock.clone());
        let count = slides.len();
        let info = PresentationInfo {
            slides,
            width: 800,
            height: 600,
        };
        let presentation = MetaPresentation::new(info, &config).unwrap();
        let bitmaps: Vec<Rc<RgbaImage>> = (0..count)
            .map(|i| Rc::new(RgbaImage::from_pixel(8, 6, Rgba([40 * i as u8, 0, 0, 255]))))
            .collect();
        let backend = RecordingBackend::new();
        let log = backend.log();
        let handler = SlideShowHandler::new(
            presentation,
            config,
            timer,
            Box::new(backend),
            Box::new(bitmaps),
        )
        .unwrap();
        Self {
            handler,
            clock,
            log,
        }
    }

    fn run(&mut self, seconds: f64) {
        let steps = (seconds / STEP).ceil() as usize;
        for _ in 0..steps {
            self.clock.advance(STEP);
            self.handler.tick().unwrap();
        }
    }

    fn events(&mut self) -> Vec<PresenterEvent> {
        self.handler
            .take_timeline()
            .into_iter()
            .map(|entry| entry.event)
            .collect()
    }

    fn opacity(&self, slide: usize, element: &str) -> f64 {
        let slide = self.handler.presentation().slide(slide).unwrap();
        let element = slide.animations.tree().unwrap().element(element).unwrap();
        element.borrow().opacity()
    }
}

fn slide(index: usize) -> SlideInfo {
    SlideInfo {
        hash: format!("slide{index}"),
        index,
        ..SlideInfo::default()
    }
}

fn with_fade(mut info: SlideInfo, ms: f64) -> SlideInfo {
    info.transition_type = Some("fade".into());
    info.transition_subtype = Some("crossfade".into());
    info.transition_duration = Some(ms);
    info
}

fn container(name: &str, begin: &str, children: Vec<AnimationNodeInfo>) -> AnimationNodeInfo {
    let mut info = AnimationNodeInfo::new(name);
    info.begin = Some(begin.into());
    info.children = children;
    info
}

fn set(target: &str, to: &str) -> AnimationNodeInfo {
    let mut info = AnimationNodeInfo::new("set");
    info.target_element = Some(target.into());
    info.attribute_name = Some("opacity".into());
    info.to = Some(to.into());
    info.dur = Some("0.5s".into());
    info
}

/// Two click effects: `a` to 0.5, then `b` to 0.2.
fn main_sequence(index: usize) -> SlideInfo {
    let mut seq = container(
        "seq",
        "",
        vec![
            container("par", "next", vec![container("par", "0", vec![set("a", "0.5")])]),
            container("par", "next", vec![container("par", "0", vec![set("b", "0.2")])]),
        ],
    );
    seq.node_type = Some("main-sequence".into());
    let mut root = container("par", "", vec![seq]);
    root.node_type = Some("timing-root".into());
    SlideInfo {
        animations: Some(root),
        ..slide(index)
    }
}

/// Clicking shape `s` fades shape `t` to 0.3.
fn interactive(index: usize) -> SlideInfo {
    let mut seq = container(
        "seq",
        "s.click",
        vec![container("par", "", vec![container("par", "0", vec![set("t", "0.3")])])],
    );
    seq.node_type = Some("interactive-sequence".into());
    let mut root = container("par", "", vec![seq]);
    root.node_type = Some("timing-root".into());
    let mut shapes = BTreeMap::new();
    shapes.insert(
        "s".to_owned(),
        AnimatedShapeInfo {
            bounds: BoundsInfo {
                x: 100.0,
                y: 100.0,
                width: 50.0,
                height: 50.0,
            },
            init_visible: true,
            fill_color: None,
            line_color: None,
            font_color: None,
        },
    );
    SlideInfo {
        animations: Some(root),
        shapes,
        ..slide(index)
    }
}

#[test]
fn static_slide_is_shown_at_once() {
    let mut show = Show::new(vec![slide(0)]);
    show.handler.start(0).unwrap();
    assert_eq!(show.handler.current_slide(), Some(0));
    assert!(show.handler.is_idle());
    assert_eq!(
        show.events(),
        vec![
            PresenterEvent::TransitionStart {
                slide: 0,
                from: None
            },
            PresenterEvent::SlideShown { slide: 0 },
            PresenterEvent::AnimationsEnd { slide: 0 },
        ]
    );
}

#[test]
fn slide_transition_runs_for_its_duration() {
    let mut show = Show::new(vec![slide(0), with_fade(slide(1), 500.0)]);
    show.handler.start(0).unwrap();
    show.events();

    assert!(show.handler.next_slide().unwrap());
    assert!(show.handler.is_transition_playing());
    let frame = show.handler.config().preferred_frame_duration();
    let wakeup = show.handler.pending_wakeup().unwrap();
    assert!((wakeup - frame).abs() < 1e-9, "{wakeup}");

    show.run(0.3);
    assert!(show.handler.is_transition_playing());
    assert!(show.log.draw_count() > 0);

    show.run(0.4);
    assert!(!show.handler.is_transition_playing());
    assert!(!show.handler.stage().borrow().is_active());
    assert!(show.events().contains(&PresenterEvent::SlideShown { slide: 1 }));
}

#[test]
fn going_backwards_skips_the_transition() {
    let mut show = Show::new(vec![slide(0), with_fade(slide(1), 500.0)]);
    show.handler.start(1).unwrap();
    assert!(show.handler.is_transition_playing());
    show.run(1.0);

    show.handler.display_slide(0, false).unwrap();
    assert!(!show.handler.is_transition_playing());
    assert_eq!(show.handler.current_slide(), Some(0));
}

#[test]
fn next_effect_finishes_a_running_transition() {
    let mut show = Show::new(vec![slide(0), with_fade(slide(1), 2000.0)]);
    show.handler.start(0).unwrap();
    show.handler.next_slide().unwrap();
    assert!(show.handler.is_transition_playing());

    assert!(show.handler.next_effect());
    assert!(!show.handler.is_transition_playing());
    assert!(show.events().contains(&PresenterEvent::SlideShown { slide: 1 }));
}

#[test]
fn effects_play_one_per_request() {
    let mut show = Show::new(vec![main_sequence(0)]);
    show.handler.start(0).unwrap();
    assert_eq!(show.handler.next_effect_count(), 1);
    assert_eq!(show.opacity(0, "a"), 1.0);

    assert!(show.handler.next_effect());
    assert!(show.handler.is_main_effect_playing());
    show.run(1.0);
    assert!(!show.handler.is_main_effect_playing());
    assert!((show.opacity(0, "a") - 0.5).abs() < 1e-9);
    assert_eq!(show.opacity(0, "b"), 1.0);
    assert_eq!(show.handler.current_effect(), 1);
    assert_eq!(show.handler.next_effect_count(), 2);

    let events = show.events();
    assert!(events.contains(&PresenterEvent::EffectStart { slide: 0, effect: 0 }));
    assert!(events.contains(&PresenterEvent::EffectEnd { slide: 0, effect: 0 }));
}

#[test]
fn next_effect_while_playing_skips_to_its_end() {
    let mut show = Show::new(vec![main_sequence(0)]);
    show.handler.start(0).unwrap();
    show.handler.next_effect();
    assert!(show.handler.is_main_effect_playing());

    assert!(show.handler.next_effect());
    assert!(!show.handler.is_main_effect_playing());
    assert!((show.opacity(0, "a") - 0.5).abs() < 1e-9);
}

#[test]
fn skip_all_effects_reaches_the_final_state() {
    let mut show = Show::new(vec![main_sequence(0)]);
    show.handler.start(0).unwrap();
    assert!(show.handler.skip_all_effects());

    assert!((show.opacity(0, "a") - 0.5).abs() < 1e-9);
    assert!((show.opacity(0, "b") - 0.2).abs() < 1e-9);
    assert_eq!(show.handler.current_effect(), 2);
    assert!(!show.handler.next_effect());
    assert!(!show.handler.skip_all_effects());
    assert!(show.events().contains(&PresenterEvent::AnimationsEnd { slide: 0 }));
}

#[test]
fn rewind_effect_undoes_the_last_effect() {
    let mut show = Show::new(vec![main_sequence(0)]);
    show.handler.start(0).unwrap();
    show.handler.next_effect();
    show.run(1.0);
    assert!((show.opacity(0, "a") - 0.5).abs() < 1e-9);

    show.handler.rewind_effect();
    assert_eq!(show.opacity(0, "a"), 1.0);
    assert_eq!(show.handler.current_effect(), 0);
    assert!(!show.handler.has_any_effect_started());

    assert!(show.handler.next_effect());
    show.run(1.0);
    assert!((show.opacity(0, "a") - 0.5).abs() < 1e-9);
}

#[test]
fn rewinding_past_the_first_effect_returns_to_the_previous_slide() {
    let mut show = Show::new(vec![main_sequence(0), slide(1)]);
    show.handler.start(0).unwrap();
    show.handler.next_slide().unwrap();
    assert_eq!(show.handler.current_slide(), Some(1));

    show.handler.rewind_effect();
    assert_eq!(show.handler.current_slide(), Some(0));
    assert!((show.opacity(0, "a") - 0.5).abs() < 1e-9);
    assert!((show.opacity(0, "b") - 0.2).abs() < 1e-9);
}

#[test]
fn rewinding_a_transition_goes_back() {
    let mut show = Show::new(vec![slide(0), with_fade(slide(1), 2000.0)]);
    show.handler.start(0).unwrap();
    show.handler.next_slide().unwrap();
    show.run(0.2);
    assert!(show.handler.is_transition_playing());

    show.handler.rewind_to_previous_slide();
    assert!(!show.handler.is_transition_playing());
    assert_eq!(show.handler.current_slide(), Some(0));
}

#[test]
fn slide_advances_on_its_own() {
    let mut first = slide(0);
    first.next_slide_duration = Some(2000.0);
    let mut show = Show::new(vec![first, slide(1)]);
    show.handler.start(0).unwrap();
    assert!(show.handler.is_auto_advance_pending());
    let wakeup = show.handler.pending_wakeup().unwrap();
    assert!((wakeup - 2.0).abs() < 1e-9);

    show.run(1.9);
    assert_eq!(show.handler.current_slide(), Some(0));
    show.run(0.2);
    assert_eq!(show.handler.current_slide(), Some(1));
    assert!(show.events().contains(&PresenterEvent::AutoAdvance { slide: 0 }));
    // the last slide never advances
    assert!(!show.handler.is_auto_advance_pending());
}

#[test]
fn auto_advance_waits_for_the_effects() {
    let mut first = main_sequence(0);
    first.next_slide_duration = Some(500.0);
    let mut show = Show::new(vec![first, slide(1)]);
    show.handler.start(0).unwrap();
    show.run(1.0);
    assert!(!show.handler.is_auto_advance_pending());

    show.handler.skip_all_effects();
    assert!(show.handler.is_auto_advance_pending());
    show.run(0.6);
    assert_eq!(show.handler.current_slide(), Some(1));
}

#[test]
fn auto_advance_can_be_switched_off() {
    let mut first = slide(0);
    first.next_slide_duration = Some(100.0);
    let config = EngineConfig {
        auto_advance_enabled: false,
        ..EngineConfig::default()
    };
    let mut show = Show::with_config(vec![first, slide(1)], config);
    show.handler.start(0).unwrap();
    assert!(!show.handler.is_auto_advance_pending());
    show.run(0.5);
    assert_eq!(show.handler.current_slide(), Some(0));
}

#[test]
fn disabling_drops_the_pending_advance() {
    let mut first = slide(0);
    first.next_slide_duration = Some(100.0);
    let mut show = Show::new(vec![first, slide(1)]);
    show.handler.start(0).unwrap();
    show.handler.set_enabled(false);
    assert!(!show.handler.is_auto_advance_pending());
    assert!(show.handler.is_idle());
    show.run(0.5);
    assert_eq!(show.handler.current_slide(), Some(0));
    assert!(!show.handler.next_effect());
}

#[test]
fn leaving_the_last_slide_exits() {
    let mut show = Show::new(vec![slide(0)]);
    show.handler.start(0).unwrap();
    show.events();
    assert!(!show.handler.next_slide().unwrap());
    assert_eq!(show.events(), vec![PresenterEvent::Exit]);

    assert!(show.handler.display_slide(3, false).is_err());
    assert_eq!(show.events(), vec![PresenterEvent::Exit]);
}

#[test]
fn clicking_a_source_shape_plays_its_sequence() {
    let mut show = Show::new(vec![interactive(0)]);
    show.handler.start(0).unwrap();
    assert!(show.handler.handle_pointer_move(Point::new(120.0, 120.0)));
    assert!(!show.handler.handle_pointer_move(Point::new(10.0, 10.0)));

    assert!(show.handler.handle_click(Point::new(120.0, 120.0)));
    assert!(show.handler.is_interactive_effect_playing());
    show.run(1.0);
    assert!(!show.handler.is_interactive_effect_playing());
    assert!((show.opacity(0, "t") - 0.3).abs() < 1e-9);

    let events = show.events();
    assert!(events.iter().any(|e| matches!(e, PresenterEvent::InteractiveStart { .. })));
    assert!(events.iter().any(|e| matches!(e, PresenterEvent::InteractiveEnd { .. })));

    // the shape stays spent until the sequence is rewound
    assert!(!show.handler.handle_click(Point::new(120.0, 120.0)));
}

#[test]
fn timeline_serializes_with_an_event_tag() {
    let entry = TimelineEntry {
        time: 1.5,
        event: PresenterEvent::SlideShown { slide: 2 },
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"time": 1.5, "event": "slideShown", "slide": 2})
    );
}

#[test]
fn transition_frames_follow_the_preferred_frame_rate() {
    let config = EngineConfig {
        preferred_frames_per_second: 25,
        ..EngineConfig::default()
    };
    let mut show = Show::with_config(vec![slide(0), with_fade(slide(1), 500.0)], config);
    show.handler.start(0).unwrap();
    assert!(show.handler.next_slide().unwrap());
    let frame = show.handler.config().preferred_frame_duration();
    assert!(frame > show.handler.config().minimum_timeout);

    let mut wakeup = show.handler.pending_wakeup().unwrap();
    for _ in 0..5 {
        assert!((wakeup - frame).abs() < 1e-9, "{wakeup}");
        show.clock.advance(wakeup);
        wakeup = show.handler.tick().unwrap().unwrap();
    }
    assert!(show.handler.is_transition_playing());

    // a late tick does not try to catch up
    show.clock.advance(wakeup + 0.03);
    wakeup = show.handler.tick().unwrap().unwrap();
    assert!((wakeup - frame).abs() < 1e-9, "{wakeup}");
}
