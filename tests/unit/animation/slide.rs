use std::rc::Rc;

use super::*;
use crate::timing::{ElapsedTime, ManualClock};

fn context() -> SlideShowContext {
    let timer = ElapsedTime::new(Rc::new(ManualClock::new()));
    let mut ctx = SlideShowContext::new(EngineConfig::default(), timer, Vec2::new(800.0, 600.0));
    ctx.slide = Some(0);
    ctx
}

/// Main sequence with a single click effect on shape `s`.
fn click_effect() -> AnimationNodeInfo {
    let mut set = AnimationNodeInfo::new("set");
    set.target_element = Some("s".into());
    set.attribute_name = Some("visibility".into());
    set.to = Some("visible".into());
    let mut effect = AnimationNodeInfo::new("par");
    effect.begin = Some("next".into());
    effect.children = vec![set];
    let mut seq = AnimationNodeInfo::new("seq");
    seq.node_type = Some("main-sequence".into());
    seq.children = vec![effect];
    let mut root = AnimationNodeInfo::new("par");
    root.children = vec![seq];
    root
}

fn imported() -> SlideAnimations {
    let mut animations = SlideAnimations::new();
    assert!(animations.import(0, &click_effect(), Vec2::new(800.0, 600.0), &EngineConfig::default()));
    animations
}

#[test]
fn import_reports_pending_animations() {
    let animations = imported();
    assert!(animations.is_animated());
    assert_eq!(animations.elements().count(), 1);

    let mut empty = SlideAnimations::new();
    assert!(empty.import(0, &AnimationNodeInfo::new("par"), Vec2::new(800.0, 600.0), &EngineConfig::default()));
    assert!(!empty.is_animated());
    assert!(!empty.import(0, &AnimationNodeInfo::new("blink"), Vec2::new(800.0, 600.0), &EngineConfig::default()));
    assert!(empty.tree().is_none());
}

#[test]
fn records_move_to_the_context_while_showing() {
    let mut ctx = context();
    let mut animations = imported();
    assert!(animations.start(&mut ctx));
    assert!(animations.is_first_run());
    for action in ctx.timer_queue.process() {
        animations.tree_mut().unwrap().dispatch(action, &mut ctx);
    }
    for action in ctx.timer_queue.process() {
        animations.tree_mut().unwrap().dispatch(action, &mut ctx);
    }
    assert_eq!(ctx.next_effects.len(), 1);

    animations.end(false, &mut ctx);
    assert!(ctx.next_effects.is_empty());
    assert!(!animations.is_first_run());
    assert_eq!(animations.next_effects.len(), 1);
}

#[test]
fn skipping_the_first_showing_forgets_next_effects() {
    let mut ctx = context();
    let mut animations = imported();
    animations.start(&mut ctx);
    ctx.next_effects.append(crate::events::make_event(crate::events::EventAction::Marker(1)));
    animations.end(true, &mut ctx);
    assert!(animations.next_effects.is_empty());
    assert_eq!(animations.first_run, None);

    animations.start(&mut ctx);
    assert!(animations.is_first_run());
}

#[test]
fn slide_start_resets_elements_to_their_layers() {
    let animations = imported();
    let mut shapes = BTreeMap::new();
    shapes.insert(
        "s".to_owned(),
        AnimatedShapeInfo {
            bounds: crate::animation::element::BoundsInfo {
                x: 10.0,
                y: 20.0,
                width: 100.0,
                height: 50.0,
            },
            init_visible: false,
            fill_color: None,
            line_color: None,
            font_color: None,
        },
    );
    animations.notify_slide_start(&shapes);
    let element = animations.elements().next().unwrap().borrow();
    assert!(!element.is_visible());
    assert_eq!(element.base_bbox(), kurbo::Rect::new(10.0, 20.0, 110.0, 50.0 + 20.0));
}
