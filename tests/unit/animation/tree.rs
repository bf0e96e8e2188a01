use std::rc::Rc;

use kurbo::Vec2;

use super::*;
use crate::timing::{ElapsedTime, ManualClock};

const SLIDE: usize = 2;

fn context() -> SlideShowContext {
    let timer = ElapsedTime::new(Rc::new(ManualClock::new()));
    let mut ctx = SlideShowContext::new(EngineConfig::default(), timer, Vec2::new(1000.0, 1000.0));
    ctx.slide = Some(SLIDE);
    ctx
}

fn build(root: &AnimationNodeInfo) -> AnimationTree {
    AnimationTree::build(SLIDE, root, Vec2::new(1000.0, 1000.0), &EngineConfig::default()).unwrap()
}

fn container(name: &str, begin: &str, children: Vec<AnimationNodeInfo>) -> AnimationNodeInfo {
    let mut info = AnimationNodeInfo::new(name);
    info.begin = Some(begin.into());
    info.children = children;
    info
}

fn set(target: &str, attribute: &str, to: &str) -> AnimationNodeInfo {
    let mut info = AnimationNodeInfo::new("set");
    info.target_element = Some(target.into());
    info.attribute_name = Some(attribute.into());
    info.to = Some(to.into());
    info.dur = Some("0.5s".into());
    info
}

/// Two click effects in a main sequence: `a` fades to 0.5, `b` to 0.2.
fn main_sequence() -> AnimationNodeInfo {
    let mut seq = container(
        "seq",
        "",
        vec![
            container("par", "next", vec![container("par", "0", vec![set("a", "opacity", "0.5")])]),
            container("par", "next", vec![container("par", "0", vec![set("b", "opacity", "0.2")])]),
        ],
    );
    seq.node_type = Some("main-sequence".into());
    let mut root = container("par", "", vec![seq]);
    root.node_type = Some("timing-root".into());
    root
}

fn pump(tree: &mut AnimationTree, ctx: &mut SlideShowContext) {
    for _ in 0..64 {
        let fired = ctx.timer_queue.process();
        let busy = !fired.is_empty() || ctx.activities.scheduled() > 0;
        for action in fired {
            tree.dispatch(action, ctx);
        }
        ctx.activities.process(&mut ctx.timer_queue);
        if !busy {
            return;
        }
    }
}

fn start(tree: &mut AnimationTree, ctx: &mut SlideShowContext) {
    let root = tree.root();
    assert!(tree.init(root, ctx));
    assert!(tree.resolve(root, ctx));
    pump(tree, ctx);
}

fn opacity(tree: &AnimationTree, element: &str) -> f64 {
    tree.element(element).unwrap().borrow().opacity()
}

#[test]
fn parse_inherits_fill_and_marks_auto_effects() {
    let mut root = main_sequence();
    root.children[0].children[1].begin = Some("0".into());
    root.children[0].children[1].id = Some("second".into());
    let tree = build(&root);

    assert_eq!(tree.len(), 8);
    let root_node = tree.node(tree.root()).unwrap();
    assert_eq!(root_node.fill(), FillMode::Freeze);
    assert_eq!(root_node.restart(), RestartMode::Always);

    let seq = tree.node(NodeId(1)).unwrap();
    assert!(seq.is_main_sequence_root());
    let effects = seq.children().to_vec();
    assert_eq!(effects.len(), 2);
    assert!(!tree.node(effects[0]).unwrap().is_first_auto_effect());
    assert!(tree.node(effects[1]).unwrap().is_first_auto_effect());
    assert_eq!(tree.node_by_document_id("second"), Some(effects[1]));

    let leaf = tree.nodes().find(|n| n.element().is_some()).unwrap();
    assert_eq!(leaf.fill(), FillMode::Freeze);
    assert_eq!(leaf.property(), Some(AnimatedProperty::Opacity));
    assert_eq!(tree.elements().count(), 2);
}

#[test]
fn root_without_timing_falls_back_to_freeze_and_timed_to_remove() {
    let mut timed = container("par", "", vec![]);
    timed.dur = Some("2s".into());
    assert_eq!(build(&timed).node(NodeId(0)).unwrap().fill(), FillMode::Remove);

    let mut repeated = container("par", "", vec![]);
    repeated.repeat_count = Some("indefinite".into());
    let tree = build(&repeated);
    let node = tree.node(NodeId(0)).unwrap();
    assert_eq!(node.repeat_count(), None);
    assert_eq!(node.fill(), FillMode::Remove);
}

#[test]
fn acceleration_beyond_one_is_reset() {
    let mut leaf = set("a", "opacity", "1");
    leaf.accelerate = Some("0.7".into());
    leaf.decelerate = Some("0.6".into());
    let tree = build(&container("par", "", vec![leaf]));
    let node = tree.node(NodeId(1)).unwrap();
    assert_eq!(node.acceleration(), 0.0);
    assert_eq!(node.deceleration(), 0.0);
}

#[test]
fn failing_child_drops_all_children() {
    let root = container(
        "par",
        "",
        vec![set("a", "opacity", "1"), AnimationNodeInfo::new("iterate")],
    );
    let tree = build(&root);
    assert_eq!(tree.len(), 1);
    assert!(tree.node(tree.root()).unwrap().children().is_empty());
}

#[test]
fn leaves_missing_required_attributes_are_invalid() {
    let mut untargeted = set("a", "opacity", "1");
    untargeted.target_element = None;
    let mut motion = AnimationNodeInfo::new("animateMotion");
    motion.target_element = Some("m".into());
    motion.path = Some("not a path".into());
    let mut transform = AnimationNodeInfo::new("animateTransform");
    transform.target_element = Some("t".into());
    transform.transition_type = Some("warp".into());
    let mut good_motion = motion.clone();
    good_motion.path = Some("M 0 0 L 0.5 0.5".into());

    let tree = build(&container(
        "par",
        "",
        vec![untargeted, motion, transform, good_motion],
    ));
    let states: Vec<NodeState> = tree.nodes().skip(1).map(|n| n.state()).collect();
    assert_eq!(
        states,
        vec![
            NodeState::Invalid,
            NodeState::Invalid,
            NodeState::Invalid,
            NodeState::Unresolved
        ]
    );
}

#[test]
fn offset_tree_plays_and_freezes() {
    let mut ctx = context();
    let mut tree = build(&container("par", "", vec![set("a", "opacity", "0.5")]));
    start(&mut tree, &mut ctx);

    assert!((opacity(&tree, "a") - 0.5).abs() < 1e-12);
    assert_eq!(tree.node(NodeId(1)).unwrap().state(), NodeState::Frozen);
    assert_eq!(tree.node(NodeId(0)).unwrap().state(), NodeState::Frozen);
    assert!(ctx.timer_queue.is_empty());
}

#[test]
fn syncbase_begin_waits_for_the_base_node() {
    let mut ctx = context();
    let mut first = set("a", "opacity", "0.5");
    first.id = Some("first".into());
    let mut second = set("b", "opacity", "0.3");
    second.begin = Some("first.end".into());
    let mut tree = build(&container("par", "", vec![first, second]));
    start(&mut tree, &mut ctx);

    assert!((opacity(&tree, "b") - 0.3).abs() < 1e-12);
    assert_eq!(tree.node(NodeId(2)).unwrap().state(), NodeState::Frozen);
    assert_eq!(tree.node(NodeId(0)).unwrap().state(), NodeState::Frozen);
}

#[test]
fn next_effects_play_in_order() {
    let mut ctx = context();
    let mut tree = build(&main_sequence());
    start(&mut tree, &mut ctx);
    assert_eq!(ctx.next_effects.len(), 1);
    assert_eq!(opacity(&tree, "a"), 1.0);

    let action = ctx.next_effects.fire(0).unwrap();
    tree.dispatch(action, &mut ctx);
    pump(&mut tree, &mut ctx);
    assert!((opacity(&tree, "a") - 0.5).abs() < 1e-12);
    assert_eq!(ctx.next_effects.len(), 2);
    assert_eq!(opacity(&tree, "b"), 1.0);
}

#[test]
fn skip_effect_finishes_the_running_effect() {
    let mut ctx = context();
    let mut tree = build(&main_sequence());
    start(&mut tree, &mut ctx);
    for index in 0..2 {
        let action = ctx.next_effects.fire(index).unwrap();
        tree.dispatch(action, &mut ctx);
        if index == 0 {
            pump(&mut tree, &mut ctx);
        }
    }
    ctx.multiplexer.notify_skip_effect(&mut ctx.timer_queue);
    pump(&mut tree, &mut ctx);

    assert!((opacity(&tree, "b") - 0.2).abs() < 1e-12);
    assert!(
        tree.nodes()
            .all(|n| n.state() == NodeState::Frozen),
        "every node frozen after the last effect"
    );
}

#[test]
fn rewind_last_effect_restores_the_previous_one() {
    let mut ctx = context();
    let mut tree = build(&main_sequence());
    start(&mut tree, &mut ctx);
    let action = ctx.next_effects.fire(0).unwrap();
    tree.dispatch(action, &mut ctx);
    pump(&mut tree, &mut ctx);
    assert!((opacity(&tree, "a") - 0.5).abs() < 1e-12);

    ctx.multiplexer.notify_rewind_last_effect(&mut ctx.timer_queue);
    pump(&mut tree, &mut ctx);

    assert_eq!(opacity(&tree, "a"), 1.0);
    let seq = tree.node(NodeId(1)).unwrap();
    assert_eq!(seq.finished_children(), 0);
    let first = seq.children()[0];
    assert_eq!(tree.node(first).unwrap().state(), NodeState::Resolved);
    // the re-armed effect reuses its activation event
    assert_eq!(ctx.next_effects.len(), 2);
    let action = ctx.next_effects.fire(0).unwrap();
    tree.dispatch(action, &mut ctx);
    pump(&mut tree, &mut ctx);
    assert!((opacity(&tree, "a") - 0.5).abs() < 1e-12);
}

#[test]
fn stale_slide_actions_are_dropped() {
    let mut ctx = context();
    let mut tree = build(&container("par", "", vec![set("a", "opacity", "0.5")]));
    tree.dispatch(
        EventAction::Node {
            slide: SLIDE + 1,
            node: NodeId(0),
            action: NodeAction::Activate,
        },
        &mut ctx,
    );
    assert_eq!(tree.node(NodeId(0)).unwrap().state(), NodeState::Unresolved);
    tree.dispatch(EventAction::Marker(4), &mut ctx);
    assert_eq!(ctx.take_deferred(), Some(EventAction::Marker(4)));
}
