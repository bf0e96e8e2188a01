//! The animation node graph of one slide.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Timed work on a node is queued as
//! an [`EventAction::Node`] and comes back through [`AnimationTree::handle`], so no event ever holds
//! a reference into the graph.

use std::collections::{BTreeMap, HashMap};

use kurbo::{BezPath, Rect, Vec2};

use crate::activities::ActivityParamSet;
use crate::animation::element::{AnimatedElement, ElementRef};
use crate::animation::factory::create_activity;
use crate::animation::node_info::{
    AdditiveMode, AnimationNodeInfo, FillMode, ImpressNodeType, NodeKind, RestartMode,
};
use crate::animation::property::AnimatedProperty;
use crate::animation::state::{NodeState, NodeStateMachine, StateTransition};
use crate::events::{
    EventAction, EventRef, HandlerNotice, InteractiveAnimationSequence, NodeAction, Notifier,
    RewindedHandler, SourceEventElement, make_delay, make_event,
};
use crate::foundation::config::EngineConfig;
use crate::foundation::ids::{ActivityId, NodeId};
use crate::handler::context::SlideShowContext;
use crate::timing::{Duration, EventTrigger, Timing, TimingType};

const FROZEN_OR_ENDED: u8 = NodeState::Frozen.bit() | NodeState::Ended.bit();

/// Upper bound on force-empty rounds while skipping; a node graph that keeps rescheduling itself
/// with zero delay would otherwise never drain.
const MAX_FLUSH_ROUNDS: usize = 1024;

#[derive(Debug)]
struct Container {
    sequential: bool,
    node_type: ImpressNodeType,
    children: Vec<NodeId>,
    finished_children: usize,
    /// No explicit duration and no offset end: the container ends when its children do.
    duration_indefinite: bool,
    left_iterations: f64,
    is_effect: bool,
    rewinding: bool,
    skip_event: Option<EventRef>,
    rewind_current_event: Option<EventRef>,
    rewind_last_event: Option<EventRef>,
}

impl Container {
    fn new(sequential: bool) -> Self {
        Self {
            sequential,
            node_type: ImpressNodeType::Default,
            children: Vec::new(),
            finished_children: 0,
            duration_indefinite: false,
            left_iterations: 1.0,
            is_effect: false,
            rewinding: false,
            skip_event: None,
            rewind_current_event: None,
            rewind_last_event: None,
        }
    }

    fn dispose_effect_events(&mut self) {
        for event in [
            self.skip_event.take(),
            self.rewind_current_event.take(),
            self.rewind_last_event.take(),
        ]
        .into_iter()
        .flatten()
        {
            event.dispose();
        }
    }
}

#[derive(Debug, Default)]
struct Leaf {
    element: Option<ElementRef>,
    property: Option<AnimatedProperty>,
    activity: Option<ActivityId>,
    min_frame_count: f64,
}

#[derive(Debug)]
enum Body {
    Container(Container),
    Leaf(Leaf),
}

/// One node of the graph with its parsed timing attributes.
#[derive(Debug)]
pub struct AnimationNode {
    id: NodeId,
    kind: NodeKind,
    parent: Option<NodeId>,
    info: AnimationNodeInfo,
    machine: NodeStateMachine,
    begin: Timing,
    end: Option<Timing>,
    duration: Option<Duration>,
    fill: FillMode,
    restart: RestartMode,
    repeat_count: Option<f64>,
    acceleration: f64,
    deceleration: f64,
    auto_reverse: bool,
    is_first_auto_effect: bool,
    activation_event: Option<EventRef>,
    deactivation_event: Option<EventRef>,
    body: Body,
}

impl AnimationNode {
    fn new(
        id: NodeId,
        kind: NodeKind,
        parent: Option<NodeId>,
        info: AnimationNodeInfo,
        body: Body,
    ) -> Self {
        Self {
            id,
            kind,
            parent,
            info,
            machine: NodeStateMachine::default(),
            begin: Timing::offset(0.0),
            end: None,
            duration: None,
            fill: FillMode::Default,
            restart: RestartMode::Default,
            repeat_count: Some(1.0),
            acceleration: 0.0,
            deceleration: 0.0,
            auto_reverse: false,
            is_first_auto_effect: false,
            activation_event: None,
            deactivation_event: None,
            body,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attributes as delivered, without the children.
    pub fn info(&self) -> &AnimationNodeInfo {
        &self.info
    }

    pub fn state(&self) -> NodeState {
        self.machine.state()
    }

    pub fn is_valid(&self) -> bool {
        self.machine.state() != NodeState::Invalid
    }

    pub fn begin(&self) -> &Timing {
        &self.begin
    }

    pub fn end_timing(&self) -> Option<&Timing> {
        self.end.as_ref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn fill(&self) -> FillMode {
        self.fill
    }

    pub fn restart(&self) -> RestartMode {
        self.restart
    }

    /// `None` repeats indefinitely.
    pub fn repeat_count(&self) -> Option<f64> {
        self.repeat_count
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn deceleration(&self) -> f64 {
        self.deceleration
    }

    pub fn auto_reverse(&self) -> bool {
        self.auto_reverse
    }

    pub fn is_first_auto_effect(&self) -> bool {
        self.is_first_auto_effect
    }

    pub fn is_container(&self) -> bool {
        matches!(self.body, Body::Container(_))
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.body {
            Body::Container(c) => &c.children,
            Body::Leaf(_) => &[],
        }
    }

    pub fn finished_children(&self) -> usize {
        match &self.body {
            Body::Container(c) => c.finished_children,
            Body::Leaf(_) => 0,
        }
    }

    pub fn node_type(&self) -> ImpressNodeType {
        match &self.body {
            Body::Container(c) => c.node_type,
            Body::Leaf(_) => ImpressNodeType::Default,
        }
    }

    /// Container carrying a preset, i.e. one user-visible effect.
    pub fn is_effect(&self) -> bool {
        matches!(&self.body, Body::Container(c) if c.is_effect)
    }

    pub fn is_main_sequence_root(&self) -> bool {
        self.node_type() == ImpressNodeType::MainSequence
    }

    pub fn is_interactive_sequence_root(&self) -> bool {
        self.node_type() == ImpressNodeType::InteractiveSequence
    }

    pub fn element(&self) -> Option<&ElementRef> {
        match &self.body {
            Body::Leaf(leaf) => leaf.element.as_ref(),
            Body::Container(_) => None,
        }
    }

    pub fn property(&self) -> Option<AnimatedProperty> {
        match &self.body {
            Body::Leaf(leaf) => leaf.property,
            Body::Container(_) => None,
        }
    }

    pub fn activity(&self) -> Option<ActivityId> {
        match &self.body {
            Body::Leaf(leaf) => leaf.activity,
            Body::Container(_) => None,
        }
    }

    fn dispose_events(&mut self) {
        if let Some(event) = &self.activation_event {
            event.dispose();
        }
        if let Some(event) = &self.deactivation_event {
            event.dispose();
        }
    }
}

/// Node graph of one slide plus the animated elements its leaves target.
#[derive(Debug)]
pub struct AnimationTree {
    slide: usize,
    nodes: Vec<AnimationNode>,
    elements: BTreeMap<String, ElementRef>,
    /// Document `id` attribute to node, for syncbase timings.
    node_ids: HashMap<String, NodeId>,
    slide_size: Vec2,
}

impl AnimationTree {
    /// Build and parse the graph under `root`. `None` if the root itself cannot be created.
    pub fn build(
        slide: usize,
        root: &AnimationNodeInfo,
        slide_size: Vec2,
        config: &EngineConfig,
    ) -> Option<Self> {
        let mut tree = Self {
            slide,
            nodes: Vec::new(),
            elements: BTreeMap::new(),
            node_ids: HashMap::new(),
            slide_size,
        };
        tree.create_node(root, None)?;
        // preorder: every parent is parsed before its children
        for index in 0..tree.nodes.len() {
            tree.parse_node(NodeId(index as u32), config);
        }
        tracing::debug!(slide, nodes = tree.nodes.len(), "animation tree built");
        Some(tree)
    }

    pub fn slide(&self) -> usize {
        self.slide
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&AnimationNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &AnimationNode> {
        self.nodes.iter()
    }

    pub fn node_by_document_id(&self, id: &str) -> Option<NodeId> {
        self.node_ids.get(id).copied()
    }

    pub fn element(&self, id: &str) -> Option<&ElementRef> {
        self.elements.get(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementRef> {
        self.elements.values()
    }

    /// True if any node could still start an animation.
    pub fn has_pending_animation(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| n.is_valid() && matches!(n.body, Body::Leaf(_)))
    }

    fn action(&self, node: NodeId, action: NodeAction) -> EventAction {
        EventAction::Node {
            slide: self.slide,
            node,
            action,
        }
    }

    fn create_node(&mut self, info: &AnimationNodeInfo, parent: Option<NodeId>) -> Option<NodeId> {
        let Some(kind) = NodeKind::parse(&info.node_name) else {
            tracing::warn!(name = %info.node_name, "unknown animation node");
            return None;
        };
        let body = match kind {
            NodeKind::Par => Body::Container(Container::new(false)),
            NodeKind::Seq => Body::Container(Container::new(true)),
            NodeKind::Animate
            | NodeKind::Set
            | NodeKind::AnimateMotion
            | NodeKind::AnimateColor
            | NodeKind::AnimateTransform
            | NodeKind::TransitionFilter => Body::Leaf(Leaf::default()),
            NodeKind::Iterate | NodeKind::Audio | NodeKind::Command => {
                tracing::warn!(kind = ?kind, "animation node not supported");
                return None;
            }
        };

        let id = NodeId(self.nodes.len() as u32);
        let mut own = info.clone();
        own.children.clear();
        self.nodes.push(AnimationNode::new(id, kind, parent, own, body));

        if kind.is_container() {
            let mut children = Vec::with_capacity(info.children.len());
            for child in &info.children {
                match self.create_node(child, Some(id)) {
                    Some(child_id) => children.push(child_id),
                    None => {
                        tracing::warn!(
                            node = %id,
                            "child node creation failed, dropping all children"
                        );
                        self.nodes.truncate(id.index() + 1);
                        children.clear();
                        break;
                    }
                }
            }
            if let Body::Container(c) = &mut self.nodes[id.index()].body {
                c.children = children;
            }
        }
        Some(id)
    }

    fn parse_node(&mut self, id: NodeId, config: &EngineConfig) {
        let parent = self.nodes[id.index()].parent.map(|p| {
            let p = &self.nodes[p.index()];
            (p.fill, p.restart, p.is_main_sequence_root())
        });
        let slide_size = self.slide_size;
        let node = &mut self.nodes[id.index()];

        if let Some(doc_id) = &node.info.id {
            self.node_ids.insert(doc_id.clone(), id);
        }

        node.begin = Timing::parse(node.info.begin.as_deref().unwrap_or_default());
        node.end = node.info.end.as_deref().map(Timing::parse);
        let duration = Duration::parse(node.info.dur.as_deref());
        node.duration = if duration.is_set() {
            Some(duration)
        } else if node.is_container() {
            None
        } else {
            Some(Duration::Indefinite)
        };

        node.repeat_count = match node.info.repeat_count.as_deref().map(str::trim) {
            Some("indefinite") => None,
            Some(count) => Some(count.parse::<f64>().ok().filter(|c| !c.is_nan()).unwrap_or(1.0)),
            None => Some(1.0),
        };
        node.acceleration = parse_fraction(node.info.accelerate.as_deref());
        node.deceleration = parse_fraction(node.info.decelerate.as_deref());
        if node.acceleration + node.deceleration > 1.0 {
            node.acceleration = 0.0;
            node.deceleration = 0.0;
        }
        node.auto_reverse = node.info.autoreverse.as_deref() == Some("true");

        let mut fill = node
            .info
            .fill
            .as_deref()
            .and_then(FillMode::parse)
            .unwrap_or_default();
        if fill == FillMode::Default {
            fill = parent.map_or(FillMode::Auto, |(f, _, _)| f);
        }
        if fill == FillMode::Auto {
            let timed = node.end.is_some()
                || node.repeat_count != Some(1.0)
                || node.info.dur.is_some() && node.duration.is_some_and(|d| !d.is_indefinite());
            fill = if timed { FillMode::Remove } else { FillMode::Freeze };
        }
        let mut restart = node
            .info
            .restart
            .as_deref()
            .and_then(RestartMode::parse)
            .unwrap_or_default();
        if restart == RestartMode::Default {
            restart = parent.map_or(RestartMode::Always, |(_, r, _)| r);
        }
        node.fill = fill;
        node.restart = restart;
        node.machine.set_modes(restart, fill);

        match &mut node.body {
            Body::Container(c) => {
                if parent.is_some_and(|(_, _, main)| main)
                    && node.begin.event_type != EventTrigger::OnNext
                {
                    node.is_first_auto_effect = true;
                }
                c.node_type = node
                    .info
                    .node_type
                    .as_deref()
                    .and_then(ImpressNodeType::parse)
                    .unwrap_or_default();
                c.is_effect = node.info.preset_id.is_some();
                c.duration_indefinite = node.duration.is_none_or(|d| d.is_indefinite())
                    && node
                        .end
                        .as_ref()
                        .is_none_or(|e| e.timing_type != TimingType::Offset);
            }
            Body::Leaf(leaf) => {
                let mut valid = true;
                leaf.min_frame_count =
                    config.min_frame_count(node.duration.and_then(|d| d.value()));
                match node.info.target_element.as_deref() {
                    Some(target) => {
                        let element = self
                            .elements
                            .entry(target.to_owned())
                            .or_insert_with(|| {
                                AnimatedElement::new(target, slide_size.x, slide_size.y).into_ref()
                            })
                            .clone();
                        {
                            let mut e = element.borrow_mut();
                            if node.info.sub_item.as_deref() == Some("OnlyText") {
                                e.set_text(true);
                            }
                            e.set_additive_mode(
                                node.info
                                    .additive
                                    .as_deref()
                                    .and_then(AdditiveMode::parse)
                                    .unwrap_or_default(),
                            );
                        }
                        leaf.element = Some(element);
                    }
                    None => {
                        tracing::warn!(node = %id, "animation node without target element");
                        valid = false;
                    }
                }
                match leaf_property(node.kind, &node.info) {
                    Ok(property) => leaf.property = property,
                    Err(reason) => {
                        tracing::warn!(node = %id, reason, "animation node rejected");
                        valid = false;
                    }
                }
                if !valid {
                    node.machine.set_state(NodeState::Invalid);
                }
            }
        }
    }

    fn container(&self, id: NodeId) -> Option<&Container> {
        match &self.nodes.get(id.index())?.body {
            Body::Container(c) => Some(c),
            Body::Leaf(_) => None,
        }
    }

    fn container_mut(&mut self, id: NodeId) -> Option<&mut Container> {
        match &mut self.nodes.get_mut(id.index())?.body {
            Body::Container(c) => Some(c),
            Body::Leaf(_) => None,
        }
    }

    fn state(&self, id: NodeId) -> NodeState {
        self.nodes[id.index()].machine.state()
    }

    fn is_valid(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(AnimationNode::is_valid)
    }

    /// Run a queued node action.
    pub fn handle(&mut self, node: NodeId, action: NodeAction, ctx: &mut SlideShowContext) {
        if node.index() >= self.nodes.len() {
            tracing::warn!(%node, "action for unknown node dropped");
            return;
        }
        tracing::trace!(%node, ?action, "node action");
        match action {
            NodeAction::Activate => {
                self.activate(node, ctx);
            }
            NodeAction::Deactivate => self.deactivate(node, ctx),
            NodeAction::Repeat => {
                self.repeat(node, ctx);
            }
            NodeAction::SkipEffect(child) => self.skip_effect(node, child, ctx),
            NodeAction::RewindCurrentEffect(child) => self.rewind_current_effect(node, child, ctx),
            NodeAction::RewindLastEffect(child) => self.rewind_last_effect(node, child, ctx),
        }
    }

    /// Reset `id` and its subtree to unresolved, creating leaf activities on first use.
    pub fn init(&mut self, id: NodeId, ctx: &mut SlideShowContext) -> bool {
        if !self.is_valid(id) {
            return false;
        }
        let node = &mut self.nodes[id.index()];
        node.dispose_events();
        node.machine.set_state(NodeState::Unresolved);
        match &mut node.body {
            Body::Container(c) => {
                c.left_iterations = node.repeat_count.unwrap_or(f64::INFINITY);
                self.init_children(id, ctx)
            }
            Body::Leaf(_) => self.init_activity(id, ctx),
        }
    }

    fn init_children(&mut self, id: NodeId, ctx: &mut SlideShowContext) -> bool {
        let Some(c) = self.container_mut(id) else {
            return false;
        };
        c.finished_children = 0;
        let children = c.children.clone();
        let mut initialised = 0;
        for child in &children {
            if self.init(*child, ctx) {
                initialised += 1;
            }
        }
        initialised == children.len()
    }

    fn init_activity(&mut self, id: NodeId, ctx: &mut SlideShowContext) -> bool {
        let end_event = make_event(self.action(id, NodeAction::Deactivate));
        let node = &self.nodes[id.index()];
        let Body::Leaf(leaf) = &node.body else {
            return false;
        };
        if let Some(activity) = leaf.activity {
            if let Some(activity) = ctx.activities.get_mut(activity) {
                activity.activate(end_event);
            }
            return true;
        }
        let Some(element) = leaf.element.clone() else {
            return true;
        };

        let mut params = ActivityParamSet::new(ctx.timer.clone(), self.slide_size);
        params.end_event = Some(end_event);
        params.min_duration = match node.duration.and_then(|d| d.value()) {
            Some(seconds) => seconds,
            None => {
                tracing::debug!(node = %id, "duration is not a number, using the minimum");
                0.001
            }
        };
        params.min_frame_count = leaf.min_frame_count;
        params.auto_reverse = node.auto_reverse;
        params.repeat_count = node.repeat_count;
        params.acceleration = node.acceleration;
        params.deceleration = node.deceleration;

        let Some(activity) = create_activity(node.kind, &node.info, leaf.property, &element, params)
        else {
            return true;
        };
        let activity = ctx.activities.insert(activity);
        if let Body::Leaf(leaf) = &mut self.nodes[id.index()].body {
            leaf.activity = Some(activity);
        }
        true
    }

    /// Move `id` to resolved and schedule its activation according to its begin timing.
    pub fn resolve(&mut self, id: NodeId, ctx: &mut SlideShowContext) -> bool {
        if !self.is_valid(id) {
            return false;
        }
        let action = self.action(id, NodeAction::Activate);
        let node = &mut self.nodes[id.index()];
        if node.machine.state() == NodeState::Resolved {
            tracing::debug!(node = %id, "node already resolved");
        }
        let Some(mut transition) = enter(&mut node.machine, NodeState::Resolved, false) else {
            return false;
        };
        if !node.machine.is_transition(NodeState::Resolved, NodeState::Active) {
            transition.clear(&mut node.machine);
            return false;
        }
        transition.commit(&mut node.machine);

        let event = match &node.activation_event {
            Some(event) => {
                event.charge();
                event.clone()
            }
            None => {
                let event = make_delay(action, node.begin.offset);
                node.activation_event = Some(event.clone());
                event
            }
        };
        let begin = node.begin.clone();
        self.register_event(id, &begin, event, ctx);
        true
    }

    pub fn activate(&mut self, id: NodeId, ctx: &mut SlideShowContext) -> bool {
        if !self.is_valid(id) {
            return false;
        }
        let node = &mut self.nodes[id.index()];
        if node.machine.state() == NodeState::Active {
            tracing::debug!(node = %id, "node already active");
        }
        let Some(mut transition) = enter(&mut node.machine, NodeState::Active, false) else {
            return false;
        };
        self.activate_st(id, ctx);
        let node = &mut self.nodes[id.index()];
        transition.commit(&mut node.machine);
        if node.is_first_auto_effect {
            ctx.multiplexer
                .push_notice(HandlerNotice::FirstAutoEffectStarted);
        }
        ctx.multiplexer
            .notify_event(EventTrigger::BeginEvent, &Notifier::Node(id), &mut ctx.timer_queue);
        true
    }

    /// Freeze `id` if its fill allows it, end it otherwise.
    pub fn deactivate(&mut self, id: NodeId, ctx: &mut SlideShowContext) {
        if !self.is_valid(id) {
            return;
        }
        let machine = &mut self.nodes[id.index()].machine;
        if machine.in_state_or_transition(FROZEN_OR_ENDED) {
            return;
        }
        if !machine.is_transition(machine.state(), NodeState::Frozen) {
            self.end(id, ctx);
            return;
        }
        let Some(mut transition) = enter(machine, NodeState::Frozen, true) else {
            return;
        };
        self.deactivate_st(id, NodeState::Frozen, ctx);
        transition.commit(&mut self.nodes[id.index()].machine);
        self.notify_end_listeners(id, ctx);
        self.after_deactivation(id, ctx);
    }

    pub fn end(&mut self, id: NodeId, ctx: &mut SlideShowContext) {
        if !self.is_valid(id) {
            return;
        }
        let machine = &mut self.nodes[id.index()].machine;
        if machine.in_state_or_transition(NodeState::Ended.bit()) {
            return;
        }
        let was_frozen = machine.in_state_or_transition(NodeState::Frozen.bit());
        if !machine.is_transition(machine.state(), NodeState::Ended) {
            tracing::debug!(node = %id, state = ?machine.state(), "forcing end");
        }
        let Some(mut transition) = enter(machine, NodeState::Ended, true) else {
            return;
        };
        self.deactivate_st(id, NodeState::Ended, ctx);
        transition.commit(&mut self.nodes[id.index()].machine);
        // a frozen node told its listeners when it froze
        if !was_frozen {
            self.notify_end_listeners(id, ctx);
        }
        self.after_deactivation(id, ctx);
    }

    fn after_deactivation(&mut self, id: NodeId, ctx: &mut SlideShowContext) {
        let node = &mut self.nodes[id.index()];
        if node.is_first_auto_effect {
            ctx.multiplexer.push_notice(HandlerNotice::FirstAutoEffectEnded);
        }
        node.dispose_events();
    }

    fn notify_end_listeners(&mut self, id: NodeId, ctx: &mut SlideShowContext) {
        let parent = self.nodes[id.index()].parent;
        if let Some(parent) = parent {
            self.notify_deactivating(parent, id, ctx);
        }
        ctx.multiplexer
            .notify_event(EventTrigger::EndEvent, &Notifier::Node(id), &mut ctx.timer_queue);
        if parent.is_some_and(|p| self.nodes[p.index()].is_main_sequence_root()) {
            ctx.multiplexer.notify_next_effect_end();
        }
        if self.nodes[id.index()].is_main_sequence_root() {
            ctx.multiplexer.notify_animations_end();
        }
    }

    fn activate_st(&mut self, id: NodeId, ctx: &mut SlideShowContext) {
        match &self.nodes[id.index()].body {
            Body::Container(c) if !c.sequential => {
                let children = c.children.clone();
                let indefinite = c.duration_indefinite;
                let mut resolved = 0;
                for child in &children {
                    if self.resolve(*child, ctx) {
                        resolved += 1;
                    }
                }
                if resolved != children.len() {
                    tracing::warn!(node = %id, resolved, total = children.len(), "not all children resolved");
                }
                if indefinite && children.is_empty() {
                    let event = self.make_deactivation_event(id, Some(0.0));
                    self.schedule_deactivation(id, event, ctx);
                } else {
                    self.schedule_deactivation(id, None, ctx);
                }
            }
            Body::Container(c) => {
                let children = c.children.clone();
                let indefinite = c.duration_indefinite;
                loop {
                    let finished = self.container(id).map_or(0, |c| c.finished_children);
                    let Some(&child) = children.get(finished) else {
                        break;
                    };
                    if self.resolve_child(id, child, ctx) {
                        break;
                    }
                    tracing::warn!(node = %id, %child, "resolving child failed, skipping it");
                    if let Some(c) = self.container_mut(id) {
                        c.finished_children += 1;
                    }
                }
                let finished = self.container(id).map_or(0, |c| c.finished_children);
                if indefinite && finished >= children.len() {
                    let event = self.make_deactivation_event(id, Some(0.0));
                    self.schedule_deactivation(id, event, ctx);
                } else {
                    self.schedule_deactivation(id, None, ctx);
                }
            }
            Body::Leaf(leaf) => match (leaf.activity, leaf.element.clone()) {
                (Some(activity_id), Some(element)) => {
                    element.borrow_mut().save_state(id);
                    let Some(activity) = ctx.activities.get_mut(activity_id) else {
                        return;
                    };
                    activity.set_targets(element);
                    if ctx.is_skipping {
                        activity.end(&mut ctx.timer_queue);
                    } else {
                        ctx.activities.add_activity(activity_id);
                    }
                }
                _ => self.schedule_deactivation(id, None, ctx),
            },
        }
    }

    fn deactivate_st(&mut self, id: NodeId, dest: NodeState, ctx: &mut SlideShowContext) {
        let removes = self.nodes[id.index()].fill == FillMode::Remove;
        match &mut self.nodes[id.index()].body {
            Body::Container(c) => {
                c.left_iterations = 0.0;
                let children = c.children.clone();
                if dest == NodeState::Frozen {
                    for child in children {
                        if self.state(child).bit() & !FROZEN_OR_ENDED != 0 {
                            self.deactivate(child, ctx);
                        }
                    }
                } else {
                    for child in children {
                        if self.state(child).bit() & !NodeState::Ended.bit() != 0 {
                            self.end(child, ctx);
                        }
                    }
                    if removes {
                        self.remove_effect(id);
                    }
                }
            }
            Body::Leaf(leaf) => {
                let activity = leaf.activity;
                let has_element = leaf.element.is_some();
                if dest == NodeState::Frozen {
                    end_activity(ctx, activity);
                } else {
                    if let Some(activity) = activity.and_then(|a| ctx.activities.get_mut(a)) {
                        activity.dispose();
                    }
                    if removes && has_element {
                        self.remove_effect(id);
                    }
                }
            }
        }
    }

    /// Put the elements touched by `id` back the way they were before it ran.
    fn remove_effect(&mut self, id: NodeId) {
        match &self.nodes[id.index()].body {
            Body::Container(c) => {
                let children = c.children.clone();
                for child in children.iter().rev() {
                    if self.state(*child).bit() & FROZEN_OR_ENDED == 0 {
                        tracing::debug!(node = %child, "child neither frozen nor ended, not removed");
                        continue;
                    }
                    self.remove_effect(*child);
                }
            }
            Body::Leaf(leaf) => {
                if let Some(element) = &leaf.element {
                    element.borrow_mut().restore_state(id);
                }
            }
        }
    }

    fn make_deactivation_event(&mut self, id: NodeId, delay: Option<f64>) -> Option<EventRef> {
        let action = self.action(id, NodeAction::Deactivate);
        let node = &mut self.nodes[id.index()];
        if let Some(event) = &node.deactivation_event {
            event.charge();
            return Some(event.clone());
        }
        let event = make_delay(action, delay?);
        node.deactivation_event = Some(event.clone());
        Some(event)
    }

    /// Queue the end of `id`; without an explicit event the node's own duration decides.
    fn schedule_deactivation(
        &mut self,
        id: NodeId,
        event: Option<EventRef>,
        ctx: &mut SlideShowContext,
    ) {
        let event = match event {
            Some(event) => Some(event),
            None => {
                let duration = self.nodes[id.index()].duration.and_then(|d| d.value());
                self.make_deactivation_event(id, duration)
            }
        };
        if let Some(event) = event {
            ctx.timer_queue.add_event(Some(event));
        }
    }

    fn notify_deactivating(&mut self, parent: NodeId, child: NodeId, ctx: &mut SlideShowContext) {
        let Some(c) = self.container(parent) else {
            return;
        };
        if !c.sequential {
            self.notify_deactivated_child(parent, child, ctx);
            return;
        }
        if c.rewinding {
            return;
        }
        if self.notify_deactivated_child(parent, child, ctx) {
            return;
        }
        let Some(c) = self.container(parent) else {
            return;
        };
        let Some(&next) = c.children.get(c.finished_children) else {
            return;
        };
        if self.state(next) != NodeState::Unresolved {
            tracing::debug!(node = %next, state = ?self.state(next), "next child not unresolved");
        }
        if !self.resolve_child(parent, next, ctx) {
            self.deactivate(parent, ctx);
        }
    }

    /// Count a finished child; `true` once every child has finished.
    fn notify_deactivated_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        ctx: &mut SlideShowContext,
    ) -> bool {
        if self.state(child).bit() & FROZEN_OR_ENDED == 0 {
            tracing::error!(node = %child, "deactivated child is neither frozen nor ended");
        }
        let repeat = self.action(parent, NodeAction::Repeat);
        let Some(c) = self.container_mut(parent) else {
            return false;
        };
        if !c.children.contains(&child) {
            tracing::warn!(node = %parent, %child, "deactivation of an unknown child");
            return false;
        }
        if c.finished_children >= c.children.len() {
            tracing::error!(node = %parent, "more children finished than present");
            return false;
        }
        c.finished_children += 1;
        let mut finished = c.finished_children >= c.children.len();
        if finished && c.duration_indefinite {
            if c.left_iterations >= 1.0 {
                c.left_iterations -= 1.0;
            }
            if c.left_iterations >= 1.0 {
                finished = false;
                ctx.timer_queue.add_event(Some(make_delay(repeat, 0.0)));
            } else {
                self.deactivate(parent, ctx);
            }
        }
        finished
    }

    fn repeat(&mut self, id: NodeId, ctx: &mut SlideShowContext) -> bool {
        let Some(c) = self.container(id) else {
            return false;
        };
        let children = c.children.clone();
        for child in children {
            if self.state(child).bit() & !NodeState::Ended.bit() != 0 {
                self.end(child, ctx);
            }
        }
        self.remove_effect(id);
        let initialised = self.init_children(id, ctx);
        if initialised {
            self.activate_st(id, ctx);
        }
        initialised
    }

    /// Resolve `child` of the sequence `seq` and hand the skip and rewind hooks of a main or
    /// interactive sequence over to the multiplexer.
    fn resolve_child(&mut self, seq: NodeId, child: NodeId, ctx: &mut SlideShowContext) -> bool {
        let resolved = self.resolve(child, ctx);
        let node = &self.nodes[seq.index()];
        let main = node.is_main_sequence_root();
        let interactive = node.is_interactive_sequence_root();
        if !resolved || !(main || interactive) {
            return resolved;
        }

        let skip = make_event(self.action(seq, NodeAction::SkipEffect(child)));
        let rewind_current = make_event(self.action(seq, NodeAction::RewindCurrentEffect(child)));
        let rewind_last = make_event(self.action(seq, NodeAction::RewindLastEffect(child)));
        if let Some(c) = self.container_mut(seq) {
            c.dispose_effect_events();
            c.skip_event = Some(skip.clone());
            c.rewind_current_event = Some(rewind_current.clone());
            c.rewind_last_event = Some(rewind_last.clone());
        }
        let mux = &mut ctx.multiplexer;
        if main {
            mux.register_skip_effect_event(skip);
            mux.register_rewind_current_effect_event(rewind_current);
            mux.register_rewind_last_effect_event(rewind_last);
        } else {
            mux.register_skip_interactive_effect_event(child, skip);
            mux.register_rewind_running_interactive_effect_event(child, rewind_current);
            mux.register_rewind_ended_interactive_effect_event(child, rewind_last);
        }
        true
    }

    fn is_child(&self, seq: NodeId, child: NodeId) -> bool {
        let known = self
            .container(seq)
            .is_some_and(|c| c.children.contains(&child));
        if !known {
            tracing::warn!(node = %seq, %child, "effect action for a node that is not a child");
        }
        known
    }

    /// Run `child` of `seq` to its end state at once.
    fn skip_effect(&mut self, seq: NodeId, child: NodeId, ctx: &mut SlideShowContext) {
        if !self.is_child(seq, child) {
            return;
        }
        ctx.activities.end_all(&mut ctx.timer_queue);
        ctx.is_skipping = true;
        self.flush_events(ctx);
        ctx.is_skipping = false;
        let deactivate = make_event(self.action(child, NodeAction::Deactivate));
        ctx.timer_queue.add_event(Some(deactivate));
    }

    /// Undo `child` of `seq`, which is still playing, and arm it again.
    fn rewind_current_effect(&mut self, seq: NodeId, child: NodeId, ctx: &mut SlideShowContext) {
        if !self.is_child(seq, child) {
            return;
        }
        let Some(c) = self.container_mut(seq) else {
            return;
        };
        if c.rewinding {
            tracing::error!(node = %seq, "rewind requested while rewinding");
            return;
        }
        c.rewinding = true;

        ctx.activities.end_all(&mut ctx.timer_queue);
        ctx.is_skipping = true;
        self.flush_events(ctx);
        ctx.is_skipping = false;
        // activities started while skipping
        ctx.activities.end_all(&mut ctx.timer_queue);

        self.end(child, ctx);
        self.remove_effect(child);
        self.init(child, ctx);
        self.resolve_child(seq, child, ctx);
        self.notify_rewinded(seq, child, ctx);

        if let Some(c) = self.container_mut(seq) {
            c.rewinding = false;
        }
    }

    /// Undo the effect before `child` of `seq`. `child` is armed but has not started.
    fn rewind_last_effect(&mut self, seq: NodeId, child: NodeId, ctx: &mut SlideShowContext) {
        if !self.is_child(seq, child) {
            return;
        }
        let Some(c) = self.container_mut(seq) else {
            return;
        };
        if c.rewinding {
            tracing::error!(node = %seq, "rewind requested while rewinding");
            return;
        }
        c.rewinding = true;

        self.flush_events(ctx);
        ctx.activities.clear();
        self.end(child, ctx);

        let previous = self.container_mut(seq).and_then(|c| {
            if c.finished_children == 0 {
                return None;
            }
            c.finished_children -= 1;
            Some(c.children[c.finished_children])
        });
        match previous {
            Some(previous) => {
                self.remove_effect(previous);
                self.init(previous, ctx);
                self.init(child, ctx);
                self.resolve_child(seq, previous, ctx);
                self.notify_rewinded(seq, child, ctx);
            }
            None => tracing::error!(node = %seq, "no finished effect to rewind"),
        }

        if let Some(c) = self.container_mut(seq) {
            c.rewinding = false;
        }
    }

    fn notify_rewinded(&mut self, seq: NodeId, child: NodeId, ctx: &mut SlideShowContext) {
        if !self.nodes[seq.index()].is_interactive_sequence_root() {
            return;
        }
        ctx.multiplexer
            .notify_rewinded_effect(&Notifier::Node(child));
        if let Some(source) = self.nodes[child.index()].begin.event_base_element.clone() {
            ctx.multiplexer
                .notify_rewinded_effect(&Notifier::Element(source));
        }
    }

    /// Fire everything queued, however far in the future, until the queue stays empty.
    fn flush_events(&mut self, ctx: &mut SlideShowContext) {
        for _ in 0..MAX_FLUSH_ROUNDS {
            let fired = ctx.timer_queue.force_empty();
            if fired.is_empty() {
                return;
            }
            for action in fired {
                self.dispatch(action, ctx);
            }
        }
        tracing::error!(slide = self.slide, "events keep rescheduling, flush abandoned");
    }

    /// Run an action fired while the graph is busy; whatever is not a node action of this slide
    /// goes to the handler.
    pub fn dispatch(&mut self, action: EventAction, ctx: &mut SlideShowContext) {
        match action {
            EventAction::Node {
                slide,
                node,
                action,
            } if slide == self.slide => self.handle(node, action, ctx),
            EventAction::Node { slide, node, .. } => {
                tracing::trace!(slide, %node, "stale node action dropped");
            }
            EventAction::WakeActivity(activity) => {
                ctx.activities.add_activity(activity);
            }
            other => ctx.defer(other),
        }
    }

    fn register_event(
        &mut self,
        id: NodeId,
        timing: &Timing,
        event: EventRef,
        ctx: &mut SlideShowContext,
    ) {
        match timing.timing_type {
            TimingType::Offset => {
                ctx.timer_queue.add_event(Some(event));
            }
            TimingType::Event => match &timing.event_base_element {
                Some(source) => {
                    if timing.event_type != EventTrigger::OnClick {
                        tracing::warn!(node = %id, trigger = ?timing.event_type, "unsupported shape event");
                        return;
                    }
                    let bounds = self
                        .elements
                        .get(source)
                        .map_or(Rect::ZERO, |e| e.borrow().base_bbox());
                    ctx.source_elements
                        .entry(source.clone())
                        .or_insert_with(|| SourceEventElement::new(source.clone(), bounds));

                    let notifier = Notifier::Element(source.clone());
                    let mux = &mut ctx.multiplexer;
                    mux.register_event(EventTrigger::OnClick, notifier.clone(), event);
                    mux.register_rewinded_effect_handler(
                        notifier.clone(),
                        RewindedHandler::ChargeSource(source.clone()),
                    );

                    let sequence = ctx
                        .interactive_sequences
                        .entry(id)
                        .or_insert_with(|| InteractiveAnimationSequence::new(id));
                    mux.register_event(EventTrigger::OnClick, notifier, sequence.start_event());
                    mux.register_event(
                        EventTrigger::EndEvent,
                        Notifier::Node(id),
                        sequence.end_event(),
                    );
                    mux.register_rewinded_effect_handler(
                        Notifier::Node(id),
                        RewindedHandler::ChargeInteractiveSequence(id),
                    );
                }
                None if timing.event_type == EventTrigger::OnNext => {
                    ctx.next_effects.append(event);
                }
                None => {
                    tracing::warn!(node = %id, trigger = ?timing.event_type, "event timing without a source shape");
                }
            },
            TimingType::Syncbase => {
                let base = timing
                    .event_base_element
                    .as_deref()
                    .and_then(|s| self.node_ids.get(s).copied());
                match base {
                    Some(base) => {
                        ctx.multiplexer
                            .register_event(timing.event_type, Notifier::Node(base), event)
                    }
                    None => tracing::warn!(node = %id, %timing, "syncbase node not found"),
                }
            }
            other => tracing::debug!(node = %id, timing = ?other, "begin timing not scheduled"),
        }
    }

    /// Silence every node event and activity of the graph.
    pub fn dispose(&mut self, ctx: &mut SlideShowContext) {
        for node in &mut self.nodes {
            node.dispose_events();
            match &mut node.body {
                Body::Container(c) => c.dispose_effect_events(),
                Body::Leaf(leaf) => {
                    if let Some(activity) = leaf.activity.and_then(|a| ctx.activities.get_mut(a)) {
                        activity.dispose();
                    }
                }
            }
        }
    }
}

fn enter(
    machine: &mut NodeStateMachine,
    state: NodeState,
    force: bool,
) -> Option<StateTransition> {
    let mut transition = StateTransition::new();
    match transition.enter(machine, state, force) {
        Ok(true) => Some(transition),
        Ok(false) => None,
        Err(e) => {
            tracing::error!(error = %e, "state transition");
            None
        }
    }
}

fn end_activity(ctx: &mut SlideShowContext, activity: Option<ActivityId>) {
    let Some(activity) = activity else {
        return;
    };
    if let Some(activity) = ctx.activities.get_mut(activity) {
        activity.end(&mut ctx.timer_queue);
    }
}

fn parse_fraction(attr: Option<&str>) -> f64 {
    attr.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Attribute a leaf animates. `Err` makes the node invalid; `Ok(None)` leaves it valid without a
/// property.
fn leaf_property(
    kind: NodeKind,
    info: &AnimationNodeInfo,
) -> Result<Option<AnimatedProperty>, &'static str> {
    match kind {
        NodeKind::Animate | NodeKind::Set | NodeKind::AnimateColor => {
            let name = info
                .attribute_name
                .as_deref()
                .ok_or("target attribute name not found")?;
            Ok(AnimatedProperty::from_name(&name.to_ascii_lowercase()))
        }
        NodeKind::AnimateTransform => info
            .transition_type
            .as_deref()
            .and_then(AnimatedProperty::from_name)
            .filter(|p| p.is_transform())
            .map(Some)
            .ok_or("unknown transform type"),
        NodeKind::AnimateMotion => {
            let path = info.path.as_deref().ok_or("motion path not found")?;
            BezPath::from_svg(path).map_err(|_| "motion path not understood")?;
            Ok(None)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tree.rs"]
mod tests;
