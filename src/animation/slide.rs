use std::collections::BTreeMap;
use std::mem;

use kurbo::Vec2;

use crate::animation::element::{AnimatedShapeInfo, ElementRef};
use crate::animation::node_info::AnimationNodeInfo;
use crate::animation::tree::AnimationTree;
use crate::events::{InteractiveAnimationSequence, NextEffectEventArray, SourceEventElement};
use crate::foundation::config::EngineConfig;
use crate::foundation::ids::NodeId;
use crate::handler::context::SlideShowContext;

/// The animations of one slide and the event records that outlive a single showing of it.
///
/// While the slide is on screen its next-effect array, interactive sequences and source shapes
/// live in the [`SlideShowContext`]; [`end`](Self::end) takes them back.
#[derive(Debug, Default)]
pub struct SlideAnimations {
    tree: Option<AnimationTree>,
    /// `None` until the first start, then `Some(true)` during the first showing.
    first_run: Option<bool>,
    next_effects: NextEffectEventArray,
    interactive_sequences: BTreeMap<NodeId, InteractiveAnimationSequence>,
    source_elements: BTreeMap<String, SourceEventElement>,
}

impl SlideAnimations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the node graph of `slide`. `false` leaves the slide without animations.
    pub fn import(
        &mut self,
        slide: usize,
        root: &AnimationNodeInfo,
        slide_size: Vec2,
        config: &EngineConfig,
    ) -> bool {
        self.tree = AnimationTree::build(slide, root, slide_size, config);
        if self.tree.is_none() {
            tracing::warn!(slide, "animation import failed");
        }
        self.tree.is_some()
    }

    pub fn tree(&self) -> Option<&AnimationTree> {
        self.tree.as_ref()
    }

    pub fn tree_mut(&mut self) -> Option<&mut AnimationTree> {
        self.tree.as_mut()
    }

    pub fn is_animated(&self) -> bool {
        self.tree
            .as_ref()
            .is_some_and(AnimationTree::has_pending_animation)
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run == Some(true)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementRef> {
        self.tree.iter().flat_map(AnimationTree::elements)
    }

    /// Reset every element to its layer state for a new showing of the slide.
    pub fn notify_slide_start(&self, shapes: &BTreeMap<String, AnimatedShapeInfo>) {
        for element in self.elements() {
            let mut element = element.borrow_mut();
            let info = shapes.get(element.id());
            element.notify_slide_start(info);
        }
    }

    pub fn notify_slide_end(&self) {
        for element in self.elements() {
            element.borrow_mut().notify_slide_end();
        }
    }

    /// Hand the slide's event records to `ctx` and start the root node.
    pub fn start(&mut self, ctx: &mut SlideShowContext) -> bool {
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        ctx.next_effects = mem::take(&mut self.next_effects);
        ctx.interactive_sequences = mem::take(&mut self.interactive_sequences);
        ctx.source_elements = mem::take(&mut self.source_elements);
        for source in ctx.source_elements.values_mut() {
            source.charge();
        }
        for sequence in ctx.interactive_sequences.values() {
            sequence.charge_events();
        }

        self.first_run = Some(self.first_run.is_none());

        let root = tree.root();
        if !tree.init(root, ctx) {
            tracing::warn!(slide = tree.slide(), "animation root failed to initialise");
            return false;
        }
        tree.resolve(root, ctx)
    }

    /// Stop the root node and take the event records back. Skipping the first showing forgets the
    /// next-effect events so the next showing collects them again.
    pub fn end(&mut self, skipped: bool, ctx: &mut SlideShowContext) {
        if let Some(tree) = self.tree.as_mut() {
            let root = tree.root();
            tree.deactivate(root, ctx);
            tree.end(root, ctx);
        }
        self.next_effects = mem::take(&mut ctx.next_effects);
        self.interactive_sequences = mem::take(&mut ctx.interactive_sequences);
        self.source_elements = mem::take(&mut ctx.source_elements);

        if self.is_first_run() {
            if skipped {
                self.next_effects.clear();
                self.first_run = None;
            } else {
                self.first_run = Some(false);
            }
        }
    }

    /// Silence the graph's events and activities.
    pub fn dispose(&mut self, ctx: &mut SlideShowContext) {
        if let Some(tree) = self.tree.as_mut() {
            tree.dispose(ctx);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/slide.rs"]
mod tests;
