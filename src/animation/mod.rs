//! Shape animation: the node graph parsed from a slide, the animated element state it drives and
//! the animations activities push values into.

pub mod animations;
pub mod color;
pub mod effect;
pub mod element;
pub mod factory;
pub mod node_info;
pub mod property;
pub mod slide;
pub mod state;
pub mod tree;
pub mod value;

pub use animations::{Animation, ClippingAnimation, PathAnimation, PropertyAnimation};
pub use color::{AnimColor, HslColor, RgbColor, parse_color};
pub use effect::{Effect, EffectState};
pub use element::{
    AnimatedElement, AnimatedShapeInfo, BoundsInfo, ColorMap, ElementRef, RenderProperties,
};
pub use node_info::{AnimationNodeInfo, FillMode, NodeKind, RestartMode};
pub use property::AnimatedProperty;
pub use slide::SlideAnimations;
pub use state::{NodeState, NodeStateMachine, StateTransition};
pub use tree::{AnimationNode, AnimationTree};
pub use value::{AnimValue, ColorSpace, Interpolator, ValueType};
