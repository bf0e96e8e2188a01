//! Declarative animation metadata as delivered with a slide, plus the enums its attributes map to.

use serde::{Deserialize, Serialize};

/// One node of a slide's animation tree. Attribute values are kept as strings and interpreted
/// when the node is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationNodeInfo {
    pub node_name: String,
    pub children: Vec<AnimationNodeInfo>,
    pub node_type: Option<String>,
    pub id: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub dur: Option<String>,
    pub fill: Option<String>,
    pub restart: Option<String>,
    pub repeat_count: Option<String>,
    pub accelerate: Option<String>,
    pub decelerate: Option<String>,
    pub autoreverse: Option<String>,
    pub preset_id: Option<String>,
    pub preset_sub_type: Option<String>,
    pub target_element: Option<String>,
    pub sub_item: Option<String>,
    pub additive: Option<String>,
    pub attribute_name: Option<String>,
    pub to: Option<String>,
    pub accumulate: Option<String>,
    pub calc_mode: Option<String>,
    pub from: Option<String>,
    pub by: Option<String>,
    pub key_times: Option<String>,
    pub values: Option<String>,
    pub formula: Option<String>,
    #[serde(rename = "type")]
    pub transition_type: Option<String>,
    pub subtype: Option<String>,
    pub direction: Option<String>,
    pub mode: Option<String>,
    pub path: Option<String>,
    pub color_interpolation: Option<String>,
    pub color_interpolation_direction: Option<String>,
}

impl AnimationNodeInfo {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Self::default()
        }
    }
}

/// Document enum spellings vary in case and separators (`MainSequence`, `main-sequence`).
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Par,
    Seq,
    Iterate,
    Animate,
    Set,
    AnimateMotion,
    AnimateColor,
    AnimateTransform,
    TransitionFilter,
    Audio,
    Command,
}

impl NodeKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match normalize(s).as_str() {
            "par" => Self::Par,
            "seq" => Self::Seq,
            "iterate" => Self::Iterate,
            "animate" => Self::Animate,
            "set" => Self::Set,
            "animatemotion" => Self::AnimateMotion,
            "animatecolor" => Self::AnimateColor,
            "animatetransform" => Self::AnimateTransform,
            "transitionfilter" => Self::TransitionFilter,
            "audio" => Self::Audio,
            "command" => Self::Command,
            _ => return None,
        })
    }

    pub fn is_container(self) -> bool {
        matches!(self, Self::Par | Self::Seq | Self::Iterate)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Also covers `inherit`.
    #[default]
    Default,
    Remove,
    Freeze,
    Hold,
    Transition,
    Auto,
}

impl FillMode {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match normalize(s).as_str() {
            "default" | "inherit" => Self::Default,
            "remove" => Self::Remove,
            "freeze" => Self::Freeze,
            "hold" => Self::Hold,
            "transition" => Self::Transition,
            "auto" => Self::Auto,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartMode {
    /// Also covers `inherit`.
    #[default]
    Default,
    Always,
    WhenNotActive,
    Never,
}

impl RestartMode {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match normalize(s).as_str() {
            "default" | "inherit" => Self::Default,
            "always" => Self::Always,
            "whennotactive" => Self::WhenNotActive,
            "never" => Self::Never,
            _ => return None,
        })
    }
}

/// Role of a container in the presentation's effect structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImpressNodeType {
    #[default]
    Default,
    OnClick,
    WithPrevious,
    AfterPrevious,
    MainSequence,
    TimingRoot,
    InteractiveSequence,
}

impl ImpressNodeType {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match normalize(s).as_str() {
            "default" => Self::Default,
            "onclick" => Self::OnClick,
            "withprevious" => Self::WithPrevious,
            "afterprevious" => Self::AfterPrevious,
            "mainsequence" => Self::MainSequence,
            "timingroot" => Self::TimingRoot,
            "interactivesequence" => Self::InteractiveSequence,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionMode {
    Out,
    #[default]
    In,
}

impl TransitionMode {
    /// Anything but `out` is `in`.
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(normalize).as_deref() {
            Some("out") => Self::Out,
            _ => Self::In,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdditiveMode {
    Unknown,
    Base,
    #[default]
    Replace,
    Multiply,
    None,
}

impl AdditiveMode {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match normalize(s).as_str() {
            "base" => Self::Base,
            "replace" => Self::Replace,
            "multiply" => Self::Multiply,
            "none" => Self::None,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalcMode {
    Discrete,
    #[default]
    Linear,
    Paced,
    Spline,
}

impl CalcMode {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match normalize(s).as_str() {
            "discrete" => Self::Discrete,
            "linear" => Self::Linear,
            "paced" => Self::Paced,
            "spline" => Self::Spline,
            _ => return None,
        })
    }
}
