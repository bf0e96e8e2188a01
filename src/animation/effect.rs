use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::foundation::ids::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectState {
    NotStarted,
    Playing,
    Ended,
}

/// Play lifecycle of one started effect.
///
/// Main sequence effects carry no node id; interactive effects are keyed by the id of their
/// sequence node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    node: Option<NodeId>,
    state: EffectState,
}

impl Effect {
    pub fn main() -> Self {
        Self {
            node: None,
            state: EffectState::NotStarted,
        }
    }

    pub fn interactive(node: NodeId) -> Self {
        Self {
            node: Some(node),
            state: EffectState::NotStarted,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_main_effect(&self) -> bool {
        self.node.is_none()
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == EffectState::Playing
    }

    pub fn is_ended(&self) -> bool {
        self.state == EffectState::Ended
    }

    pub fn start(&mut self) -> SlideShowResult<()> {
        if self.state != EffectState::NotStarted {
            return Err(SlideShowError::invalid_state(format!(
                "effect {:?} started while {:?}",
                self.node, self.state
            )));
        }
        self.state = EffectState::Playing;
        Ok(())
    }

    pub fn end(&mut self) -> SlideShowResult<()> {
        if self.state != EffectState::Playing {
            return Err(SlideShowError::invalid_state(format!(
                "effect {:?} ended while {:?}",
                self.node, self.state
            )));
        }
        self.state = EffectState::Ended;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/effect.rs"]
mod tests;
