use crate::animation::node_info::{FillMode, RestartMode};
use crate::foundation::error::{SlideShowError, SlideShowResult};

/// Lifecycle state of an animation node. Values are bits so sets of states fit in a mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeState {
    Invalid = 0,
    Unresolved = 1,
    Resolved = 2,
    Active = 4,
    Frozen = 8,
    Ended = 16,
}

impl NodeState {
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

const R: u8 = NodeState::Resolved.bit();
const A: u8 = NodeState::Active.bit();
const F: u8 = NodeState::Frozen.bit();
const E: u8 = NodeState::Ended.bit();

/// Mask of the states a node may move to from `from`, for resolved restart and fill modes.
///
/// An unresolved restart mode behaves as `never`; default and auto fill behave as `remove`.
pub fn allowed_transitions(restart: RestartMode, fill: FillMode, from: NodeState) -> u8 {
    let restart = match restart {
        RestartMode::Default => {
            tracing::debug!("unresolved restart mode, using never");
            RestartMode::Never
        }
        other => other,
    };
    let removes = matches!(fill, FillMode::Default | FillMode::Auto | FillMode::Remove);

    match (from, restart, removes) {
        (NodeState::Invalid, _, _) => 0,
        (NodeState::Unresolved, _, _) => R | E,
        (NodeState::Resolved, _, _) => A | E,

        (NodeState::Active, RestartMode::Always, true) => R | A | E,
        (NodeState::Active, RestartMode::Always, false) => R | A | F | E,
        (NodeState::Active, _, true) => E,
        (NodeState::Active, _, false) => F | E,

        // frozen is unreachable when the fill removes
        (NodeState::Frozen, _, true) => 0,
        (NodeState::Frozen, RestartMode::Never, false) => E,
        (NodeState::Frozen, _, false) => R | A | E,

        (NodeState::Ended, RestartMode::Never, _) => E,
        (NodeState::Ended, _, _) => R | A | E,
    }
}

/// State, pending transitions and the rules between them for one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStateMachine {
    state: NodeState,
    pending: u8,
    restart: RestartMode,
    fill: FillMode,
}

impl Default for NodeStateMachine {
    fn default() -> Self {
        Self::new(RestartMode::Never, FillMode::Freeze)
    }
}

impl NodeStateMachine {
    pub fn new(restart: RestartMode, fill: FillMode) -> Self {
        Self {
            state: NodeState::Unresolved,
            pending: 0,
            restart,
            fill,
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    pub fn set_modes(&mut self, restart: RestartMode, fill: FillMode) {
        self.restart = restart;
        self.fill = fill;
    }

    pub fn is_transition(&self, from: NodeState, to: NodeState) -> bool {
        allowed_transitions(self.restart, self.fill, from) & to.bit() != 0
    }

    /// True if the node is in, or on its way into, any state of `mask`.
    pub fn in_state_or_transition(&self, mask: u8) -> bool {
        (self.state.bit() | self.pending) & mask != 0
    }

    pub fn is_pending(&self, state: NodeState) -> bool {
        self.pending & state.bit() != 0
    }
}

/// A state change in progress: `enter` marks it, `commit` applies it, dropping it uncommitted
/// through `clear` rolls the mark back.
#[derive(Debug, Default)]
pub struct StateTransition {
    to: Option<NodeState>,
}

impl StateTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start moving to `state`. `Ok(false)` if the move is not allowed (unless `force`) or the node
    /// is already moving there.
    pub fn enter(
        &mut self,
        machine: &mut NodeStateMachine,
        state: NodeState,
        force: bool,
    ) -> SlideShowResult<bool> {
        if self.to.is_some() {
            return Err(SlideShowError::invalid_state(
                "state transition entered twice without commit",
            ));
        }
        if !force && !machine.is_transition(machine.state, state) {
            return Ok(false);
        }
        if machine.is_pending(state) {
            return Ok(false);
        }
        machine.pending |= state.bit();
        self.to = Some(state);
        Ok(true)
    }

    pub fn commit(&mut self, machine: &mut NodeStateMachine) {
        if let Some(state) = self.to {
            machine.state = state;
            self.clear(machine);
        }
    }

    pub fn clear(&mut self, machine: &mut NodeStateMachine) {
        if let Some(state) = self.to.take() {
            machine.pending &= !state.bit();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/state.rs"]
mod tests;
