//! Guarded transitions between states.

use crate::core::{Blackboard, Condition};
use serde::{Deserialize, Serialize};

/// Index of a state inside its machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outcome of a transition whose guard passed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionMatch {
    /// State to enter
    pub target: StateId,
    /// Accumulated time beyond the exit time, carried into `target`
    pub overflow: f32,
}

/// A guarded edge to a destination state.
///
/// The guard passes when the source state has been active for at least
/// `exit_time` (only checked when `exit_time > 0`) and every condition
/// holds. An empty condition list always holds.
#[derive(Clone, Debug)]
pub struct Transition {
    target: StateId,
    exit_time: f32,
    conditions: Vec<Condition>,
}

impl Transition {
    pub fn new(target: StateId, exit_time: f32, conditions: Vec<Condition>) -> Self {
        Self {
            target,
            exit_time,
            conditions,
        }
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn exit_time(&self) -> f32 {
        self.exit_time
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Evaluate the guard for a source state active for `state_time`.
    ///
    /// Overflow is `state_time - exit_time`, so transitions without an exit
    /// time carry the whole accumulated time forward.
    pub fn evaluate(&self, blackboard: &Blackboard, state_time: f32) -> Option<TransitionMatch> {
        if self.exit_time > 0.0 && state_time < self.exit_time {
            return None;
        }

        if !self.conditions.iter().all(|c| c.evaluate(blackboard)) {
            return None;
        }

        Some(TransitionMatch {
            target: self.target,
            overflow: state_time - self.exit_time,
        })
    }
}
