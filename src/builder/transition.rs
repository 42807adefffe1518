//! Builder for constructing state transitions.

use crate::builder::error::BuildError;
use crate::core::Condition;
use crate::fsm::StateMachine;

/// Where a transition may fire from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransitionSource {
    /// A specific named state
    State(String),
    /// Any state without outgoing transitions of its own
    AnyState,
}

/// Validated transition description, ready to be added to a machine.
#[derive(Clone, Debug)]
pub struct TransitionSpec {
    pub source: TransitionSource,
    pub to: String,
    pub exit_time: f32,
    pub conditions: Vec<Condition>,
}

impl TransitionSpec {
    pub(crate) fn apply(self, machine: &mut StateMachine) -> Result<(), BuildError> {
        match self.source {
            TransitionSource::State(from) => {
                machine.add_transition(&from, &self.to, self.exit_time, self.conditions)
            }
            TransitionSource::AnyState => {
                machine.push_any_state(&self.to, self.exit_time, self.conditions)
            }
        }
    }
}

/// Builder for constructing transitions with a fluent API.
#[derive(Clone, Debug, Default)]
pub struct TransitionBuilder {
    source: Option<TransitionSource>,
    to: Option<String>,
    exit_time: f32,
    conditions: Vec<Condition>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state.
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.source = Some(TransitionSource::State(state.into()));
        self
    }

    /// Make this an any-state transition.
    pub fn from_any_state(mut self) -> Self {
        self.source = Some(TransitionSource::AnyState);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Minimum time in the source state before the guard can pass.
    pub fn exit_time(mut self, seconds: f32) -> Self {
        self.exit_time = seconds;
        self
    }

    /// Add a condition. Conditions are AND-combined.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a closure condition.
    pub fn when_fn<F>(self, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.when(Condition::predicate(predicate))
    }

    /// Build the transition description.
    pub fn build(self) -> Result<TransitionSpec, BuildError> {
        let source = self.source.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        if source == TransitionSource::AnyState && self.conditions.is_empty() {
            return Err(BuildError::MissingCondition(to));
        }

        Ok(TransitionSpec {
            source,
            to,
            exit_time: self.exit_time,
            conditions: self.conditions,
        })
    }
}
