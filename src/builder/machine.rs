//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Condition, State};
use crate::fsm::StateMachine;

/// Builder for constructing state machines with a fluent API.
///
/// Each step validates eagerly, so a bad graph fails at the call that
/// introduced the problem rather than at `update` time.
pub struct StateMachineBuilder {
    machine: StateMachine,
}

impl StateMachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new("StateMachine"),
        }
    }

    /// Continue building an existing machine. Fails once it has started.
    pub fn from_machine(machine: StateMachine) -> Result<Self, BuildError> {
        if machine.is_started() {
            return Err(BuildError::AlreadyStarted);
        }
        Ok(Self { machine })
    }

    /// Name used in log events and errors.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.machine.set_name(name.into());
        self
    }

    /// Number of transitions retained in the machine's history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.machine.set_history_limit(limit);
        self
    }

    /// Maximum transitions chained inside one `update` call.
    pub fn max_cascade(mut self, max_cascade: usize) -> Self {
        self.machine.set_max_cascade(max_cascade);
        self
    }

    /// Add a state. The first state added becomes the default unless a
    /// later one is added with [`add_default_state`](Self::add_default_state).
    pub fn add_state(mut self, state: State) -> Result<Self, BuildError> {
        self.machine.add_state(state, false)?;
        Ok(self)
    }

    /// Add a state and make it the default.
    pub fn add_default_state(mut self, state: State) -> Result<Self, BuildError> {
        self.machine.add_state(state, true)?;
        Ok(self)
    }

    /// Add a transition between two previously added states.
    pub fn add_transition<I>(
        mut self,
        from: &str,
        to: &str,
        exit_time: f32,
        conditions: I,
    ) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Condition>,
    {
        self.machine
            .add_transition(from, to, exit_time, conditions)?;
        Ok(self)
    }

    /// Add a guarded transition usable from any state.
    pub fn add_transition_from_any_state<I>(mut self, to: &str, conditions: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Condition>,
    {
        self.machine.add_transition_from_any_state(to, conditions)?;
        Ok(self)
    }

    /// Add a transition using a builder.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        builder.build()?.apply(&mut self.machine)?;
        Ok(self)
    }

    /// Build the state machine.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        if self.machine.default_state().is_none() {
            return Err(BuildError::NoStates);
        }
        Ok(self.machine)
    }
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
