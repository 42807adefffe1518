//! State machine that interprets states, transitions and conditions.

use crate::builder::{BuildError, StateMachineBuilder};
use crate::core::{Blackboard, Condition, State, StateHistory, StateTransition};
use crate::fsm::error::MachineError;
use crate::fsm::transition::{StateId, Transition, TransitionMatch};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Default upper bound on transitions chained inside one `update` call.
pub const DEFAULT_MAX_CASCADE: usize = 32;

type StateChangedHook = Box<dyn FnMut(&str, &str) + Send>;

/// Finite state machine driven by `update(delta_time)` ticks.
///
/// Topology (states and transitions) is fixed once the machine is started.
/// Each update accumulates time in the current state, runs the state's
/// update hooks, then takes the first transition whose guard passes.
/// Transitions registered for the current state are evaluated in
/// registration order; the any-state list is only consulted for states
/// with no outgoing transitions of their own.
///
/// # Example
///
/// ```rust
/// use bluecheese::core::{Condition, State};
/// use bluecheese::fsm::StateMachine;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut machine = StateMachine::builder()
///     .add_default_state(State::new("Idle"))?
///     .add_state(State::new("Jump"))?
///     .add_transition("Idle", "Jump", 0.0, [Condition::trigger("jump")])?
///     .add_transition("Jump", "Idle", 1.0, [])?
///     .build()?;
///
/// machine.start()?;
/// machine.set_trigger("jump");
/// machine.update(0.1);
/// assert_eq!(machine.current_state(), Some("Jump"));
///
/// machine.update(1.0);
/// assert_eq!(machine.current_state(), Some("Idle"));
/// # Ok(())
/// # }
/// ```
pub struct StateMachine {
    name: String,
    states: Vec<State>,
    index: HashMap<String, StateId>,
    transitions: Vec<Vec<Transition>>,
    any_state: Vec<Transition>,
    current: Option<StateId>,
    default_state: Option<StateId>,
    state_time: f32,
    started: bool,
    blackboard: Blackboard,
    history: StateHistory,
    max_cascade: usize,
    observers: Vec<StateChangedHook>,
}

impl StateMachine {
    /// Create an empty, unstarted machine.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            index: HashMap::new(),
            transitions: Vec::new(),
            any_state: Vec::new(),
            current: None,
            default_state: None,
            state_time: 0.0,
            started: false,
            blackboard: Blackboard::new(),
            history: StateHistory::new(),
            max_cascade: DEFAULT_MAX_CASCADE,
            observers: Vec::new(),
        }
    }

    /// Start a fluent builder.
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::new()
    }

    /// Add a state.
    ///
    /// The first state added is the default until a state is added with
    /// `is_default` set; the last such state wins.
    pub fn add_state(&mut self, state: State, is_default: bool) -> Result<StateId, BuildError> {
        if self.started {
            return Err(BuildError::AlreadyStarted);
        }
        if self.index.contains_key(state.name()) {
            return Err(BuildError::DuplicateState(state.name().to_string()));
        }

        let id = StateId(self.states.len());
        self.index.insert(state.name().to_string(), id);
        self.states.push(state);
        self.transitions.push(Vec::new());

        if is_default || self.default_state.is_none() {
            self.default_state = Some(id);
        }
        Ok(id)
    }

    /// Add a transition between two existing states.
    pub fn add_transition<I>(
        &mut self,
        from: &str,
        to: &str,
        exit_time: f32,
        conditions: I,
    ) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = Condition>,
    {
        if self.started {
            return Err(BuildError::AlreadyStarted);
        }
        let source = self.lookup(from)?;
        let target = self.lookup(to)?;

        let outgoing = &mut self.transitions[source.0];
        if outgoing.iter().any(|t| t.target() == target) {
            return Err(BuildError::DuplicateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        outgoing.push(Transition::new(
            target,
            exit_time,
            conditions.into_iter().collect(),
        ));
        Ok(())
    }

    /// Add a transition that may leave any state without outgoing
    /// transitions of its own. At least one condition is required.
    pub fn add_transition_from_any_state<I>(&mut self, to: &str, conditions: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = Condition>,
    {
        self.push_any_state(to, 0.0, conditions.into_iter().collect())
    }

    pub(crate) fn push_any_state(
        &mut self,
        to: &str,
        exit_time: f32,
        conditions: Vec<Condition>,
    ) -> Result<(), BuildError> {
        if self.started {
            return Err(BuildError::AlreadyStarted);
        }
        let target = self.lookup(to)?;
        if conditions.is_empty() {
            return Err(BuildError::MissingCondition(to.to_string()));
        }

        self.any_state
            .push(Transition::new(target, exit_time, conditions));
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_history_limit(&mut self, limit: usize) {
        self.history = StateHistory::with_limit(limit);
    }

    pub(crate) fn set_max_cascade(&mut self, max_cascade: usize) {
        self.max_cascade = max_cascade.max(1);
    }

    /// Enter the default state.
    pub fn start(&mut self) -> Result<(), MachineError> {
        if self.started {
            return Err(MachineError::AlreadyStarted {
                machine: self.name.clone(),
            });
        }
        let default = self.default_state.ok_or_else(|| MachineError::NoStates {
            machine: self.name.clone(),
        })?;

        self.started = true;
        self.state_time = 0.0;
        self.current = Some(default);
        self.states[default.0].enter(&mut self.blackboard);
        debug!(machine = %self.name, state = %self.states[default.0].name(), "state machine started");
        Ok(())
    }

    /// Advance the machine by `delta_time`. Does nothing before `start`.
    pub fn update(&mut self, delta_time: f32) {
        if !self.started {
            return;
        }
        self.advance(delta_time, 0);
    }

    fn advance(&mut self, delta_time: f32, depth: usize) {
        let Some(current) = self.current else {
            return;
        };

        self.state_time += delta_time;
        self.states[current.0].update(&mut self.blackboard, delta_time);

        let Some(fired) = self.find_transition(current) else {
            return;
        };

        if depth >= self.max_cascade {
            warn!(
                machine = %self.name,
                state = %self.states[current.0].name(),
                max_cascade = self.max_cascade,
                "transition cascade limit reached"
            );
            return;
        }

        self.blackboard.clear_triggers();
        self.switch_to(fired.target, fired.overflow);
        self.advance(fired.overflow, depth + 1);
    }

    fn find_transition(&self, current: StateId) -> Option<TransitionMatch> {
        let specific = &self.transitions[current.0];
        let candidates = if specific.is_empty() {
            &self.any_state
        } else {
            specific
        };

        candidates
            .iter()
            .find_map(|t| t.evaluate(&self.blackboard, self.state_time))
    }

    fn switch_to(&mut self, target: StateId, overflow: f32) {
        let previous = self.current;
        if let Some(previous) = previous {
            self.states[previous.0].exit(&mut self.blackboard);
        }

        self.current = Some(target);
        self.state_time = 0.0;
        self.states[target.0].enter(&mut self.blackboard);

        let to = self.states[target.0].name();
        let from = previous.map_or("", |p| self.states[p.0].name());
        debug!(machine = %self.name, from, to, overflow, "state transition");

        self.history.record(StateTransition {
            from: from.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
            overflow,
        });
        for observer in &mut self.observers {
            observer(from, to);
        }
    }

    /// Switch to the named state immediately, bypassing transition guards.
    /// Triggers are left untouched.
    pub fn set_state(&mut self, name: &str) -> Result<(), MachineError> {
        if !self.started {
            return Err(MachineError::NotStarted {
                machine: self.name.clone(),
            });
        }
        let target = self
            .index
            .get(name)
            .copied()
            .ok_or_else(|| MachineError::UnknownState {
                machine: self.name.clone(),
                state: name.to_string(),
            })?;

        self.switch_to(target, 0.0);
        Ok(())
    }

    /// Register a closure called with `(from, to)` after every state change.
    pub fn on_state_changed<F>(&mut self, observer: F)
    where
        F: FnMut(&str, &str) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Exit the current state, then drop every state, transition, hook and
    /// parameter. The machine returns to the unstarted, empty condition.
    pub fn dispose(&mut self) {
        if let Some(current) = self.current.take() {
            self.states[current.0].exit(&mut self.blackboard);
        }
        for state in &mut self.states {
            state.detach();
        }

        self.states.clear();
        self.index.clear();
        self.transitions.clear();
        self.any_state.clear();
        self.default_state = None;
        self.state_time = 0.0;
        self.started = false;
        self.blackboard.clear();
        self.history.clear();
        self.observers.clear();
        debug!(machine = %self.name, "state machine disposed");
    }

    fn lookup(&self, name: &str) -> Result<StateId, BuildError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnknownState(name.to_string()))
    }

    pub(crate) fn restore_snapshot(
        &mut self,
        current: Option<StateId>,
        state_time: f32,
        blackboard: Blackboard,
        history: StateHistory,
    ) {
        self.started = current.is_some();
        self.current = current;
        self.state_time = state_time;
        self.blackboard = blackboard;
        self.history = history;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Name of the active state, if started.
    pub fn current_state(&self) -> Option<&str> {
        self.current.map(|id| self.states[id.0].name())
    }

    pub fn current_state_id(&self) -> Option<StateId> {
        self.current
    }

    /// Time accumulated in the active state.
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn default_state(&self) -> Option<&str> {
        self.default_state.map(|id| self.states[id.0].name())
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.0).map(State::name)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(State::name)
    }

    /// Outgoing transitions registered for the named state.
    pub fn transitions_from(&self, name: &str) -> Option<&[Transition]> {
        let id = self.index.get(name)?;
        Some(&self.transitions[id.0])
    }

    pub fn any_state_transitions(&self) -> &[Transition] {
        &self.any_state
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.blackboard.set_bool(name, value);
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.blackboard.set_int(name, value);
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f32) {
        self.blackboard.set_float(name, value);
    }

    pub fn set_trigger(&mut self, name: impl Into<String>) {
        self.blackboard.set_trigger(name);
    }

    pub fn reset_trigger(&mut self, name: &str) {
        self.blackboard.reset_trigger(name);
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.blackboard.get_bool(name)
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.blackboard.get_int(name)
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.blackboard.get_float(name)
    }

    pub fn is_trigger_set(&self, name: &str) -> bool {
        self.blackboard.is_trigger_set(name)
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("states", &self.states)
            .field("current", &self.current_state())
            .field("default_state", &self.default_state())
            .field("state_time", &self.state_time)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}
