//! States and their lifecycle hooks.
//!
//! A state is identified by its name. Behaviour is attached either as a
//! handler object implementing [`StateBehavior`] or as closures registered
//! with [`State::on_enter`], [`State::on_update`] and [`State::on_exit`].
//! Both receive the machine's blackboard so states can drive parameters.

use super::blackboard::Blackboard;
use std::fmt;

/// Handler object for a state's lifecycle.
///
/// Every method has a no-op default, so implementors only override the
/// hooks they care about.
///
/// # Example
///
/// ```rust
/// use bluecheese::core::{Blackboard, State, StateBehavior};
///
/// struct Patrol {
///     distance: f32,
/// }
///
/// impl StateBehavior for Patrol {
///     fn on_update(&mut self, blackboard: &mut Blackboard, delta_time: f32) {
///         self.distance += delta_time;
///         blackboard.set_float("distance", self.distance);
///     }
/// }
///
/// let state = State::new("Patrol").with_behavior(Patrol { distance: 0.0 });
/// assert_eq!(state.name(), "Patrol");
/// ```
pub trait StateBehavior: Send {
    fn on_enter(&mut self, _blackboard: &mut Blackboard) {}

    fn on_update(&mut self, _blackboard: &mut Blackboard, _delta_time: f32) {}

    fn on_exit(&mut self, _blackboard: &mut Blackboard) {}
}

type Hook = Box<dyn FnMut(&mut Blackboard) + Send>;
type UpdateHook = Box<dyn FnMut(&mut Blackboard, f32) + Send>;

/// A named node of a state machine.
pub struct State {
    name: String,
    behavior: Option<Box<dyn StateBehavior>>,
    enter_hooks: Vec<Hook>,
    update_hooks: Vec<UpdateHook>,
    exit_hooks: Vec<Hook>,
}

impl State {
    /// Create a state with no behaviour.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: None,
            enter_hooks: Vec::new(),
            update_hooks: Vec::new(),
            exit_hooks: Vec::new(),
        }
    }

    /// Attach a handler object, replacing any previous one.
    pub fn with_behavior<B>(mut self, behavior: B) -> Self
    where
        B: StateBehavior + 'static,
    {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Register a closure run every time the state is entered.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Blackboard) + Send + 'static,
    {
        self.enter_hooks.push(Box::new(hook));
        self
    }

    /// Register a closure run on every update while the state is active.
    pub fn on_update<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Blackboard, f32) + Send + 'static,
    {
        self.update_hooks.push(Box::new(hook));
        self
    }

    /// Register a closure run every time the state is exited.
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Blackboard) + Send + 'static,
    {
        self.exit_hooks.push(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    pub(crate) fn enter(&mut self, blackboard: &mut Blackboard) {
        if let Some(behavior) = self.behavior.as_mut() {
            behavior.on_enter(blackboard);
        }
        for hook in &mut self.enter_hooks {
            hook(blackboard);
        }
    }

    pub(crate) fn update(&mut self, blackboard: &mut Blackboard, delta_time: f32) {
        if let Some(behavior) = self.behavior.as_mut() {
            behavior.on_update(blackboard, delta_time);
        }
        for hook in &mut self.update_hooks {
            hook(blackboard, delta_time);
        }
    }

    pub(crate) fn exit(&mut self, blackboard: &mut Blackboard) {
        if let Some(behavior) = self.behavior.as_mut() {
            behavior.on_exit(blackboard);
        }
        for hook in &mut self.exit_hooks {
            hook(blackboard);
        }
    }

    /// Drop the behaviour and every registered hook.
    pub(crate) fn detach(&mut self) {
        self.behavior = None;
        self.enter_hooks.clear();
        self.update_hooks.clear();
        self.exit_hooks.clear();
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("behavior", &self.behavior.is_some())
            .field("enter_hooks", &self.enter_hooks.len())
            .field("update_hooks", &self.update_hooks.len())
            .field("exit_hooks", &self.exit_hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl StateBehavior for Counter {
        fn on_enter(&mut self, blackboard: &mut Blackboard) {
            let entered = blackboard.get_int("entered");
            blackboard.set_int("entered", entered + 1);
        }

        fn on_exit(&mut self, blackboard: &mut Blackboard) {
            let exited = blackboard.get_int("exited");
            blackboard.set_int("exited", exited + 1);
        }
    }

    #[test]
    fn behavior_receives_lifecycle_calls() {
        let mut blackboard = Blackboard::new();
        let mut state = State::new("Idle").with_behavior(Counter);

        state.enter(&mut blackboard);
        state.exit(&mut blackboard);
        state.enter(&mut blackboard);

        assert_eq!(blackboard.get_int("entered"), 2);
        assert_eq!(blackboard.get_int("exited"), 1);
    }

    #[test]
    fn hooks_run_after_behavior_in_registration_order() {
        let mut blackboard = Blackboard::new();
        let mut state = State::new("Run")
            .with_behavior(Counter)
            .on_enter(|bb| {
                let seen = bb.get_int("entered");
                bb.set_int("first", seen);
            })
            .on_enter(|bb| bb.set_bool("second", true));

        state.enter(&mut blackboard);

        assert_eq!(blackboard.get_int("first"), 1);
        assert!(blackboard.get_bool("second"));
    }

    #[test]
    fn update_hooks_receive_delta_time() {
        let mut blackboard = Blackboard::new();
        let mut state = State::new("Run").on_update(|bb, dt| {
            let total = bb.get_float("total");
            bb.set_float("total", total + dt);
        });

        state.update(&mut blackboard, 0.25);
        state.update(&mut blackboard, 0.5);

        assert_eq!(blackboard.get_float("total"), 0.75);
    }

    #[test]
    fn detach_removes_all_behavior() {
        let mut blackboard = Blackboard::new();
        let mut state = State::new("Idle")
            .with_behavior(Counter)
            .on_exit(|bb| bb.set_bool("exit_hook", true));

        state.detach();
        state.enter(&mut blackboard);
        state.exit(&mut blackboard);

        assert!(!state.has_behavior());
        assert_eq!(blackboard.get_int("entered"), 0);
        assert!(!blackboard.get_bool("exit_hook"));
    }
}
