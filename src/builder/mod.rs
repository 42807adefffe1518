//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders for state machines and their
//! transitions. Graph errors (duplicate states, unknown targets, unguarded
//! any-state transitions) are reported by the call that introduces them.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::{TransitionBuilder, TransitionSource, TransitionSpec};

use crate::core::Condition;

/// Create an unconditional transition that fires once `exit_time` elapses.
///
/// # Example
///
/// ```
/// use bluecheese::builder::{timed_transition, StateMachineBuilder};
/// use bluecheese::core::State;
///
/// let machine = StateMachineBuilder::new()
///     .add_state(State::new("Red")).unwrap()
///     .add_state(State::new("Green")).unwrap()
///     .transition(timed_transition("Red", "Green", 30.0)).unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(machine.default_state(), Some("Red"));
/// ```
pub fn timed_transition(from: &str, to: &str, exit_time: f32) -> TransitionBuilder {
    TransitionBuilder::new().from(from).to(to).exit_time(exit_time)
}

/// Create a transition that fires when the named trigger is set.
///
/// # Example
///
/// ```
/// use bluecheese::builder::triggered_transition;
///
/// let spec = triggered_transition("Idle", "Jump", "jump").build().unwrap();
/// assert_eq!(spec.conditions.len(), 1);
/// ```
pub fn triggered_transition(from: &str, to: &str, trigger: &str) -> TransitionBuilder {
    TransitionBuilder::new()
        .from(from)
        .to(to)
        .when(Condition::trigger(trigger))
}
