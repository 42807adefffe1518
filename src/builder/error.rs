//! Build errors for state machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("State machine has already been started; its topology is frozen")]
    AlreadyStarted,

    #[error("State '{0}' has already been added")]
    DuplicateState(String),

    #[error("State '{0}' has not been added")]
    UnknownState(String),

    #[error("Transition '{from}' -> '{to}' has already been added")]
    DuplicateTransition { from: String, to: String },

    #[error("Any-state transition to '{0}' needs at least one condition")]
    MissingCondition(String),

    #[error("No states defined. Add at least one state before .build()")]
    NoStates,

    #[error("Transition source state not specified. Call .from(state) or .from_any_state()")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,
}
