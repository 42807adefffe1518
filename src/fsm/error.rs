//! Runtime errors for a built state machine.

use thiserror::Error;

/// Errors that can occur while driving a state machine.
#[derive(Debug, Error, PartialEq)]
pub enum MachineError {
    #[error("State machine '{machine}' has already been started")]
    AlreadyStarted { machine: String },

    #[error("State machine '{machine}' has no default state")]
    NoStates { machine: String },

    #[error("State machine '{machine}' has not been started")]
    NotStarted { machine: String },

    #[error("State '{state}' does not exist in state machine '{machine}'")]
    UnknownState { machine: String, state: String },
}
