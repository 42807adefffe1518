//! Runtime for tick-driven finite state machines.
//!
//! # Key Concepts
//!
//! - **Transitions**: guarded edges with an optional exit time
//! - **Any-state transitions**: machine-wide fallback edges
//! - **Overflow**: time beyond a transition's exit time is carried into the
//!   entered state, so several transitions can fire inside one `update`

mod error;
mod machine;
mod transition;

pub use error::MachineError;
pub use machine::{StateMachine, DEFAULT_MAX_CASCADE};
pub use transition::{StateId, Transition, TransitionMatch};
