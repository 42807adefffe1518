//! Core state machine types.
//!
//! This module contains the building blocks the machine interprets:
//! - The `Blackboard` parameter store
//! - `Condition` predicates over the blackboard
//! - `State` nodes with their lifecycle hooks
//! - Bounded transition history

mod blackboard;
mod condition;
mod history;
mod state;

pub use blackboard::Blackboard;
pub use condition::{CompareOp, Condition, Predicate};
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use state::{State, StateBehavior};
