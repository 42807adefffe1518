//! Conditions that guard state transitions.
//!
//! A condition is a pure predicate over the blackboard. Conditions carry no
//! state of their own and can be shared between transitions.

use super::blackboard::Blackboard;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Comparison applied by numeric conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Equals,
    NotEquals,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl CompareOp {
    /// Apply the comparison as `lhs <op> rhs`.
    ///
    /// Floats use plain IEEE comparison, so `Equals` on floats is exact.
    pub fn compare<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Self::Equals => lhs == rhs,
            Self::NotEquals => lhs != rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
            Self::Less => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
        }
    }
}

/// Closure consulted by [`Condition::Predicate`].
pub type Predicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Predicate evaluated against a [`Blackboard`].
///
/// # Example
///
/// ```rust
/// use bluecheese::core::{Blackboard, CompareOp, Condition};
///
/// let mut blackboard = Blackboard::new();
/// blackboard.set_int("ammo", 3);
///
/// let has_ammo = Condition::int("ammo", CompareOp::Greater, 0);
/// assert!(has_ammo.evaluate(&blackboard));
///
/// let jump = Condition::trigger("jump");
/// assert!(!jump.evaluate(&blackboard));
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Holds while the named trigger is active.
    Trigger { parameter: String },
    /// Holds when the named bool equals `value`.
    Bool { parameter: String, value: bool },
    /// Holds when `parameter <op> value`.
    Int {
        parameter: String,
        op: CompareOp,
        value: i32,
    },
    /// Holds when `parameter <op> value`.
    Float {
        parameter: String,
        op: CompareOp,
        value: f32,
    },
    /// Arbitrary closure; ignores the blackboard. Never serialized.
    #[serde(skip)]
    Predicate(Predicate),
}

impl Condition {
    pub fn trigger(parameter: impl Into<String>) -> Self {
        Self::Trigger {
            parameter: parameter.into(),
        }
    }

    pub fn bool(parameter: impl Into<String>, value: bool) -> Self {
        Self::Bool {
            parameter: parameter.into(),
            value,
        }
    }

    pub fn int(parameter: impl Into<String>, op: CompareOp, value: i32) -> Self {
        Self::Int {
            parameter: parameter.into(),
            op,
            value,
        }
    }

    pub fn float(parameter: impl Into<String>, op: CompareOp, value: f32) -> Self {
        Self::Float {
            parameter: parameter.into(),
            op,
            value,
        }
    }

    /// Create a condition from a closure.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Evaluate the condition. Pure apart from whatever a predicate closure
    /// chooses to read.
    pub fn evaluate(&self, blackboard: &Blackboard) -> bool {
        match self {
            Self::Trigger { parameter } => blackboard.is_trigger_set(parameter),
            Self::Bool { parameter, value } => blackboard.get_bool(parameter) == *value,
            Self::Int {
                parameter,
                op,
                value,
            } => op.compare(blackboard.get_int(parameter), *value),
            Self::Float {
                parameter,
                op,
                value,
            } => op.compare(blackboard.get_float(parameter), *value),
            Self::Predicate(predicate) => predicate(),
        }
    }

    /// Name of the blackboard parameter this condition reads, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Trigger { parameter }
            | Self::Bool { parameter, .. }
            | Self::Int { parameter, .. }
            | Self::Float { parameter, .. } => Some(parameter),
            Self::Predicate(_) => None,
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger { parameter } => f.debug_tuple("Trigger").field(parameter).finish(),
            Self::Bool { parameter, value } => f
                .debug_struct("Bool")
                .field("parameter", parameter)
                .field("value", value)
                .finish(),
            Self::Int {
                parameter,
                op,
                value,
            } => f
                .debug_struct("Int")
                .field("parameter", parameter)
                .field("op", op)
                .field("value", value)
                .finish(),
            Self::Float {
                parameter,
                op,
                value,
            } => f
                .debug_struct("Float")
                .field("parameter", parameter)
                .field("op", op)
                .field("value", value)
                .finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
