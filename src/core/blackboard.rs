//! Named parameter store consulted by transition conditions.
//!
//! The blackboard holds bool, int and float values keyed by name, plus the
//! set of currently active triggers. Reads of unknown names return the type
//! default instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Parameter store owned by one state machine.
///
/// # Example
///
/// ```rust
/// use bluecheese::core::Blackboard;
///
/// let mut blackboard = Blackboard::new();
/// blackboard.set_float("speed", 2.5);
/// blackboard.set_trigger("jump");
///
/// assert_eq!(blackboard.get_float("speed"), 2.5);
/// assert_eq!(blackboard.get_int("missing"), 0);
/// assert!(blackboard.is_trigger_set("jump"));
///
/// blackboard.clear_triggers();
/// assert!(!blackboard.is_trigger_set("jump"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Blackboard {
    #[serde(default)]
    bools: HashMap<String, bool>,
    #[serde(default)]
    ints: HashMap<String, i32>,
    #[serde(default)]
    floats: HashMap<String, f32>,
    #[serde(default)]
    triggers: HashSet<String>,
}

impl Blackboard {
    /// Create an empty blackboard.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.bools.insert(name.into(), value);
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.ints.insert(name.into(), value);
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f32) {
        self.floats.insert(name.into(), value);
    }

    /// Activate a trigger. It stays active until the next successful
    /// transition or an explicit reset.
    pub fn set_trigger(&mut self, name: impl Into<String>) {
        self.triggers.insert(name.into());
    }

    /// Deactivate a single trigger.
    pub fn reset_trigger(&mut self, name: &str) {
        self.triggers.remove(name);
    }

    /// Deactivate every trigger.
    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or_default()
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.ints.get(name).copied().unwrap_or_default()
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.floats.get(name).copied().unwrap_or_default()
    }

    pub fn is_trigger_set(&self, name: &str) -> bool {
        self.triggers.contains(name)
    }

    /// Names of the currently active triggers, in no particular order.
    pub fn active_triggers(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(String::as_str)
    }

    /// Remove every value and trigger.
    pub fn clear(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.floats.clear();
        self.triggers.clear();
    }
}
