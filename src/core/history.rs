//! State transition history tracking.
//!
//! Keeps a bounded, ordered record of the transitions a machine has taken.
//! Old records are evicted once the configured limit is reached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of transitions retained by a history.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use bluecheese::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "Idle".to_string(),
///     to: "Walk".to_string(),
///     timestamp: Utc::now(),
///     overflow: 0.25,
/// };
/// assert_eq!(transition.to, "Walk");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left
    pub from: String,
    /// The state being entered
    pub to: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Time carried over into the entered state
    pub overflow: f32,
}

/// Ordered, bounded history of state transitions.
///
/// # Example
///
/// ```rust
/// use bluecheese::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_limit(2);
/// for (from, to) in [("A", "B"), ("B", "C"), ("C", "A")] {
///     history.record(StateTransition {
///         from: from.to_string(),
///         to: to.to_string(),
///         timestamp: Utc::now(),
///         overflow: 0.0,
///     });
/// }
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec!["B", "C", "A"]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    limit: usize,
    transitions: VecDeque<StateTransition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHistory {
    /// Create an empty history with the default limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history retaining at most `limit` transitions.
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            transitions: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
        }
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition) {
        if self.limit == 0 {
            return;
        }
        if self.transitions.len() == self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition followed by
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.transitions.iter().map(|t| t.to.as_str()));
        path
    }

    /// Wall-clock span between the oldest and newest retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> impl DoubleEndedIterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
