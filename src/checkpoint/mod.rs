//! Checkpoint and resume functionality for state machines.
//!
//! A checkpoint captures the runtime position of a machine (active state,
//! time in state, parameters, history) so it can be persisted and restored
//! into a machine built from the same graph. Topology, behaviours and hooks
//! are not part of a checkpoint.

use crate::core::{Blackboard, StateHistory};
use crate::fsm::StateMachine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a running state machine.
///
/// # Example
///
/// ```rust
/// use bluecheese::checkpoint::Checkpoint;
/// use bluecheese::core::State;
/// use bluecheese::fsm::StateMachine;
///
/// let build = || {
///     StateMachine::builder()
///         .add_state(State::new("Idle")).unwrap()
///         .add_state(State::new("Run")).unwrap()
///         .build()
///         .unwrap()
/// };
///
/// let mut machine = build();
/// machine.start().unwrap();
/// machine.set_state("Run").unwrap();
/// let json = machine.checkpoint().to_json().unwrap();
///
/// let mut resumed = build();
/// resumed.restore(&Checkpoint::from_json(&json).unwrap()).unwrap();
/// assert_eq!(resumed.current_state(), Some("Run"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the checkpointed machine
    pub machine: String,

    /// Active state, `None` when the machine was not started
    pub current_state: Option<String>,

    /// Time accumulated in the active state
    pub state_time: f32,

    /// Parameter values and active triggers
    pub blackboard: Blackboard,

    /// Retained transition history
    pub history: StateHistory,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl StateMachine {
    /// Capture the machine's runtime position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            machine: self.name().to_string(),
            current_state: self.current_state().map(str::to_string),
            state_time: self.state_time(),
            blackboard: self.blackboard().clone(),
            history: self.history().clone(),
        }
    }

    /// Restore a checkpoint taken from a machine with the same name and
    /// states. No enter or exit hooks run.
    pub fn restore(&mut self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: checkpoint.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if checkpoint.machine != self.name() {
            return Err(CheckpointError::MachineMismatch {
                expected: self.name().to_string(),
                found: checkpoint.machine.clone(),
            });
        }

        let current = match checkpoint.current_state.as_deref() {
            Some(name) => Some(
                self.state_id(name)
                    .ok_or_else(|| CheckpointError::UnknownState(name.to_string()))?,
            ),
            None => None,
        };

        self.restore_snapshot(
            current,
            checkpoint.state_time,
            checkpoint.blackboard.clone(),
            checkpoint.history.clone(),
        );
        debug!(machine = %self.name(), checkpoint = %checkpoint.id, "checkpoint restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Condition, State};

    fn build() -> StateMachine {
        StateMachine::builder()
            .name("door")
            .add_state(State::new("Closed"))
            .unwrap()
            .add_state(State::new("Open"))
            .unwrap()
            .add_transition("Closed", "Open", 0.0, [Condition::trigger("open")])
            .unwrap()
            .add_transition("Open", "Closed", 2.0, [])
            .unwrap()
            .build()
            .unwrap()
    }

    fn running() -> StateMachine {
        let mut machine = build();
        machine.start().unwrap();
        machine.set_trigger("open");
        machine.update(0.5);
        machine.update(0.25);
        machine.set_int("visits", 3);
        machine
    }

    #[test]
    fn checkpoint_captures_runtime_position() {
        let checkpoint = running().checkpoint();

        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.machine, "door");
        assert_eq!(checkpoint.current_state.as_deref(), Some("Open"));
        assert_eq!(checkpoint.state_time, 0.75);
        assert_eq!(checkpoint.blackboard.get_int("visits"), 3);
        assert_eq!(checkpoint.history.len(), 1);
    }

    #[test]
    fn checkpoint_ids_are_unique() {
        let machine = running();
        assert_ne!(machine.checkpoint().id, machine.checkpoint().id);
    }

    #[test]
    fn restore_resumes_timing() {
        let checkpoint = running().checkpoint();
        let mut resumed = build();
        resumed.restore(&checkpoint).unwrap();

        assert!(resumed.is_started());
        resumed.update(1.25);
        assert_eq!(resumed.current_state(), Some("Closed"));
    }

    #[test]
    fn json_roundtrip_preserves_checkpoint() {
        let checkpoint = running().checkpoint();
        let json = checkpoint.to_json().unwrap();

        assert_eq!(Checkpoint::from_json(&json).unwrap(), checkpoint);
    }

    #[test]
    fn binary_roundtrip_preserves_checkpoint() {
        let checkpoint = running().checkpoint();
        let bytes = checkpoint.to_bytes().unwrap();

        assert_eq!(Checkpoint::from_bytes(&bytes).unwrap(), checkpoint);
    }

    #[test]
    fn restore_rejects_other_versions() {
        let mut checkpoint = running().checkpoint();
        checkpoint.version = CHECKPOINT_VERSION + 1;

        let result = build().restore(&checkpoint);
        assert!(matches!(
            result,
            Err(CheckpointError::UnsupportedVersion { found, .. }) if found == CHECKPOINT_VERSION + 1
        ));
    }

    #[test]
    fn restore_rejects_unknown_state() {
        let mut checkpoint = running().checkpoint();
        checkpoint.current_state = Some("Ajar".to_string());

        let result = build().restore(&checkpoint);
        assert!(matches!(result, Err(CheckpointError::UnknownState(name)) if name == "Ajar"));
    }

    #[test]
    fn restore_rejects_other_machines() {
        let checkpoint = running().checkpoint();
        let mut other = StateMachine::builder()
            .name("window")
            .add_state(State::new("Open"))
            .unwrap()
            .build()
            .unwrap();

        assert!(matches!(
            other.restore(&checkpoint),
            Err(CheckpointError::MachineMismatch { .. })
        ));
        assert!(!other.is_started());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = Checkpoint::from_bytes(&[0xff, 0x01]);
        assert!(matches!(result, Err(CheckpointError::Binary(_))));
    }
}
