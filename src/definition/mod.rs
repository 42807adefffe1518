//! Data-driven machine definitions.
//!
//! A [`MachineDefinition`] describes a state graph as plain data, typically
//! produced by an editor and loaded from JSON. Behaviour is attached while
//! building through [`MachineDefinition::build_with`].

use crate::builder::{BuildError, StateMachineBuilder, TransitionBuilder};
use crate::core::{Blackboard, Condition, State, DEFAULT_HISTORY_LIMIT};
use crate::fsm::{StateMachine, DEFAULT_MAX_CASCADE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or building a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to parse machine definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid machine definition: {0}")]
    Build(#[from] BuildError),
}

/// A state entry in a definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDefinition {
    pub name: String,
    #[serde(default)]
    pub default: bool,
}

/// A transition entry in a definition. A missing `from` means any state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionDefinition {
    #[serde(default)]
    pub from: Option<String>,
    pub to: String,
    #[serde(default)]
    pub exit_time: f32,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Serializable description of a state machine.
///
/// # Example
///
/// ```rust
/// use bluecheese::definition::MachineDefinition;
///
/// let json = r#"{
///     "name": "door",
///     "states": [{ "name": "Closed" }, { "name": "Open" }],
///     "transitions": [
///         { "from": "Closed", "to": "Open",
///           "conditions": [{ "kind": "trigger", "parameter": "open" }] },
///         { "from": "Open", "to": "Closed", "exit_time": 3.0 }
///     ]
/// }"#;
///
/// let mut machine = MachineDefinition::from_json(json).unwrap().build().unwrap();
/// machine.start().unwrap();
/// machine.set_trigger("open");
/// machine.update(0.1);
/// assert_eq!(machine.current_state(), Some("Open"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MachineDefinition {
    pub name: String,
    pub states: Vec<StateDefinition>,
    #[serde(default)]
    pub transitions: Vec<TransitionDefinition>,
    /// Initial parameter values
    #[serde(default)]
    pub parameters: Blackboard,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_max_cascade")]
    pub max_cascade: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_max_cascade() -> usize {
    DEFAULT_MAX_CASCADE
}

impl MachineDefinition {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a machine whose states carry no behaviour.
    pub fn build(self) -> Result<StateMachine, DefinitionError> {
        self.build_with(|name| State::new(name))
    }

    /// Build a machine, creating each state through `make_state`.
    ///
    /// The closure receives the state name and must return a state with
    /// that name; returned names are what the machine registers.
    pub fn build_with<F>(self, mut make_state: F) -> Result<StateMachine, DefinitionError>
    where
        F: FnMut(&str) -> State,
    {
        let mut builder = StateMachineBuilder::new()
            .name(self.name)
            .history_limit(self.history_limit)
            .max_cascade(self.max_cascade);

        for state in &self.states {
            let made = make_state(&state.name);
            builder = if state.default {
                builder.add_default_state(made)?
            } else {
                builder.add_state(made)?
            };
        }

        for transition in self.transitions {
            let mut spec = match transition.from {
                Some(from) => TransitionBuilder::new().from(from),
                None => TransitionBuilder::new().from_any_state(),
            }
            .to(transition.to)
            .exit_time(transition.exit_time);
            for condition in transition.conditions {
                spec = spec.when(condition);
            }
            builder = builder.transition(spec)?;
        }

        let mut machine = builder.build()?;
        *machine.blackboard_mut() = self.parameters;
        Ok(machine)
    }
}
