//! BlueCheese: a service container and a tick-driven state machine core.
//!
//! The crate has two halves that share nothing but an error style:
//!
//! - [`container`]: registration and resolution of services with
//!   singleton/transient and lazy/eager lifecycles, decorators, open
//!   generics, option objects, field injection and child containers.
//! - [`fsm`] with [`core`], [`builder`], [`definition`] and
//!   [`checkpoint`]: a finite state machine with a typed parameter
//!   blackboard, guarded transitions with exit times and time overflow,
//!   and persistable runtime snapshots.
//!
//! # Example
//!
//! ```rust
//! use bluecheese::core::{Condition, State};
//! use bluecheese::fsm::StateMachine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut machine = StateMachine::builder()
//!     .add_default_state(State::new("Red"))?
//!     .add_state(State::new("Green"))?
//!     .add_transition("Red", "Green", 0.0, [Condition::trigger("go")])?
//!     .add_transition("Green", "Red", 2.0, [])?
//!     .build()?;
//!
//! machine.start()?;
//! machine.set_trigger("go");
//! machine.update(0.1);
//! assert_eq!(machine.current_state(), Some("Green"));
//!
//! machine.update(2.5);
//! assert_eq!(machine.current_state(), Some("Red"));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod checkpoint;
pub mod container;
pub mod core;
pub mod definition;
pub mod fsm;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use container::{ContainerError, Injectable, Resolution, Service, ServiceContainer};
pub use crate::core::{Blackboard, CompareOp, Condition, State, StateBehavior};
pub use definition::MachineDefinition;
pub use fsm::{MachineError, StateMachine};
