//! Core types for the deploy resource adapter.
//!
//! This crate provides the vocabulary shared by every other adapter crate:
//!
//! - **Environment**: the immutable key/value configuration of one invocation
//! - **State**: the last-known remote representation of a resource
//! - **Command**: the lifecycle operation requested by the caller
//! - **Lifecycle rules**: which commands are valid from which status
//! - **Error types**: the `AdapterError` taxonomy and its exit codes
//!
//! # Example
//!
//! ```
//! use deploy_adapter_core::{Command, Environment, State, Status};
//!
//! let env = Environment::from_pairs([("NAME", "p1")]);
//! assert_eq!(env.require("NAME").unwrap(), "p1");
//!
//! let command: Command = "create".parse().unwrap();
//! assert_eq!(command, Command::Create);
//!
//! let state = State::default();
//! assert_eq!(state.status(), Status::Absent);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod state;

pub use command::Command;
pub use environment::Environment;
pub use error::{AdapterError, Result};
pub use lifecycle::{validate_transition, Status};
pub use state::State;
