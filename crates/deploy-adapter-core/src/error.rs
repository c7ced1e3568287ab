//! Error taxonomy for the adapter.
//!
//! None of these errors are recovered internally: each one aborts the
//! current invocation before any state is persisted.

use thiserror::Error;

use crate::command::Command;
use crate::lifecycle::Status;

/// A result type using `AdapterError`.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors that can abort an adapter invocation.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The requested command is not a lifecycle operation, or the resource
    /// does not support it.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// No resource is registered under the requested module and name.
    #[error("unknown resource type {module}::{name} (registered: {registered})")]
    UnknownResourceType {
        /// Requested module.
        module: String,
        /// Requested resource name.
        name: String,
        /// Comma-separated list of registered resources.
        registered: String,
    },

    /// A required environment key is missing.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// The command is not valid for the resource's current status.
    #[error("cannot {command} a resource that is {status}")]
    InvalidStateTransition {
        /// The requested command.
        command: Command,
        /// The status the resource was in.
        status: Status,
    },

    /// The remote API could not be reached or answered with a non-2xx status.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The remote API answered with a body that could not be interpreted.
    #[error("response parse error: {0}")]
    ResponseParseError(String),

    /// The session credential could not be produced.
    #[error("credential error: {0}")]
    Credential(String),

    /// The resulting state could not be written.
    #[error("state persist error: {0}")]
    StatePersistError(String),
}

impl AdapterError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidCommand(_) => 2,
            Self::UnknownResourceType { .. } => 3,
            Self::MissingConfiguration(_) => 4,
            Self::InvalidStateTransition { .. } => 5,
            Self::NetworkError(_) => 10,
            Self::ResponseParseError(_) => 11,
            Self::Credential(_) => 12,
            Self::StatePersistError(_) => 20,
        }
    }

    /// Returns true if re-running the invocation with the same prior state
    /// might succeed.
    ///
    /// A persist failure is not retriable: the remote side already changed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::NetworkError(_))
    }
}
