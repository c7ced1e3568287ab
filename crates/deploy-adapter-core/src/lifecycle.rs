//! Resource lifecycle rules.
//!
//! # State Machine
//!
//! ```text
//!              create
//!     ┌────────┐ ─────▶ ┌─────────┐ ◀─┐
//!     │ Absent │        │ Present │   │ read / update
//!     └────────┘ ◀───── └─────────┘ ──┘
//!               delete
//! ```
//!
//! Any other combination is rejected before a request is made, leaving the
//! prior state in place.

use std::fmt;

use crate::command::Command;
use crate::error::{AdapterError, Result};

/// Whether a resource currently exists remotely, as far as state knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// State carries no `id`.
    Absent,
    /// State carries an `id`.
    Present,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Present => f.write_str("present"),
        }
    }
}

/// Check if a command may run against a resource in the given status.
#[must_use]
pub const fn is_valid_transition(command: Command, status: Status) -> bool {
    matches!(
        (command, status),
        (Command::Create, Status::Absent)
            | (Command::Read | Command::Update | Command::Delete, Status::Present)
    )
}

/// Validates that `command` may run from `status`.
///
/// # Errors
///
/// Returns `AdapterError::InvalidStateTransition` if the command is not
/// allowed.
pub fn validate_transition(command: Command, status: Status) -> Result<()> {
    if is_valid_transition(command, status) {
        Ok(())
    } else {
        Err(AdapterError::InvalidStateTransition { command, status })
    }
}
