//! Lifecycle commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// One of the four lifecycle operations an invocation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Create the remote resource from configuration.
    Create,
    /// Refresh state from the remote resource.
    Read,
    /// Push configuration to the existing remote resource.
    Update,
    /// Remove the remote resource.
    Delete,
}

impl Command {
    /// All commands, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Create, Self::Read, Self::Update, Self::Delete];

    /// Returns the lowercase name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| {
                AdapterError::InvalidCommand(format!(
                    "{s:?} is not one of create, read, update, delete"
                ))
            })
    }
}
