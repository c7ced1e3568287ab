//! New-state sinks.

use std::path::{Path, PathBuf};

use deploy_adapter_core::State;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// Where the new state document is written, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSink {
    /// Output file, overwritten on persist.
    pub path: PathBuf,
    /// Coerce every value to a string before writing.
    pub stringify: bool,
}

impl StateSink {
    /// A sink that writes every value as a string.
    pub fn stringified(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stringify: true,
        }
    }

    /// A sink that writes values at their native JSON type.
    pub fn native(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stringify: false,
        }
    }

    /// Render `state` according to the stringify policy.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialize` if the state cannot be encoded.
    pub fn render(&self, state: &State) -> Result<String> {
        let text = if self.stringify {
            serde_json::to_string(&stringify_values(state.as_map()))?
        } else {
            serde_json::to_string(state)?
        };
        Ok(text)
    }

    /// Write `state` to the sink, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded or the file cannot be
    /// written.
    pub fn persist(&self, state: &State) -> Result<()> {
        let text = self.render(state)?;
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), fields = state.as_map().len(), "Saved state");
        Ok(())
    }
}

/// Strings stay as they are; everything else becomes its compact JSON text.
fn stringify_values(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), Value::String(text))
        })
        .collect()
}
