//! Storage error types.

use std::path::PathBuf;

use deploy_adapter_core::AdapterError;
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while persisting state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The sink could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The sink path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The state could not be serialized.
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<StoreError> for AdapterError {
    fn from(err: StoreError) -> Self {
        Self::StatePersistError(err.to_string())
    }
}
