//! State document storage for the deploy resource adapter.
//!
//! The calling orchestration tool hands the adapter a prior-state document
//! and expects a new one back. This crate covers both ends:
//!
//! - `StateSource`: where the prior state comes from (a file, or an inline
//!   JSON string)
//! - `StateSink`: where the new state goes, and whether values are
//!   stringified on the way out
//!
//! Loading never fails. A missing or garbled prior state is logged and read
//! as `{}`, which every resource interprets as "absent".
//!
//! # Example
//!
//! ```no_run
//! use deploy_adapter_store::{StateSink, StateSource, StateStore};
//!
//! let store = StateStore::new(
//!     StateSource::File("state.json".into()),
//!     StateSink::stringified("state.json"),
//! );
//!
//! let state = store.load();
//! store.persist(&state).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod sink;
pub mod source;

pub use error::{Result, StoreError};
pub use sink::StateSink;
pub use source::StateSource;

use deploy_adapter_core::State;

/// A configured source/sink pair for one invocation.
#[derive(Debug, Clone)]
pub struct StateStore {
    source: StateSource,
    sink: StateSink,
}

impl StateStore {
    /// Create a store reading from `source` and writing to `sink`.
    #[must_use]
    pub const fn new(source: StateSource, sink: StateSink) -> Self {
        Self { source, sink }
    }

    /// Load the prior state, degrading to `{}` on any problem.
    #[must_use]
    pub fn load(&self) -> State {
        self.source.load()
    }

    /// Write `state` to the sink, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn persist(&self, state: &State) -> Result<()> {
        self.sink.persist(state)
    }

    /// Get the configured source.
    #[must_use]
    pub const fn source(&self) -> &StateSource {
        &self.source
    }

    /// Get the configured sink.
    #[must_use]
    pub const fn sink(&self) -> &StateSink {
        &self.sink
    }
}
