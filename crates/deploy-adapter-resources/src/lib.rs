//! Resource handlers, registry and dispatcher for the deploy adapter.
//!
//! One invocation of the adapter flows through this crate:
//!
//! ```text
//! StateStore::load ──▶ Dispatcher ──▶ Registry::resolve ──▶ ResourceDescriptor::build
//!                                                                 │
//!                          StateStore::persist ◀── into_state ◀── Resource::{create,read,update,delete}
//! ```
//!
//! Handlers are closed, compile-time registered variants; there is no
//! lookup by reflection.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod dispatch;
pub mod pipeline;
pub mod pipeline_data;
pub mod pipeline_step;
pub mod registry;
pub mod remote;
pub mod resource;

pub use dispatch::{Dispatcher, RunContext};
pub use pipeline::PipelineResource;
pub use pipeline_data::PipelineDataSource;
pub use pipeline_step::PipelineStepResource;
pub use registry::{Constructor, Registry, ResourceDescriptor};
pub use resource::{apply, Resource};
