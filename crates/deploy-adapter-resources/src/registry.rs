//! Closed registry of resource types.
//!
//! Every resource the adapter can manage is listed here with its API path,
//! the environment keys it needs, the commands it supports, and how it is
//! constructed. Lookup is by `(module, name)`; the `resources` module
//! matches any registered name.

use std::fmt;

use deploy_adapter_core::environment::{DEPLOY_ENDPOINT, ENCRYPTION_KEY};
use deploy_adapter_core::{AdapterError, Command, Environment, Result, State};

use crate::pipeline::{PipelineResource, PIPELINE_PATH, PIPELINE_PAYLOAD_KEYS};
use crate::pipeline_data::{PipelineDataSource, PIPELINE_QUERY_KEYS};
use crate::pipeline_step::{
    PipelineStepResource, ENABLED_KEY, PIPELINE_STEP_PATH, PIPELINE_STEP_PAYLOAD_KEYS,
};
use crate::resource::Resource;

/// Module name that matches every registered resource.
pub const UMBRELLA_MODULE: &str = "resources";

/// Keys every resource needs to open its session.
pub const SESSION_KEYS: &[&str] = &[ENCRYPTION_KEY, DEPLOY_ENDPOINT];

/// Constructor for resources built from the environment alone.
pub type EnvironmentConstructor = fn(&Environment) -> Result<Box<dyn Resource>>;

/// Constructor for resources built from the environment and prior state.
pub type StatefulConstructor = fn(&Environment, State) -> Result<Box<dyn Resource>>;

/// How a resource is constructed.
#[derive(Clone, Copy)]
pub enum Constructor {
    /// Environment only; prior state is discarded.
    Environment(EnvironmentConstructor),
    /// Environment and prior state.
    EnvironmentAndState(StatefulConstructor),
}

impl Constructor {
    /// Short name of the construction mode.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Environment(_) => "environment",
            Self::EnvironmentAndState(_) => "environment+state",
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}

/// A registry entry binding a resource name to its constructor.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
    /// Module the resource belongs to.
    pub module: &'static str,
    /// Resource name.
    pub name: &'static str,
    /// API path segment the resource targets.
    pub api_path: &'static str,
    /// Keys checked before construction.
    pub required_keys: &'static [&'static str],
    /// Keys read when a payload or query is built.
    pub payload_keys: &'static [&'static str],
    /// Keys read if present.
    pub optional_keys: &'static [&'static str],
    /// Commands the resource supports.
    pub commands: &'static [Command],
    /// How to build the resource.
    pub construct: Constructor,
}

impl ResourceDescriptor {
    /// `module::name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    /// Whether the resource supports `command`.
    #[must_use]
    pub fn supports(&self, command: Command) -> bool {
        self.commands.contains(&command)
    }

    /// Build the resource handler.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::MissingConfiguration` if a required key is
    /// absent, or any error from the constructor.
    pub fn build(&self, environment: &Environment, prior: State) -> Result<Box<dyn Resource>> {
        if let Some(key) = environment.first_missing(self.required_keys) {
            return Err(AdapterError::MissingConfiguration(key.to_string()));
        }

        match self.construct {
            Constructor::Environment(construct) => {
                if !prior.is_empty() {
                    tracing::debug!(
                        resource = %self.qualified_name(),
                        "Ignoring prior state for environment-only resource"
                    );
                }
                construct(environment)
            }
            Constructor::EnvironmentAndState(construct) => construct(environment, prior),
        }
    }
}

const MANAGED_COMMANDS: &[Command] = &Command::ALL;
const READ_ONLY_COMMANDS: &[Command] = &[Command::Read];

static BUILTIN: [ResourceDescriptor; 3] = [
    ResourceDescriptor {
        module: "pipeline_resource",
        name: "PipelineResource",
        api_path: PIPELINE_PATH,
        required_keys: SESSION_KEYS,
        payload_keys: PIPELINE_PAYLOAD_KEYS,
        optional_keys: &[],
        commands: MANAGED_COMMANDS,
        construct: Constructor::EnvironmentAndState(PipelineResource::construct),
    },
    ResourceDescriptor {
        module: "pipelinestep_resource",
        name: "PipelineStepResource",
        api_path: PIPELINE_STEP_PATH,
        required_keys: SESSION_KEYS,
        payload_keys: PIPELINE_STEP_PAYLOAD_KEYS,
        optional_keys: &[ENABLED_KEY],
        commands: MANAGED_COMMANDS,
        construct: Constructor::EnvironmentAndState(PipelineStepResource::construct),
    },
    ResourceDescriptor {
        module: "pipeline_data_source",
        name: "PipelineDataSource",
        api_path: PIPELINE_PATH,
        required_keys: SESSION_KEYS,
        payload_keys: PIPELINE_QUERY_KEYS,
        optional_keys: &[],
        commands: READ_ONLY_COMMANDS,
        construct: Constructor::Environment(PipelineDataSource::construct),
    },
];

/// A fixed set of resource descriptors.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    entries: &'static [ResourceDescriptor],
}

impl Registry {
    /// The resources shipped with the adapter.
    #[must_use]
    pub const fn builtin() -> Self {
        Self { entries: &BUILTIN }
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &'static ResourceDescriptor> {
        self.entries.iter()
    }

    /// `module::name` of every entry.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.iter().map(ResourceDescriptor::qualified_name).collect()
    }

    /// Find the entry for `module` and `name`.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::UnknownResourceType` if nothing matches.
    pub fn resolve(&self, module: &str, name: &str) -> Result<&'static ResourceDescriptor> {
        self.iter()
            .find(|entry| {
                entry.name == name && (module == UMBRELLA_MODULE || entry.module == module)
            })
            .ok_or_else(|| AdapterError::UnknownResourceType {
                module: module.to_string(),
                name: name.to_string(),
                registered: self.names().join(", "),
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
