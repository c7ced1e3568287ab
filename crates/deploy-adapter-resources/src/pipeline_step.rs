//! Pipeline step resource.
//!
//! Steps can be switched off with `ENABLED`. A disabled step never touches
//! the API: create, read and update leave the sentinel `{"id": "empty"}`
//! and delete leaves `{}`.

use async_trait::async_trait;
use deploy_adapter_auth::{ApiSession, AuthSession, SessionConfig};
use deploy_adapter_core::{Command, Environment, Result, State};
use serde_json::{Map, Value};

use crate::remote::RemoteResource;
use crate::resource::Resource;

/// API collection for pipeline steps.
pub const PIPELINE_STEP_PATH: &str = "/pipelinestep";

/// Environment keys read when building a pipeline step payload.
pub const PIPELINE_STEP_PAYLOAD_KEYS: &[&str] = &[
    "NAME",
    "DESCRIPTION",
    "PIPELINE_ID",
    "WORKSPACE_ID",
    "NEXT",
    "APPROVERS",
];

/// Environment flag enabling the step; only the literal `"true"` enables it.
pub const ENABLED_KEY: &str = "ENABLED";

/// A step within a deploy pipeline.
pub struct PipelineStepResource {
    environment: Environment,
    enabled: bool,
    remote: RemoteResource,
}

impl PipelineStepResource {
    /// Create a handler with its own authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session configuration is missing or the
    /// session cannot be built.
    pub fn new(environment: &Environment, state: State) -> Result<Self> {
        let config = SessionConfig::from_environment(environment, PIPELINE_STEP_PATH)?;
        let session = AuthSession::new(config)?;
        Ok(Self::with_session(environment, state, Box::new(session)))
    }

    /// Create a handler over an existing session.
    #[must_use]
    pub fn with_session(
        environment: &Environment,
        state: State,
        session: Box<dyn ApiSession>,
    ) -> Self {
        Self {
            environment: environment.clone(),
            enabled: environment.flag(ENABLED_KEY),
            remote: RemoteResource::new(session, state),
        }
    }

    /// Registry constructor.
    ///
    /// # Errors
    ///
    /// As for [`PipelineStepResource::new`].
    pub fn construct(environment: &Environment, state: State) -> Result<Box<dyn Resource>> {
        Ok(Box::new(Self::new(environment, state)?))
    }

    /// Whether the step is enabled.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Replace state with the disabled placeholder, if disabled.
    ///
    /// Returns true if the command was short-circuited.
    fn skip_if_disabled(&mut self, command: Command) -> bool {
        if self.enabled {
            return false;
        }
        let sentinel = match command {
            Command::Delete => State::default(),
            Command::Create | Command::Read | Command::Update => State::sentinel(),
        };
        tracing::info!(command = %command, "Pipeline step disabled, skipping API call");
        self.remote.set_state(sentinel);
        true
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let env = &self.environment;
        let mut payload = Map::new();
        payload.insert("name".into(), env.require("NAME")?.into());
        payload.insert("description".into(), env.require("DESCRIPTION")?.into());
        payload.insert("pipelineId".into(), env.require("PIPELINE_ID")?.into());
        payload.insert("workspaceId".into(), env.require("WORKSPACE_ID")?.into());
        payload.insert("next".into(), env.require_list("NEXT")?.into());
        payload.insert("approvers".into(), env.require_list("APPROVERS")?.into());
        Ok(payload)
    }
}

#[async_trait]
impl Resource for PipelineStepResource {
    async fn create(&mut self) -> Result<()> {
        if self.skip_if_disabled(Command::Create) {
            return Ok(());
        }
        self.remote.check(Command::Create)?;
        let payload = self.payload()?;
        self.remote.create(payload).await
    }

    async fn read(&mut self) -> Result<()> {
        if self.skip_if_disabled(Command::Read) {
            return Ok(());
        }
        self.remote.read().await
    }

    async fn update(&mut self) -> Result<()> {
        if self.skip_if_disabled(Command::Update) {
            return Ok(());
        }
        self.remote.check(Command::Update)?;
        let payload = self.payload()?;
        self.remote.update(payload).await
    }

    async fn delete(&mut self) -> Result<()> {
        if self.skip_if_disabled(Command::Delete) {
            return Ok(());
        }
        self.remote.delete().await
    }

    fn state(&self) -> &State {
        self.remote.state()
    }

    fn into_state(self: Box<Self>) -> State {
        self.remote.into_state()
    }
}
