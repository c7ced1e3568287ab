//! Pipeline resource.

use async_trait::async_trait;
use deploy_adapter_auth::{ApiSession, AuthSession, SessionConfig};
use deploy_adapter_core::{Command, Environment, Result, State};
use serde_json::{Map, Value};

use crate::remote::RemoteResource;
use crate::resource::Resource;

/// API collection for pipelines.
pub const PIPELINE_PATH: &str = "/pipeline";

/// Environment keys read when building a pipeline payload.
pub const PIPELINE_PAYLOAD_KEYS: &[&str] = &["NAME", "DESCRIPTION", "ORGANIZATION"];

/// A deploy pipeline.
pub struct PipelineResource {
    environment: Environment,
    remote: RemoteResource,
}

impl PipelineResource {
    /// Create a handler with its own authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session configuration is missing or the
    /// session cannot be built.
    pub fn new(environment: &Environment, state: State) -> Result<Self> {
        let config = SessionConfig::from_environment(environment, PIPELINE_PATH)?;
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
            remote: RemoteResource::new(session, state),
        }
    }

    /// Registry constructor.
    ///
    /// # Errors
    ///
    /// As for [`PipelineResource::new`].
    pub fn construct(environment: &Environment, state: State) -> Result<Box<dyn Resource>> {
        Ok(Box::new(Self::new(environment, state)?))
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let env = &self.environment;
        let mut payload = Map::new();
        payload.insert("name".into(), env.require("NAME")?.into());
        payload.insert("description".into(), env.require("DESCRIPTION")?.into());
        payload.insert("organization".into(), env.require("ORGANIZATION")?.into());
        Ok(payload)
    }
}

#[async_trait]
impl Resource for PipelineResource {
    async fn create(&mut self) -> Result<()> {
        self.remote.check(Command::Create)?;
        let payload = self.payload()?;
        self.remote.create(payload).await
    }

    async fn read(&mut self) -> Result<()> {
        self.remote.read().await
    }

    async fn update(&mut self) -> Result<()> {
        self.remote.check(Command::Update)?;
        let payload = self.payload()?;
        self.remote.update(payload).await
    }

    async fn delete(&mut self) -> Result<()> {
        self.remote.delete().await
    }

    fn state(&self) -> &State {
        self.remote.state()
    }

    fn into_state(self: Box<Self>) -> State {
        self.remote.into_state()
    }
}
