//! Read-only pipeline lookup.
//!
//! A data source has no prior state of its own: it is built from the
//! environment alone and every read starts from scratch.

use async_trait::async_trait;
use deploy_adapter_auth::{ApiSession, AuthSession, SessionConfig};
use deploy_adapter_core::{AdapterError, Command, Environment, Result, State};
use serde_json::Value;

use crate::pipeline::PIPELINE_PATH;
use crate::remote::{reduce, RemoteResource};
use crate::resource::Resource;

/// Environment keys used as the lookup query.
pub const PIPELINE_QUERY_KEYS: &[&str] = &["NAME", "ORGANIZATION"];

/// Looks up an existing pipeline by name and organization.
pub struct PipelineDataSource {
    environment: Environment,
    remote: RemoteResource,
}

impl PipelineDataSource {
    /// Create a data source with its own authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session configuration is missing or the
    /// session cannot be built.
    pub fn new(environment: &Environment) -> Result<Self> {
        let config = SessionConfig::from_environment(environment, PIPELINE_PATH)?;
        let session = AuthSession::new(config)?;
        Ok(Self::with_session(environment, Box::new(session)))
    }

    /// Create a data source over an existing session.
    #[must_use]
    pub fn with_session(environment: &Environment, session: Box<dyn ApiSession>) -> Self {
        Self {
            environment: environment.clone(),
            remote: RemoteResource::new(session, State::default()),
        }
    }

    /// Registry constructor.
    ///
    /// # Errors
    ///
    /// As for [`PipelineDataSource::new`].
    pub fn construct(environment: &Environment) -> Result<Box<dyn Resource>> {
        Ok(Box::new(Self::new(environment)?))
    }

    fn unsupported(command: Command) -> AdapterError {
        AdapterError::InvalidCommand(format!(
            "PipelineDataSource is read-only and does not support {command}"
        ))
    }
}

#[async_trait]
impl Resource for PipelineDataSource {
    async fn create(&mut self) -> Result<()> {
        Err(Self::unsupported(Command::Create))
    }

    async fn read(&mut self) -> Result<()> {
        let name = self.environment.require("NAME")?;
        let organization = self.environment.require("ORGANIZATION")?;

        let response = self
            .remote
            .session()
            .get("", &[("name", name), ("organization", organization)])
            .await?;

        let state = match response {
            Value::Array(items) => match items.into_iter().next() {
                Some(first) => reduce(first)?,
                None => State::default(),
            },
            Value::Null => State::default(),
            other => reduce(other)?,
        };

        if state.is_empty() {
            tracing::warn!(pipeline = name, organization, "No pipeline matched lookup");
        } else {
            tracing::info!(pipeline = name, organization, "Found pipeline");
        }
        self.remote.set_state(state);
        Ok(())
    }

    async fn update(&mut self) -> Result<()> {
        Err(Self::unsupported(Command::Update))
    }

    async fn delete(&mut self) -> Result<()> {
        Err(Self::unsupported(Command::Delete))
    }

    fn state(&self) -> &State {
        self.remote.state()
    }

    fn into_state(self: Box<Self>) -> State {
        self.remote.into_state()
    }
}

#[cfg(test)]
mod tests {
    use deploy_adapter_auth::{HttpMethod, MockSession};
    use serde_json::json;

    use super::*;

    fn env() -> Environment {
        Environment::from_pairs([("NAME", "p1"), ("ORGANIZATION", "o")])
    }

    #[tokio::test]
    async fn read_queries_by_name_and_organization() {
        let session = MockSession::new().respond_with(json!([
            {"id": "abc123", "name": "p1", "creationTimestamp": "t"},
            {"id": "def456", "name": "p1"}
        ]));
        let mut lookup = PipelineDataSource::with_session(&env(), Box::new(session.clone()));

        lookup.read().await.unwrap();

        let calls = session.calls();
        assert_eq!(calls[0].method, HttpMethod::Get);
        assert_eq!(calls[0].path, "");
        assert_eq!(
            calls[0].query,
            vec![
                ("name".to_string(), "p1".to_string()),
                ("organization".to_string(), "o".to_string())
            ]
        );
        assert_eq!(
            lookup.state().clone().into_value(),
            json!({"id": "abc123", "name": "p1"})
        );
    }

    #[tokio::test]
    async fn read_accepts_single_object() {
        let session = MockSession::new().respond_with(json!({"id": "abc123"}));
        let mut lookup = PipelineDataSource::with_session(&env(), Box::new(session));

        lookup.read().await.unwrap();
        assert_eq!(lookup.state().id(), Some(&json!("abc123")));
    }

    #[tokio::test]
    async fn no_match_is_empty_state() {
        for response in [json!([]), Value::Null] {
            let session = MockSession::new().respond_with(response);
            let mut lookup = PipelineDataSource::with_session(&env(), Box::new(session));

            lookup.read().await.unwrap();
            assert!(lookup.state().is_empty());
        }
    }

    #[tokio::test]
    async fn unexpected_body_is_a_parse_error() {
        let session = MockSession::new().respond_with(json!("pipelines"));
        let mut lookup = PipelineDataSource::with_session(&env(), Box::new(session));

        let err = lookup.read().await.unwrap_err();
        assert!(matches!(err, AdapterError::ResponseParseError(_)));
    }

    #[tokio::test]
    async fn write_commands_are_rejected_without_requests() {
        let session = MockSession::new();
        let mut lookup = PipelineDataSource::with_session(&env(), Box::new(session.clone()));

        assert!(matches!(
            lookup.create().await,
            Err(AdapterError::InvalidCommand(_))
        ));
        assert!(lookup.update().await.is_err());
        assert!(lookup.delete().await.is_err());
        assert_eq!(session.call_count(), 0);
    }
}
