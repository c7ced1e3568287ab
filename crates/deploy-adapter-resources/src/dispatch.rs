//! Invocation dispatcher.
//!
//! The dispatcher runs exactly one lifecycle command per invocation:
//! load prior state, resolve and build the handler, run the command, and
//! persist the handler's resulting state. State is persisted only when the
//! command succeeds, so a failed invocation can be retried with the same
//! prior state.

use deploy_adapter_core::{AdapterError, Command, Environment, Result, State};
use deploy_adapter_store::StateStore;

use crate::registry::Registry;
use crate::resource::apply;

/// Everything one invocation needs, captured up front by the caller.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Process environment.
    pub environment: Environment,
    /// Module of the requested resource.
    pub module: String,
    /// Name of the requested resource.
    pub name: String,
    /// Requested command, as given on the command line.
    pub command: String,
    /// Where prior state comes from and new state goes.
    pub store: StateStore,
}

/// Resolves resources and runs lifecycle commands against them.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    /// Create a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Get the registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Load, run, and persist one invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is invalid, the resource is unknown,
    /// the command fails, or the new state cannot be persisted. Nothing is
    /// persisted unless the command succeeds.
    pub async fn execute(&self, context: &RunContext) -> Result<State> {
        let command: Command = context.command.parse()?;
        let prior = context.store.load();

        let state = self
            .run_command(
                &context.module,
                &context.name,
                command,
                prior,
                &context.environment,
            )
            .await?;

        context.store.persist(&state)?;
        Ok(state)
    }

    /// Run `command` against the resource and return its new state.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::InvalidCommand` for anything other than a
    /// lifecycle command, plus any error from [`Dispatcher::run_command`].
    pub async fn run(
        &self,
        module: &str,
        name: &str,
        command: &str,
        prior: State,
        environment: &Environment,
    ) -> Result<State> {
        let command: Command = command.parse()?;
        self.run_command(module, name, command, prior, environment)
            .await
    }

    /// Run a parsed `command` against the resource and return its new state.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::UnknownResourceType` if the resource is not
    /// registered, `AdapterError::InvalidCommand` if it does not support the
    /// command, or any construction or lifecycle error.
    pub async fn run_command(
        &self,
        module: &str,
        name: &str,
        command: Command,
        prior: State,
        environment: &Environment,
    ) -> Result<State> {
        let descriptor = self.registry.resolve(module, name)?;
        let resource_name = descriptor.qualified_name();

        if !descriptor.supports(command) {
            return Err(AdapterError::InvalidCommand(format!(
                "{resource_name} does not support {command}"
            )));
        }

        tracing::info!(
            resource = %resource_name,
            command = %command,
            mode = descriptor.construct.mode(),
            prior_status = %prior.status(),
            "Running lifecycle command"
        );

        let mut resource = descriptor.build(environment, prior)?;
        apply(resource.as_mut(), command).await?;
        let state = resource.into_state();

        tracing::info!(
            resource = %resource_name,
            command = %command,
            status = %state.status(),
            "Lifecycle command complete"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use deploy_adapter_core::environment::{DEPLOY_ENDPOINT, DEPLOY_SCHEME, ENCRYPTION_KEY};
    use deploy_adapter_store::{StateSink, StateSource};
    use serde_json::{json, Value};
    use wiremock::matchers::{any, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn env_for(server: &MockServer, extra: &[(&str, &str)]) -> Environment {
        let mut pairs = vec![
            (ENCRYPTION_KEY.to_string(), "secret".to_string()),
            (DEPLOY_ENDPOINT.to_string(), server.address().to_string()),
            (DEPLOY_SCHEME.to_string(), "http".to_string()),
        ];
        pairs.extend(
            extra
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        Environment::from_pairs(pairs)
    }

    fn pipeline_env(server: &MockServer) -> Environment {
        env_for(
            server,
            &[("NAME", "p1"), ("DESCRIPTION", "d"), ("ORGANIZATION", "o")],
        )
    }

    fn present() -> State {
        serde_json::from_value(json!({
            "id": "abc123",
            "name": "p1",
            "description": "d",
            "organization": "o"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_pipeline_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pipeline"))
            .and(body_json(
                json!({"name": "p1", "description": "d", "organization": "o"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let state = Dispatcher::default()
            .run(
                "pipeline_resource",
                "PipelineResource",
                "create",
                State::default(),
                &pipeline_env(&server),
            )
            .await
            .unwrap();

        assert_eq!(state, present());
    }

    #[tokio::test]
    async fn delete_pipeline_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/pipeline"))
            .and(body_json(present().into_value()))
            .respond_with(ResponseTemplate::new(200).set_body_string("gone"))
            .expect(1)
            .mount(&server)
            .await;

        let state = Dispatcher::default()
            .run(
                "resources",
                "PipelineResource",
                "delete",
                present(),
                &pipeline_env(&server),
            )
            .await
            .unwrap();

        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn disabled_step_reads_sentinel_without_requests() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let env = env_for(&server, &[("ENABLED", "false")]);
        for prior in [State::default(), present()] {
            let state = Dispatcher::default()
                .run(
                    "pipelinestep_resource",
                    "PipelineStepResource",
                    "read",
                    prior,
                    &env,
                )
                .await
                .unwrap();
            assert_eq!(state.into_value(), json!({"id": "empty"}));
        }
    }

    #[tokio::test]
    async fn invalid_command_is_rejected() {
        let err = Dispatcher::default()
            .run(
                "resources",
                "PipelineResource",
                "destroy",
                State::default(),
                &Environment::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidCommand(_)));
    }

    #[tokio::test]
    async fn unknown_resource_is_rejected() {
        let err = Dispatcher::default()
            .run(
                "resources",
                "Workspace",
                "read",
                State::default(),
                &Environment::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnknownResourceType { .. }));
    }

    #[tokio::test]
    async fn data_source_rejects_write_commands_before_construction() {
        let err = Dispatcher::default()
            .run(
                "resources",
                "PipelineDataSource",
                "create",
                State::default(),
                &Environment::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidCommand(_)));
    }

    #[tokio::test]
    async fn missing_session_keys_are_reported() {
        let err = Dispatcher::default()
            .run(
                "resources",
                "PipelineResource",
                "create",
                State::default(),
                &Environment::from_pairs([("NAME", "p1")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::MissingConfiguration(k) if k == ENCRYPTION_KEY));
    }

    #[tokio::test]
    async fn execute_persists_after_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pipeline/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "abc123",
                "name": "p1",
                "stages": 3,
                "creationTimestamp": "2024-05-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        std::fs::write(&state_path, r#"{"id": "abc123", "name": "p1"}"#).unwrap();

        let context = RunContext {
            environment: pipeline_env(&server),
            module: "pipeline_resource".to_string(),
            name: "PipelineResource".to_string(),
            command: "read".to_string(),
            store: StateStore::new(
                StateSource::File(state_path.clone()),
                StateSink::stringified(&state_path),
            ),
        };

        Dispatcher::default().execute(&context).await.unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({"id": "abc123", "name": "p1", "stages": "3"})
        );
    }

    #[tokio::test]
    async fn execute_leaves_prior_state_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        std::fs::write(&out, "previous").unwrap();

        let context = RunContext {
            environment: pipeline_env(&server),
            module: "resources".to_string(),
            name: "PipelineResource".to_string(),
            command: "update".to_string(),
            store: StateStore::new(
                StateSource::Inline(r#"{"id": "abc123"}"#.to_string()),
                StateSink::native(&out),
            ),
        };

        let err = Dispatcher::default().execute(&context).await.unwrap_err();
        assert!(matches!(err, AdapterError::NetworkError(_)));
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous");
    }

    #[tokio::test]
    async fn execute_with_missing_prior_state_creates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");

        let context = RunContext {
            environment: pipeline_env(&server),
            module: "resources".to_string(),
            name: "PipelineResource".to_string(),
            command: "create".to_string(),
            store: StateStore::new(
                StateSource::File(state_path.clone()),
                StateSink::native(&state_path),
            ),
        };

        let state = Dispatcher::default().execute(&context).await.unwrap();
        assert_eq!(state, present());
        assert!(state_path.exists());
    }
}
