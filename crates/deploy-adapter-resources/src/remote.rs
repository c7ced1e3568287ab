//! Shared request/reduce logic for resources backed by one API collection.
//!
//! State reduction differs by operation:
//!
//! - `create` keeps the outgoing payload and adds the `id` the API assigned
//! - `read` and `update` replace state with the full API response
//! - `delete` clears state whatever the API answers
//!
//! A state produced by `create` therefore need not equal the one a following
//! `read` produces; only the `id` is guaranteed to match.

use deploy_adapter_auth::{ApiSession, SessionError};
use deploy_adapter_core::{validate_transition, AdapterError, Command, Result, State};
use serde_json::{Map, Value};

/// Response fields that change on every read and are never kept in state.
pub const VOLATILE_FIELDS: &[&str] = &["creationTimestamp"];

/// A remote resource collection and the state of one member of it.
pub struct RemoteResource {
    session: Box<dyn ApiSession>,
    state: State,
}

impl RemoteResource {
    /// Wrap a session and the prior state.
    #[must_use]
    pub fn new(session: Box<dyn ApiSession>, state: State) -> Self {
        Self { session, state }
    }

    /// Borrow the current state.
    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Replace the state without contacting the API.
    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Consume into the current state.
    #[must_use]
    pub fn into_state(self) -> State {
        self.state
    }

    /// Borrow the session.
    #[must_use]
    pub fn session(&self) -> &dyn ApiSession {
        self.session.as_ref()
    }

    /// POST `payload`; state becomes `payload` plus the returned `id`.
    ///
    /// # Errors
    ///
    /// Fails if the resource is already present, the request fails, or the
    /// response carries no `id`.
    pub async fn create(&mut self, payload: Map<String, Value>) -> Result<()> {
        validate_transition(Command::Create, self.state.status())?;

        let response = self.session.post(&Value::Object(payload.clone())).await?;
        let id = response
            .get("id")
            .filter(|id| !id.is_null())
            .cloned()
            .ok_or_else(|| {
                AdapterError::ResponseParseError("create response has no id".to_string())
            })?;

        let mut state = State::from_map(payload);
        state.insert("id", id);
        tracing::info!(id = %state.id_segment().unwrap_or_default(), "Created resource");
        self.state = state;
        Ok(())
    }

    /// GET `/{id}`; state becomes the response without volatile fields.
    ///
    /// # Errors
    ///
    /// Fails if the resource is absent, the request fails, or the response
    /// is not an object with an `id`.
    pub async fn read(&mut self) -> Result<()> {
        let id = self.current_id(Command::Read)?;

        let response = self.session.get(&format!("/{id}"), &[]).await?;
        self.state = reduce_present(response)?;
        tracing::info!(id = %id, "Read resource");
        Ok(())
    }

    /// PATCH `payload` plus the current `id`; state becomes the response
    /// without volatile fields.
    ///
    /// # Errors
    ///
    /// Fails if the resource is absent, the request fails, or the response
    /// is not an object with an `id`.
    pub async fn update(&mut self, mut payload: Map<String, Value>) -> Result<()> {
        let id = self.current_id(Command::Update)?;
        if let Some(current) = self.state.id() {
            payload.insert("id".to_string(), current.clone());
        }

        let response = self.session.patch(&Value::Object(payload)).await?;
        self.state = reduce_present(response)?;
        tracing::info!(id = %id, "Updated resource");
        Ok(())
    }

    /// DELETE with the whole current state as the body; state becomes `{}`.
    ///
    /// The response body is ignored, but a failed request still leaves the
    /// state untouched.
    ///
    /// # Errors
    ///
    /// Fails if the resource is absent or the request fails.
    pub async fn delete(&mut self) -> Result<()> {
        let id = self.current_id(Command::Delete)?;

        let body = self.state.clone().into_value();
        match self.session.delete(&body).await {
            Ok(_) => {}
            Err(SessionError::ResponseParse(e)) => {
                tracing::warn!(id = %id, error = %e, "Ignoring unreadable delete response");
            }
            Err(e) => return Err(e.into()),
        }

        self.state = State::default();
        tracing::info!(id = %id, "Deleted resource");
        Ok(())
    }

    /// Check that `command` is allowed from the current state.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::InvalidStateTransition` if it is not.
    pub fn check(&self, command: Command) -> Result<()> {
        validate_transition(command, self.state.status())
    }

    fn current_id(&self, command: Command) -> Result<String> {
        self.check(command)?;
        self.state
            .id_segment()
            .ok_or(AdapterError::InvalidStateTransition {
                command,
                status: self.state.status(),
            })
    }
}

/// Strip volatile fields from an object response.
///
/// # Errors
///
/// Returns `AdapterError::ResponseParseError` if `response` is not an object.
pub fn reduce(response: Value) -> Result<State> {
    match response {
        Value::Object(mut map) => {
            for field in VOLATILE_FIELDS {
                map.remove(*field);
            }
            Ok(State::from_map(map))
        }
        other => Err(AdapterError::ResponseParseError(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// As [`reduce`], additionally requiring an `id`.
fn reduce_present(response: Value) -> Result<State> {
    let state = reduce(response)?;
    if state.id().is_none() {
        return Err(AdapterError::ResponseParseError(
            "response has no id".to_string(),
        ));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use deploy_adapter_auth::MockSession;
    use deploy_adapter_core::Status;
    use serde_json::json;

    use super::*;

    fn present() -> State {
        serde_json::from_value(json!({"id": "abc123", "name": "p1"})).unwrap()
    }

    fn payload() -> Map<String, Value> {
        json!({"name": "p1"}).as_object().cloned().unwrap()
    }

    #[test]
    fn reduce_strips_volatile_fields() {
        let state = reduce(json!({"id": "a", "creationTimestamp": "2024-01-01"})).unwrap();
        assert_eq!(state.into_value(), json!({"id": "a"}));
    }

    #[test]
    fn reduce_rejects_non_objects() {
        assert!(matches!(
            reduce(json!([1])),
            Err(AdapterError::ResponseParseError(_))
        ));
        assert!(reduce(Value::Null).is_err());
    }

    #[tokio::test]
    async fn create_without_id_keeps_state() {
        let session = MockSession::new().respond_with(json!({"name": "p1"}));
        let mut remote = RemoteResource::new(Box::new(session), State::default());

        let err = remote.create(payload()).await.unwrap_err();
        assert!(matches!(err, AdapterError::ResponseParseError(_)));
        assert!(remote.state().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_null_id() {
        let session = MockSession::new().respond_with(json!({"id": null}));
        let mut remote = RemoteResource::new(Box::new(session), State::default());
        assert!(remote.create(payload()).await.is_err());
    }

    #[tokio::test]
    async fn read_rejects_null_id_response() {
        let session = MockSession::new().respond_with(json!({"id": null, "name": "x"}));
        let mut remote = RemoteResource::new(Box::new(session), present());

        let err = remote.read().await.unwrap_err();
        assert!(matches!(err, AdapterError::ResponseParseError(_)));
        assert_eq!(remote.state(), &present());
    }

    #[tokio::test]
    async fn null_prior_id_is_absent() {
        let session = MockSession::new();
        let observer = session.clone();
        let prior: State = serde_json::from_value(json!({"id": null})).unwrap();
        let mut remote = RemoteResource::new(Box::new(session), prior);

        assert!(matches!(
            remote.read().await,
            Err(AdapterError::InvalidStateTransition {
                status: Status::Absent,
                ..
            })
        ));
        assert_eq!(observer.call_count(), 0);
    }

    #[tokio::test]
    async fn numeric_id_is_used_in_path() {
        let session = MockSession::new().respond_with(json!({"id": 7}));
        let observer = session.clone();
        let state = serde_json::from_value(json!({"id": 7})).unwrap();
        let mut remote = RemoteResource::new(Box::new(session), state);

        remote.read().await.unwrap();
        assert_eq!(observer.calls()[0].path, "/7");
        assert_eq!(remote.state().id(), Some(&json!(7)));
    }

    #[tokio::test]
    async fn update_response_without_id_keeps_state() {
        let session = MockSession::new().respond_with(json!({"name": "p2"}));
        let mut remote = RemoteResource::new(Box::new(session), present());

        assert!(remote.update(payload()).await.is_err());
        assert_eq!(remote.state(), &present());
    }

    #[tokio::test]
    async fn delete_tolerates_unreadable_body() {
        let session =
            MockSession::new().fail_with(SessionError::ResponseParse("not json".into()));
        let mut remote = RemoteResource::new(Box::new(session), present());

        remote.delete().await.unwrap();
        assert!(remote.state().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_keeps_state() {
        let session = MockSession::new().fail_with(SessionError::Status {
            status: 500,
            body: "boom".into(),
        });
        let mut remote = RemoteResource::new(Box::new(session), present());

        let err = remote.delete().await.unwrap_err();
        assert!(matches!(err, AdapterError::NetworkError(_)));
        assert_eq!(remote.state(), &present());
    }

    #[tokio::test]
    async fn transitions_checked_before_any_request() {
        let session = MockSession::new();
        let observer = session.clone();
        let mut remote = RemoteResource::new(Box::new(session), State::default());

        for result in [
            remote.read().await,
            remote.update(payload()).await,
            remote.delete().await,
        ] {
            assert!(matches!(
                result,
                Err(AdapterError::InvalidStateTransition {
                    status: Status::Absent,
                    ..
                })
            ));
        }

        remote.set_state(present());
        assert!(matches!(
            remote.create(payload()).await,
            Err(AdapterError::InvalidStateTransition {
                command: Command::Create,
                status: Status::Present
            })
        ));

        assert_eq!(observer.call_count(), 0);
    }
}
