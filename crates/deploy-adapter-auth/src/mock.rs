//! Recording session double for tests.
//!
//! `MockSession` answers requests from a queue of canned responses and
//! records every call so tests can assert exactly which requests a handler
//! made, including that it made none.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Result, SessionError};
use crate::session::ApiSession;

/// HTTP method of a recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

/// A request observed by `MockSession`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Path below the resource prefix (empty for the collection).
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body, for methods that carry one.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockInner {
    calls: Vec<RecordedCall>,
    responses: VecDeque<Result<Value>>,
}

/// A session double that records calls and replays queued responses.
///
/// Clones share the same queue and call log, so a test can keep one clone
/// while a handler owns another. When the queue is empty, calls answer
/// `null`.
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    inner: Arc<Mutex<MockInner>>,
}

impl MockSession {
    /// Create a session with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    #[must_use]
    pub fn respond_with(self, value: Value) -> Self {
        self.inner.lock().responses.push_back(Ok(value));
        self
    }

    /// Queue a failure.
    #[must_use]
    pub fn fail_with(self, error: SessionError) -> Self {
        self.inner.lock().responses.push_back(Err(error));
        self
    }

    /// All calls observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of calls observed so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }

    fn record(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut inner = self.inner.lock();
        inner.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: body.cloned(),
        });
        inner.responses.pop_front().unwrap_or(Ok(Value::Null))
    }
}

#[async_trait]
impl ApiSession for MockSession {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.record(HttpMethod::Get, path, query, None)
    }

    async fn post(&self, body: &Value) -> Result<Value> {
        self.record(HttpMethod::Post, "", &[], Some(body))
    }

    async fn patch(&self, body: &Value) -> Result<Value> {
        self.record(HttpMethod::Patch, "", &[], Some(body))
    }

    async fn delete(&self, body: &Value) -> Result<Value> {
        self.record(HttpMethod::Delete, "", &[], Some(body))
    }
}
