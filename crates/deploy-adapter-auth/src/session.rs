//! Authenticated HTTP session for one resource path.
//!
//! A session signs its token once at construction and presents it on every
//! request; it is never renegotiated.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::{Result, SessionError};
use crate::token::sign_token;
use crate::SessionConfig;

/// Trait for talking to one resource collection of the deploy API.
///
/// This trait abstracts the HTTP session, allowing resource handlers to be
/// driven by a recording double in tests.
#[async_trait]
pub trait ApiSession: Send + Sync {
    /// `GET {base}{path}?{query}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-2xx status, or the body is not JSON.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value>;

    /// `POST {base}` with a JSON body.
    ///
    /// # Errors
    ///
    /// As for [`ApiSession::get`].
    async fn post(&self, body: &Value) -> Result<Value>;

    /// `PATCH {base}` with a JSON body.
    ///
    /// # Errors
    ///
    /// As for [`ApiSession::get`].
    async fn patch(&self, body: &Value) -> Result<Value>;

    /// `DELETE {base}` with a JSON body.
    ///
    /// # Errors
    ///
    /// As for [`ApiSession::get`].
    async fn delete(&self, body: &Value) -> Result<Value>;
}

/// Session bound to one host and one resource path prefix.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: Client,
    base_url: String,
    token: String,
}

impl AuthSession {
    /// Sign a token and build a client that presents it.
    ///
    /// No request timeout is configured.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Signing` if the token cannot be produced, or
    /// `SessionError::Network` if the HTTP client cannot be built.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let token = sign_token(&config.secret, config.issuer())?;

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("jwt={token}"))
                .map_err(|e| SessionError::Signing(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SessionError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.base_url();
        tracing::debug!(base_url = %base_url, "Created API session");

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Get the resource base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the signed session token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request and decode its JSON body.
    ///
    /// An empty 2xx body decodes to `null`.
    async fn execute(&self, request: RequestBuilder, method: &str, url: &str) -> Result<Value> {
        tracing::debug!(method, url, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Network(format!("{method} {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(method, url, status = %status, body = %body, "Request rejected");
            return Err(SessionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SessionError::Network(format!("{method} {url}: {e}")))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| SessionError::ResponseParse(e.to_string()))
    }
}

#[async_trait]
impl ApiSession for AuthSession {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(request, "GET", &url).await
    }

    async fn post(&self, body: &Value) -> Result<Value> {
        let request = self.client.post(&self.base_url).json(body);
        self.execute(request, "POST", &self.base_url).await
    }

    async fn patch(&self, body: &Value) -> Result<Value> {
        let request = self.client.patch(&self.base_url).json(body);
        self.execute(request, "PATCH", &self.base_url).await
    }

    async fn delete(&self, body: &Value) -> Result<Value> {
        let request = self.client.delete(&self.base_url).json(body);
        self.execute(request, "DELETE", &self.base_url).await
    }
}
