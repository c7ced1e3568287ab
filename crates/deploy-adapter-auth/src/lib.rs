//! JWT-authenticated API sessions for the deploy resource adapter.
//!
//! This crate provides the session layer used by resource handlers to reach
//! the remote deploy API:
//!
//! - HS256 token signing with fixed identity claims
//! - A `reqwest` client that presents the token as a `jwt` cookie
//! - The `ApiSession` trait, so handlers can be driven by a test double
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Resource       │────▶│   ApiSession     │
//! │   handler        │     │   (trait)        │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │  AuthSession     │
//!                          │  (token+client)  │
//!                          └────────┬─────────┘
//!                                   │ HTTPS, cookie jwt=<token>
//!                          ┌────────▼─────────┐
//!                          │  Deploy API      │
//!                          │  /api/<resource> │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use deploy_adapter_auth::{ApiSession, AuthSession, SessionConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new("secret", "deploy.example.com", "/pipeline");
//! let session = AuthSession::new(config)?;
//!
//! let created = session.post(&json!({"name": "p1"})).await?;
//! println!("created {}", created["id"]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod session;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{Result, SessionError};
pub use session::{ApiSession, AuthSession};
pub use token::{sign_token, DeployClaims};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{HttpMethod, MockSession, RecordedCall};

use deploy_adapter_core::environment::{DEPLOY_ENDPOINT, DEPLOY_SCHEME, ENCRYPTION_KEY};
use deploy_adapter_core::Environment;

/// Configuration for one API session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret used to sign the session token.
    pub secret: String,
    /// Remote API host (e.g., `deploy.example.com`), also the token issuer.
    pub host: String,
    /// Resource path prefix under `/api` (e.g., `/pipeline`).
    pub resource_path: String,
    /// URL scheme, `https` unless overridden.
    pub scheme: String,
}

impl SessionConfig {
    /// Create a configuration targeting `https://{host}/api{resource_path}`.
    pub fn new(
        secret: impl Into<String>,
        host: impl Into<String>,
        resource_path: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            host: host.into(),
            resource_path: resource_path.into(),
            scheme: Self::default_scheme(),
        }
    }

    /// Read `ENCRYPTION_KEY`, `DEPLOY_ENDPOINT` and the optional
    /// `DEPLOY_SCHEME` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::MissingConfiguration` if a required key is absent.
    pub fn from_environment(
        env: &Environment,
        resource_path: &str,
    ) -> deploy_adapter_core::Result<Self> {
        let config = Self::new(
            env.require(ENCRYPTION_KEY)?,
            env.require(DEPLOY_ENDPOINT)?,
            resource_path,
        );
        Ok(match env.get(DEPLOY_SCHEME) {
            Some(scheme) if !scheme.is_empty() => config.with_scheme(scheme),
            _ => config,
        })
    }

    /// Override the URL scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Get the resource base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}/api{}", self.scheme, self.host, self.resource_path)
    }

    /// Get the token issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.host
    }

    fn default_scheme() -> String {
        "https".to_string()
    }
}
