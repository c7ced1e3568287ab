//! Session error types.

use deploy_adapter_core::AdapterError;
use thiserror::Error;

/// A result type using `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while talking to the deploy API.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Network(String),

    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, as text.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("invalid response: {0}")]
    ResponseParse(String),

    /// The session token could not be signed or encoded as a header.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<SessionError> for AdapterError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Network(_) | SessionError::Status { .. } => {
                Self::NetworkError(err.to_string())
            }
            SessionError::ResponseParse(msg) => Self::ResponseParseError(msg),
            SessionError::Signing(msg) => Self::Credential(msg),
        }
    }
}
