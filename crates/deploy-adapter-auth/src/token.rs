//! Session token signing.
//!
//! The deploy API accepts any well-signed token whose issuer is its own
//! host, so the identity claims are fixed.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Subject and display name presented by the adapter.
pub const DEPLOY_IDENTITY: &str = "deploy";

/// Email address presented by the adapter.
pub const DEPLOY_EMAIL: &str = "deploy@localhost";

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployClaims {
    /// WS-Federation name claim.
    #[serde(rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name")]
    pub name: Vec<String>,
    /// WS-Federation email claim.
    #[serde(rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress")]
    pub email: Vec<String>,
    /// Subject.
    pub sub: String,
    /// Issuer, the API host.
    pub iss: String,
}

impl DeployClaims {
    /// The fixed identity claims with the given issuer.
    #[must_use]
    pub fn for_issuer(issuer: &str) -> Self {
        Self {
            name: vec![DEPLOY_IDENTITY.to_string()],
            email: vec![DEPLOY_EMAIL.to_string()],
            sub: DEPLOY_IDENTITY.to_string(),
            iss: issuer.to_string(),
        }
    }
}

/// Sign a session token for `issuer` with the HS256 `secret`.
///
/// # Errors
///
/// Returns `SessionError::Signing` if the token cannot be encoded.
pub fn sign_token(secret: &str, issuer: &str) -> Result<String> {
    let claims = DeployClaims::for_issuer(issuer);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SessionError::Signing(e.to_string()))
}
