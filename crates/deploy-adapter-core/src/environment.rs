//! Invocation environment.
//!
//! The environment is captured once per process by the binary and passed
//! down explicitly; library code never reads the process environment.

use std::collections::BTreeMap;

use crate::error::{AdapterError, Result};

/// Environment key holding the token signing secret.
pub const ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";

/// Environment key holding the remote API host.
pub const DEPLOY_ENDPOINT: &str = "DEPLOY_ENDPOINT";

/// Environment key overriding the URL scheme used to reach the API.
pub const DEPLOY_SCHEME: &str = "DEPLOY_SCHEME";

/// Immutable string-to-string configuration for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Build an environment from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a value if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Get a required value.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::MissingConfiguration` if the key is absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| AdapterError::MissingConfiguration(key.to_string()))
    }

    /// Get a required comma-separated list.
    ///
    /// An empty string yields an empty list; entries are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::MissingConfiguration` if the key is absent.
    pub fn require_list(&self, key: &str) -> Result<Vec<String>> {
        let raw = self.require(key)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        Ok(raw.split(',').map(str::to_string).collect())
    }

    /// Returns true only if the key holds the literal `"true"`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Returns the first key in `keys` that is absent, if any.
    #[must_use]
    pub fn first_missing<'a>(&self, keys: &[&'a str]) -> Option<&'a str> {
        keys.iter().copied().find(|key| !self.vars.contains_key(*key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
