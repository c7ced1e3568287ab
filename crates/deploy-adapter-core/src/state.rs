//! Resource state documents.
//!
//! A `State` is either empty (the resource is absent) or carries an `id`
//! plus resource-specific fields (the resource is present).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lifecycle::Status;

/// Id used by the placeholder state of a disabled resource.
pub const SENTINEL_ID: &str = "empty";

/// Last-known remote representation of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    /// The placeholder state of a disabled resource: `{"id": "empty"}`.
    #[must_use]
    pub fn sentinel() -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(SENTINEL_ID.to_string()));
        Self(map)
    }

    /// Wrap an existing JSON object.
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the `id` value, if any. A null `id` counts as none.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|id| !id.is_null())
    }

    /// Returns the `id` rendered for use in a URL path.
    ///
    /// String ids are used verbatim; any other JSON value uses its JSON text.
    #[must_use]
    pub fn id_segment(&self) -> Option<String> {
        self.id().map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Returns whether the resource is present.
    #[must_use]
    pub fn status(&self) -> Status {
        if self.id().is_some() {
            Status::Present
        } else {
            Status::Absent
        }
    }

    /// Returns true if no fields are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
