//! Prior-state sources.

use std::io::ErrorKind;
use std::path::PathBuf;

use deploy_adapter_core::State;
use serde_json::Value;

/// Where the prior state document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSource {
    /// A JSON file on disk.
    File(PathBuf),
    /// A JSON document passed inline.
    Inline(String),
}

impl StateSource {
    /// Load the prior state.
    ///
    /// A missing file, unreadable file, invalid JSON, or a JSON document that
    /// is not an object all yield `{}` with a warning.
    #[must_use]
    pub fn load(&self) -> State {
        match self {
            Self::File(path) => match std::fs::read_to_string(path) {
                Ok(text) => parse(&text, &path.display().to_string()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(path = %path.display(), "State file not found, using empty state");
                    State::default()
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read state file, using empty state");
                    State::default()
                }
            },
            Self::Inline(text) => parse(text, "inline"),
        }
    }
}

fn parse(text: &str, origin: &str) -> State {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => {
            tracing::debug!(origin, fields = map.len(), "Loaded prior state");
            State::from_map(map)
        }
        Ok(other) => {
            tracing::warn!(origin, kind = json_kind(&other), "State is not a JSON object, using empty state");
            State::default()
        }
        Err(e) => {
            tracing::warn!(origin, error = %e, "Error reading JSON state, using empty state");
            State::default()
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = StateSource::File(dir.path().join("absent.json"));
        assert!(source.load().is_empty());
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"id\": ").unwrap();
        assert!(StateSource::File(path).load().is_empty());
    }

    #[test]
    fn empty_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "").unwrap();
        assert!(StateSource::File(path).load().is_empty());
    }

    #[test]
    fn directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StateSource::File(dir.path().to_path_buf()).load().is_empty());
    }

    #[test]
    fn inline_object_loads() {
        let state = StateSource::Inline(r#"{"id":"abc123","name":"p1"}"#.into()).load();
        assert_eq!(state.get("id"), Some(&json!("abc123")));
        assert_eq!(state.get("name"), Some(&json!("p1")));
    }

    #[test]
    fn inline_garbage_and_non_objects_are_empty() {
        assert!(StateSource::Inline("not json".into()).load().is_empty());
        assert!(StateSource::Inline("[1,2]".into()).load().is_empty());
        assert!(StateSource::Inline("null".into()).load().is_empty());
    }
}
