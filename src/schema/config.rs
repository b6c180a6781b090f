//! Schema construction bag
//!
//! JSON form:
//!
//! ```json
//! {
//!   "fields": { "_id": "id", "tags": ["string", {"array": true}] },
//!   "meta": { "source": "users" },
//!   "locked": false,
//!   "types": { "id": "ObjectId" }
//! }
//! ```
//!
//! Every key is optional.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldSpec, Value};

/// Configuration used to build a [`Schema`](super::Schema).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Raw field definitions in declaration order
    pub fields: IndexMap<String, FieldSpec>,
    /// Schema-level metadata
    pub meta: IndexMap<String, Value>,
    /// Whether the schema starts locked
    pub locked: bool,
    /// Abstract type name to concrete type name
    pub types: HashMap<String, String>,
}

impl SchemaConfig {
    /// Creates an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON text.
    pub fn from_json_str(source_name: &str, json: &str) -> SchemaResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed_config(source_name, format!("Invalid JSON: {}", e)))
    }

    /// Parses a config from an already-decoded JSON value.
    pub fn from_value(source_name: &str, value: Value) -> SchemaResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| SchemaError::malformed_config(source_name, e.to_string()))
    }

    /// Adds a field; a repeated name replaces the earlier entry in place.
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.fields.insert(name.into(), spec.into());
        self
    }

    /// Adds a meta entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Adds a type alias.
    pub fn alias(mut self, abstract_type: impl Into<String>, concrete: impl Into<String>) -> Self {
        self.types.insert(abstract_type.into(), concrete.into());
        self
    }

    /// Sets the initial lock flag.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_config() {
        let config = SchemaConfig::from_json_str(
            "inline",
            r#"{
                "fields": {"_id": "id", "name": {"type": "string"}, "tags": ["string", {"array": true}]},
                "meta": {"source": "users"},
                "locked": true,
                "types": {"id": "ObjectId"}
            }"#,
        )
        .unwrap();

        let names: Vec<_> = config.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["_id", "name", "tags"]);
        assert_eq!(config.meta.get("source"), Some(&json!("users")));
        assert!(config.locked);
        assert_eq!(config.types.get("id").map(String::as_str), Some("ObjectId"));
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = SchemaConfig::from_json_str("inline", "{}").unwrap();
        assert_eq!(config, SchemaConfig::default());
    }

    #[test]
    fn test_duplicate_json_key_last_wins() {
        let config =
            SchemaConfig::from_json_str("inline", r#"{"fields": {"a": "string", "a": "integer"}}"#)
                .unwrap();
        assert_eq!(config.fields.len(), 1);
        assert_eq!(config.fields["a"], FieldSpec::from("integer"));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = SchemaConfig::from_json_str("broken.json", "{not json").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedConfig { ref source_name, .. } if source_name == "broken.json"));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let err = SchemaConfig::from_value("inline", json!({"feilds": {}})).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedConfig { .. }));
    }

    #[test]
    fn test_builder() {
        let config = SchemaConfig::new()
            .field("_id", "id")
            .meta("source", "posts")
            .alias("id", "ObjectId")
            .locked(true);
        assert_eq!(config.fields.len(), 1);
        assert!(config.locked);
    }
}
