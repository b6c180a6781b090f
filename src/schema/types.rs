//! Field definition types
//!
//! A field can be declared three ways:
//! - bare type string: `"string"`
//! - positional list: `["id", {"array": true}]`
//! - keyed attribute map: `{"type": "string", "default": ""}`
//!
//! All three normalize into a single canonical [`FieldDef`].

use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;

/// Dynamic value used for defaults, meta entries and cast input/output.
pub type Value = serde_json::Value;

/// Attribute key holding the declared type.
pub const TYPE_KEY: &str = "type";
/// Attribute key marking a collection-valued field.
pub const ARRAY_KEY: &str = "array";
/// Attribute key holding the default value.
pub const DEFAULT_KEY: &str = "default";
/// Keyed form of a positional type entry.
const POSITIONAL_KEY: &str = "0";

/// Raw field definition as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// Bare type name
    Type(String),
    /// Type name in position 0, attribute objects after it; any other
    /// element is kept under its index
    Positional(Vec<Value>),
    /// Attribute map
    Keyed(Map<String, Value>),
}

impl FieldSpec {
    /// Normalizes the raw spec into a canonical definition.
    pub fn normalize(self) -> FieldDef {
        match self {
            FieldSpec::Type(field_type) => FieldDef::of_type(field_type),
            FieldSpec::Positional(items) => {
                let mut attrs = Map::new();
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(obj) if index > 0 => attrs.extend(obj),
                        other => {
                            attrs.insert(index.to_string(), other);
                        }
                    }
                }
                FieldSpec::Keyed(attrs).normalize()
            }
            FieldSpec::Keyed(mut attrs) => {
                if !attrs.contains_key(TYPE_KEY) {
                    if let Some(positional) = attrs.remove(POSITIONAL_KEY) {
                        attrs.insert(TYPE_KEY.to_string(), positional);
                    }
                }
                FieldDef::from_attrs(attrs)
            }
        }
    }
}

impl From<&str> for FieldSpec {
    fn from(field_type: &str) -> Self {
        FieldSpec::Type(field_type.to_string())
    }
}

impl From<String> for FieldSpec {
    fn from(field_type: String) -> Self {
        FieldSpec::Type(field_type)
    }
}

impl From<FieldDef> for FieldSpec {
    fn from(def: FieldDef) -> Self {
        FieldSpec::Keyed(def.to_attrs())
    }
}

/// Canonical field definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Declared semantic type, e.g. `"string"` or `"id"`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Declared collection flag, kept as written; see [`FieldDef::is_array`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<Value>,
    /// Default value; `null` is treated as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Any other attribute, kept as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FieldDef {
    /// Definition carrying only a type.
    pub fn of_type(field_type: impl Into<String>) -> Self {
        Self {
            field_type: Some(field_type.into()),
            ..Self::default()
        }
    }

    /// Marks the field as collection-valued.
    pub fn array(mut self) -> Self {
        self.array = Some(Value::Bool(true));
        self
    }

    /// Whether the field holds a collection.
    pub fn is_array(&self) -> bool {
        self.array.as_ref().is_some_and(is_truthy)
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Adds an opaque attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Builds a definition from an attribute map.
    ///
    /// A non-string `type` is kept among the extras rather than dropped.
    pub fn from_attrs(attrs: Map<String, Value>) -> Self {
        let mut def = FieldDef::default();
        for (key, value) in attrs {
            match key.as_str() {
                TYPE_KEY => match value {
                    Value::String(t) => def.field_type = Some(t),
                    other => {
                        def.extra.insert(key, other);
                    }
                },
                ARRAY_KEY => def.array = Some(value),
                DEFAULT_KEY => {
                    if !value.is_null() {
                        def.default = Some(value);
                    }
                }
                _ => {
                    def.extra.insert(key, value);
                }
            }
        }
        def
    }

    /// Flattens the definition back into an attribute map.
    pub fn to_attrs(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        if let Some(t) = &self.field_type {
            attrs.insert(TYPE_KEY.to_string(), Value::String(t.clone()));
        }
        if let Some(array) = &self.array {
            attrs.insert(ARRAY_KEY.to_string(), array.clone());
        }
        if let Some(default) = &self.default {
            attrs.insert(DEFAULT_KEY.to_string(), default.clone());
        }
        for (key, value) in &self.extra {
            attrs.insert(key.clone(), value.clone());
        }
        attrs
    }

    /// Looks up a single attribute by name.
    pub fn attr(&self, key: &str) -> Option<Value> {
        match key {
            TYPE_KEY => self.field_type.clone().map(Value::String),
            ARRAY_KEY => self.array.clone(),
            DEFAULT_KEY => self.default.clone(),
            _ => self.extra.get(key).cloned(),
        }
    }
}

/// Loose truthiness used for attribute flags.
///
/// `null`, `false`, `0`, `0.0`, `""`, `"0"`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> FieldSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_bare_string_normalizes_to_type() {
        let def = spec(json!("string")).normalize();
        assert_eq!(def, FieldDef::of_type("string"));
    }

    #[test]
    fn test_positional_list_moves_head_into_type() {
        let def = spec(json!(["id", {"array": true, "length": 12}])).normalize();
        assert_eq!(def.field_type.as_deref(), Some("id"));
        assert!(def.is_array());
        assert_eq!(def.extra.get("length"), Some(&json!(12)));
    }

    #[test]
    fn test_positional_list_explicit_type_wins() {
        let def = spec(json!(["id", {"type": "string"}])).normalize();
        assert_eq!(def.field_type.as_deref(), Some("string"));
        assert_eq!(def.extra.get("0"), Some(&json!("id")));
        assert_eq!(def, spec(json!({"0": "id", "type": "string"})).normalize());
    }

    #[test]
    fn test_positional_list_keeps_scalar_elements() {
        let def = spec(json!(["integer", "unsigned"])).normalize();
        assert_eq!(def.field_type.as_deref(), Some("integer"));
        assert_eq!(def.extra.get("1"), Some(&json!("unsigned")));

        let def = spec(json!([7, {"null": true}])).normalize();
        assert_eq!(def.field_type, None);
        assert_eq!(def.extra.get("type"), Some(&json!(7)));
        assert_eq!(def.extra.get("null"), Some(&json!(true)));
    }

    #[test]
    fn test_keyed_positional_entry() {
        let def = spec(json!({"0": "integer", "default": 3})).normalize();
        assert_eq!(def.field_type.as_deref(), Some("integer"));
        assert_eq!(def.default, Some(json!(3)));
        assert!(!def.extra.contains_key("0"));
    }

    #[test]
    fn test_keyed_positional_entry_ignored_when_type_present() {
        let def = spec(json!({"0": "integer", "type": "float"})).normalize();
        assert_eq!(def.field_type.as_deref(), Some("float"));
        assert_eq!(def.extra.get("0"), Some(&json!("integer")));
    }

    #[test]
    fn test_null_default_is_absent() {
        let def = spec(json!({"type": "string", "default": null})).normalize();
        assert_eq!(def.default, None);
        assert_eq!(def.attr("default"), None);
    }

    #[test]
    fn test_attr_lookup() {
        let def = FieldDef::of_type("string")
            .with_default("x")
            .with_attr("length", 10);
        assert_eq!(def.attr("type"), Some(json!("string")));
        assert_eq!(def.attr("default"), Some(json!("x")));
        assert_eq!(def.attr("length"), Some(json!(10)));
        assert_eq!(def.attr("array"), None);
        assert_eq!(def.attr("missing"), None);
    }

    #[test]
    fn test_serialize_skips_unset_attrs() {
        let def = FieldDef::of_type("id").array();
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value, json!({"type": "id", "array": true}));
    }

    #[test]
    fn test_array_flag_keeps_declared_value() {
        let def = spec(json!({"type": "id", "array": false})).normalize();
        assert!(!def.is_array());
        assert_eq!(def.attr("array"), Some(json!(false)));
        assert_eq!(def.to_attrs().get("array"), Some(&json!(false)));

        let def = spec(json!(["id", {"array": "yes"}])).normalize();
        assert!(def.is_array());
        assert_eq!(def.attr("array"), Some(json!("yes")));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
