//! Cast contract between a schema and its persistence backend
//!
//! A backend converts raw persisted values into application values by
//! implementing [`TypeCaster`]. The base schema uses [`IdentityCaster`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::registry::Schema;
use super::errors::SchemaResult;
use super::types::Value;

/// Options passed through to a caster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastOptions {
    /// Dotted prefix of the value being cast, for nested records
    pub path_key: Option<String>,
    /// Backend-specific options
    pub extra: BTreeMap<String, Value>,
}

impl CastOptions {
    /// Options rooted at `path_key`.
    pub fn at_path(path_key: impl Into<String>) -> Self {
        Self {
            path_key: Some(path_key.into()),
            ..Self::default()
        }
    }

    /// Joins `key` onto the current path.
    pub fn qualify(&self, key: &str) -> String {
        match &self.path_key {
            Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key),
            _ => key.to_string(),
        }
    }
}

/// Converts raw persisted values into application values.
///
/// Implementations dispatch on `schema.field_type(key)`.
pub trait TypeCaster: fmt::Debug + Send + Sync {
    /// Casts `raw` for field `key` on behalf of `owner`.
    ///
    /// `key == None` means `raw` is a whole record.
    fn cast(
        &self,
        schema: &Schema,
        owner: Option<&str>,
        key: Option<&str>,
        raw: Value,
        options: &CastOptions,
    ) -> SchemaResult<Value>;

    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Returns every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCaster;

impl TypeCaster for IdentityCaster {
    fn cast(
        &self,
        _schema: &Schema,
        _owner: Option<&str>,
        _key: Option<&str>,
        raw: Value,
        _options: &CastOptions,
    ) -> SchemaResult<Value> {
        Ok(raw)
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
