//! Schema error types
//!
//! Error codes:
//! - SCHEMA_LOCKED
//! - SCHEMA_CAST_FAILED
//! - SCHEMA_MALFORMED_CONFIG
//! - SCHEMA_DUPLICATE

use std::fmt;
use thiserror::Error;

/// Machine-readable schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Mutation attempted on a locked schema
    SchemaLocked,
    /// Raw value could not be coerced to the field type
    SchemaCastFailed,
    /// Schema configuration could not be read or parsed
    SchemaMalformedConfig,
    /// Schema name registered twice
    SchemaDuplicate,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaLocked => "SCHEMA_LOCKED",
            SchemaErrorCode::SchemaCastFailed => "SCHEMA_CAST_FAILED",
            SchemaErrorCode::SchemaMalformedConfig => "SCHEMA_MALFORMED_CONFIG",
            SchemaErrorCode::SchemaDuplicate => "SCHEMA_DUPLICATE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The schema is locked; `operation` names the rejected mutation
    #[error("Schema cannot be modified: {operation} rejected on locked schema")]
    Locked { operation: &'static str },

    /// A raw value did not fit the field's declared type
    #[error("Cannot cast field '{field}': expected {expected}, got {actual}")]
    CastFailed {
        field: String,
        expected: String,
        actual: String,
    },

    /// A configuration source could not be parsed
    #[error("Malformed schema config '{source_name}': {reason}")]
    MalformedConfig { source_name: String, reason: String },

    /// A schema with this name is already registered
    #[error("Schema '{name}' is already registered")]
    DuplicateSchema { name: String },
}

impl SchemaError {
    /// Create a locked error for the given operation
    pub fn locked(operation: &'static str) -> Self {
        SchemaError::Locked { operation }
    }

    /// Create a cast failure
    pub fn cast_failed(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SchemaError::CastFailed {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a malformed config error
    pub fn malformed_config(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::MalformedConfig {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate schema error
    pub fn duplicate(name: impl Into<String>) -> Self {
        SchemaError::DuplicateSchema { name: name.into() }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        match self {
            SchemaError::Locked { .. } => SchemaErrorCode::SchemaLocked,
            SchemaError::CastFailed { .. } => SchemaErrorCode::SchemaCastFailed,
            SchemaError::MalformedConfig { .. } => SchemaErrorCode::SchemaMalformedConfig,
            SchemaError::DuplicateSchema { .. } => SchemaErrorCode::SchemaDuplicate,
        }
    }

    /// Returns whether this is a lock violation
    pub fn is_locked(&self) -> bool {
        matches!(self, SchemaError::Locked { .. })
    }

    /// Field path a cast failure refers to
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::CastFailed { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
