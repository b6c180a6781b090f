//! Schema subsystem
//!
//! A [`Schema`] describes the fields of one persisted entity type: their
//! declared types, collection-ness, defaults and opaque extra attributes,
//! plus schema-level metadata and a type alias table. A data mapper queries
//! it while reading and writing records and calls [`Schema::cast`] to turn
//! raw persisted values into application values.
//!
//! # Design Principles
//!
//! - Field definitions are normalized once, at construction
//! - Declaration order is preserved
//! - Lock is one-way; a locked schema rejects every structural mutation
//! - Casting is a pluggable [`TypeCaster`], identity by default

mod cast;
mod config;
mod document;
mod errors;
mod loader;
mod registry;
mod types;

pub use cast::{CastOptions, IdentityCaster, TypeCaster};
pub use config::SchemaConfig;
pub use document::DocumentCaster;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub use registry::{FieldQuery, Schema};
pub use types::{is_truthy, FieldDef, FieldSpec, Value, ARRAY_KEY, DEFAULT_KEY, TYPE_KEY};
