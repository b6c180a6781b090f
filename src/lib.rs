//! docschema - schema definitions for a document data mapper
//!
//! Field metadata, type aliases, lock semantics and pluggable value casting
//! for persisted entity types.

pub mod cli;
pub mod observability;
pub mod schema;
