//! Document Casting Tests
//!
//! Tests for the document-store caster driven through a schema:
//! - Whole-record casts keep only the supplied keys
//! - Array fields wrap scalar ids
//! - Empty values are never coerced
//! - A shared caster serves many schemas

use std::sync::Arc;

use docschema::schema::{
    CastOptions, DocumentCaster, FieldDef, Schema, SchemaConfig, SchemaError, TypeCaster,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

const USER_ID: &str = "4c3628558ead0e594f000000";

fn id_schema() -> Schema {
    Schema::new(
        SchemaConfig::new()
            .field("_id", FieldDef::of_type("id"))
            .field("users", FieldDef::of_type("id").array()),
    )
    .with_caster(DocumentCaster)
}

fn record(raw: Value) -> Result<Value, SchemaError> {
    id_schema().cast(None, None, raw, &CastOptions::default())
}

// =============================================================================
// Record Casting Tests
// =============================================================================

/// Casting a record with one id-array member yields one key with one id.
#[test]
fn test_casting_id_array() {
    let result = record(json!({"users": USER_ID})).unwrap();

    let obj = result.as_object().unwrap();
    assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["users"]);

    let users = obj["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0], json!(USER_ID));
}

/// A null record and null members pass through.
#[test]
fn test_casting_empty_values() {
    assert_eq!(record(Value::Null).unwrap(), Value::Null);
    assert_eq!(
        record(json!({"_id": null, "users": null})).unwrap(),
        json!({"_id": null, "users": null})
    );
}

/// Empty id lists stay empty.
#[test]
fn test_casting_empty_array() {
    assert_eq!(record(json!({"users": []})).unwrap(), json!({"users": []}));
}

/// One bad member fails the whole record.
#[test]
fn test_bad_member_fails_record() {
    let err = record(json!({"_id": USER_ID, "users": ["nope"]})).unwrap_err();
    match err {
        SchemaError::CastFailed { field, expected, .. } => {
            assert_eq!(field, "users");
            assert_eq!(expected, "object id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Members not declared in the schema are returned untouched.
#[test]
fn test_undeclared_members_untouched() {
    let out = record(json!({"extra": {"any": [1, "two"]}})).unwrap();
    assert_eq!(out, json!({"extra": {"any": [1, "two"]}}));
}

// =============================================================================
// Shared Caster Tests
// =============================================================================

/// One caster instance can back several schemas.
#[test]
fn test_shared_caster() {
    let caster: Arc<dyn TypeCaster> = Arc::new(DocumentCaster);

    let users = Schema::new(SchemaConfig::new().field("age", "integer"))
        .with_shared_caster(Arc::clone(&caster));
    let posts = Schema::new(SchemaConfig::new().field("published", "boolean"))
        .with_shared_caster(Arc::clone(&caster));

    let opts = CastOptions::default();
    assert_eq!(users.cast(None, Some("age"), json!("40"), &opts).unwrap(), json!(40));
    assert_eq!(
        posts.cast(None, Some("published"), json!(0), &opts).unwrap(),
        json!(false)
    );
}

/// A locked schema is still castable and can be shared across threads.
#[test]
fn test_locked_schema_shared_across_threads() {
    let mut schema = id_schema();
    schema.lock();
    let schema = Arc::new(schema);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let schema = Arc::clone(&schema);
            std::thread::spawn(move || {
                schema
                    .cast(None, Some("users"), json!(USER_ID), &CastOptions::default())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), json!([USER_ID]));
    }
}
