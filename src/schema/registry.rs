//! Schema: field-metadata registry for one persisted entity type
//!
//! # Invariants
//!
//! - Field names are unique; declaration order is preserved
//! - `append` and `merge` never overwrite an existing field
//! - A locked schema rejects `append`, `merge`, `set` and `unset` before
//!   touching any state
//! - Field definitions are normalized once, on the way in

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::cast::{CastOptions, IdentityCaster, TypeCaster};
use super::config::SchemaConfig;
use super::errors::{SchemaError, SchemaResult};
use super::types::{is_truthy, FieldDef, FieldSpec, Value};
use crate::observability::{Event, Logger};

/// Field definitions, metadata and type aliases for one entity type.
#[derive(Clone, Serialize)]
pub struct Schema {
    fields: IndexMap<String, FieldDef>,
    meta: IndexMap<String, Value>,
    locked: bool,
    types: HashMap<String, String>,
    #[serde(skip)]
    caster: Arc<dyn TypeCaster>,
}

impl Schema {
    /// Builds a schema from its configuration, normalizing every field.
    ///
    /// The schema casts with [`IdentityCaster`] until another caster is set.
    pub fn new(config: SchemaConfig) -> Self {
        let fields: IndexMap<String, FieldDef> = config
            .fields
            .into_iter()
            .map(|(name, spec)| (name, spec.normalize()))
            .collect();

        let count = fields.len().to_string();
        Logger::event(Event::SchemaInitialized, &[("fields", count.as_str())]);

        Self {
            fields,
            meta: config.meta,
            locked: config.locked,
            types: config.types,
            caster: Arc::new(IdentityCaster),
        }
    }

    /// Parses a JSON config and builds the schema from it.
    pub fn from_json_str(source_name: &str, json: &str) -> SchemaResult<Self> {
        SchemaConfig::from_json_str(source_name, json).map(Self::new)
    }

    /// Replaces the caster used by [`Schema::cast`].
    pub fn with_caster<C: TypeCaster + 'static>(mut self, caster: C) -> Self {
        self.caster = Arc::new(caster);
        self
    }

    /// Replaces the caster with a shared one.
    pub fn with_shared_caster(mut self, caster: Arc<dyn TypeCaster>) -> Self {
        self.caster = caster;
        self
    }

    /// The caster backing [`Schema::cast`].
    pub fn caster(&self) -> &dyn TypeCaster {
        self.caster.as_ref()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All field definitions in declaration order.
    pub fn fields(&self) -> &IndexMap<String, FieldDef> {
        &self.fields
    }

    /// One field definition.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// One attribute of one field, e.g. `field_attr("tags", "array")`.
    pub fn field_attr(&self, name: &str, key: &str) -> Option<Value> {
        self.fields.get(name).and_then(|def| def.attr(key))
    }

    /// Field names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Defaults of every field that declares one.
    pub fn defaults(&self) -> IndexMap<String, Value> {
        self.fields
            .iter()
            .filter_map(|(name, def)| def.default.clone().map(|d| (name.clone(), d)))
            .collect()
    }

    /// Default of one field.
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(|def| def.default.as_ref())
    }

    /// All schema-level metadata.
    pub fn meta_map(&self) -> &IndexMap<String, Value> {
        &self.meta
    }

    /// One metadata entry.
    pub fn meta(&self, name: &str) -> Option<&Value> {
        self.meta.get(name)
    }

    /// Type alias table.
    pub fn types(&self) -> &HashMap<String, String> {
        &self.types
    }

    /// Whether a field, or every field of a list, is declared.
    ///
    /// ```
    /// use docschema::schema::{Schema, SchemaConfig};
    ///
    /// let schema = Schema::new(SchemaConfig::new().field("a", "string").field("b", "id"));
    /// assert!(schema.has("a"));
    /// assert!(schema.has(&["a", "b"]));
    /// assert!(!schema.has(&["a", "c"]));
    /// ```
    pub fn has<Q: FieldQuery + ?Sized>(&self, query: &Q) -> bool {
        query.is_declared_in(self)
    }

    /// Whether attribute `condition` of `field` is truthy.
    ///
    /// Returns `None` when the field is unknown.
    pub fn is(&self, condition: &str, field: &str) -> Option<bool> {
        self.fields
            .get(field)
            .map(|def| def.attr(condition).is_some_and(|v| is_truthy(&v)))
    }

    /// Declared type of `field`, resolved through the alias table.
    pub fn field_type(&self, field: &str) -> Option<&str> {
        let declared = self.fields.get(field)?.field_type.as_deref()?;
        Some(
            self.types
                .get(declared)
                .map(String::as_str)
                .unwrap_or(declared),
        )
    }

    /// Casts a raw persisted value for `key` through the schema's caster.
    pub fn cast(
        &self,
        owner: Option<&str>,
        key: Option<&str>,
        raw: Value,
        options: &CastOptions,
    ) -> SchemaResult<Value> {
        self.caster.cast(self, owner, key, raw, options).map_err(|e| {
            let reason = e.to_string();
            Logger::event(
                Event::CastFailed,
                &[
                    ("caster", self.caster.name()),
                    ("field", failed_field(key, &e)),
                    ("owner", owner.unwrap_or("")),
                    ("reason", reason.as_str()),
                ],
            );
            e
        })
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Whether the schema rejects mutation.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locks the schema. There is no unlock.
    pub fn lock(&mut self) {
        if !self.locked {
            self.locked = true;
            let count = self.fields.len().to_string();
            Logger::event(Event::SchemaLocked, &[("fields", count.as_str())]);
        }
    }

    /// Removes every field definition. Meta, aliases and the lock are kept.
    pub fn reset(&mut self) {
        let count = self.fields.len().to_string();
        self.fields.clear();
        Logger::event(Event::SchemaReset, &[("cleared", count.as_str())]);
    }

    /// Adds field definitions; names already present keep their definition.
    pub fn append<I, K, S>(&mut self, fields: I) -> SchemaResult<()>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<FieldSpec>,
    {
        self.ensure_unlocked("append")?;

        let mut added = 0usize;
        for (name, spec) in fields {
            if let indexmap::map::Entry::Vacant(slot) = self.fields.entry(name.into()) {
                slot.insert(spec.into().normalize());
                added += 1;
            }
        }

        let added = added.to_string();
        Logger::event(Event::FieldsAppended, &[("added", added.as_str())]);
        Ok(())
    }

    /// Adds every field of `other` not already present here.
    pub fn merge(&mut self, other: &Schema) -> SchemaResult<()> {
        self.ensure_unlocked("merge")?;

        let mut added = 0usize;
        for (name, def) in &other.fields {
            if !self.fields.contains_key(name) {
                self.fields.insert(name.clone(), def.clone());
                added += 1;
            }
        }

        let added = added.to_string();
        Logger::event(Event::SchemaMerged, &[("added", added.as_str())]);
        Ok(())
    }

    // =========================================================================
    // Indexed access
    // =========================================================================

    /// Same as [`Schema::field`].
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.field(name)
    }

    /// Writes a field definition, replacing any existing one in place.
    pub fn set(&mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> SchemaResult<()> {
        self.ensure_unlocked("set")?;
        self.fields.insert(name.into(), spec.into().normalize());
        Ok(())
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Removes a field definition, keeping the order of the others.
    pub fn unset(&mut self, name: &str) -> SchemaResult<Option<FieldDef>> {
        self.ensure_unlocked("unset")?;
        let removed = self.fields.shift_remove(name);
        if removed.is_some() {
            Logger::event(Event::FieldUnset, &[("field", name)]);
        }
        Ok(removed)
    }

    fn ensure_unlocked(&self, operation: &'static str) -> SchemaResult<()> {
        if self.locked {
            Logger::event(Event::MutationRejected, &[("operation", operation)]);
            return Err(SchemaError::locked(operation));
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(SchemaConfig::default())
    }
}

impl From<SchemaConfig> for Schema {
    fn from(config: SchemaConfig) -> Self {
        Self::new(config)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("meta", &self.meta)
            .field("locked", &self.locked)
            .field("types", &self.types)
            .field("caster", &self.caster.name())
            .finish()
    }
}

/// Equality ignores the caster.
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.meta == other.meta
            && self.locked == other.locked
            && self.types == other.types
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = (&'a String, &'a FieldDef);
    type IntoIter = indexmap::map::Iter<'a, String, FieldDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Field named in a cast failure log line. Whole-record casts have no key,
/// so the failing member is taken from the error.
fn failed_field<'a>(key: Option<&'a str>, err: &'a SchemaError) -> &'a str {
    key.or_else(|| err.field()).unwrap_or("")
}

/// A field name or a list of field names accepted by [`Schema::has`].
pub trait FieldQuery {
    /// Whether every named field is declared in `schema`.
    fn is_declared_in(&self, schema: &Schema) -> bool;
}

impl FieldQuery for str {
    fn is_declared_in(&self, schema: &Schema) -> bool {
        schema.fields.contains_key(self)
    }
}

impl FieldQuery for String {
    fn is_declared_in(&self, schema: &Schema) -> bool {
        self.as_str().is_declared_in(schema)
    }
}

impl<T: AsRef<str>> FieldQuery for [T] {
    fn is_declared_in(&self, schema: &Schema) -> bool {
        self.iter().all(|name| schema.fields.contains_key(name.as_ref()))
    }
}

impl<T: AsRef<str>, const N: usize> FieldQuery for [T; N] {
    fn is_declared_in(&self, schema: &Schema) -> bool {
        self.as_slice().is_declared_in(schema)
    }
}

impl<T: AsRef<str>> FieldQuery for Vec<T> {
    fn is_declared_in(&self, schema: &Schema) -> bool {
        self.as_slice().is_declared_in(schema)
    }
}
