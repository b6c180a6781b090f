//! Schema loader for reading schema configs from disk
//!
//! - One JSON file per schema: `<dir>/<name>.json`
//! - The file stem is the schema name
//! - Malformed files abort the load
//! - A missing directory loads nothing

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::cast::{IdentityCaster, TypeCaster};
use super::config::SchemaConfig;
use super::registry::Schema;
use super::errors::{SchemaError, SchemaResult};
use crate::observability::{Event, Logger};

/// Reads schema files from a directory and keeps them by name.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by name
    schemas: BTreeMap<String, Schema>,
    /// Caster handed to every loaded schema
    caster: Arc<dyn TypeCaster>,
    /// Lock schemas as they are loaded
    lock_on_load: bool,
}

impl SchemaLoader {
    /// Creates a loader for `schema_dir`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: BTreeMap::new(),
            caster: Arc::new(IdentityCaster),
            lock_on_load: false,
        }
    }

    /// Sets the caster shared by every schema loaded afterwards.
    pub fn with_caster<C: TypeCaster + 'static>(mut self, caster: C) -> Self {
        self.caster = Arc::new(caster);
        self
    }

    /// Locks each schema once it is loaded from disk.
    pub fn lock_on_load(mut self, lock: bool) -> Self {
        self.lock_on_load = lock;
        self
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory, in file name order.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let dir = self.schema_dir.display().to_string();
        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_config(&dir, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_config(&dir, format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_file(&path)?;
        }
        Ok(())
    }

    /// Loads a single schema file and registers it under its file stem.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<&Schema> {
        let source = path.display().to_string();
        let result = self.read_file(path, &source);

        let schema = match result {
            Ok(schema) => schema,
            Err(e) => {
                let reason = e.to_string();
                Logger::event(
                    Event::LoadFailed,
                    &[("path", source.as_str()), ("reason", reason.as_str())],
                );
                return Err(e);
            }
        };

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| SchemaError::malformed_config(&source, "File has no name"))?;

        Logger::event(
            Event::FileLoaded,
            &[("path", source.as_str()), ("schema", name.as_str())],
        );
        self.register(name, schema)
    }

    fn read_file(&self, path: &Path, source: &str) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed_config(source, format!("Failed to read file: {}", e)))?;
        let config = SchemaConfig::from_json_str(source, &content)?;

        let mut schema = Schema::new(config).with_shared_caster(Arc::clone(&self.caster));
        if self.lock_on_load {
            schema.lock();
        }
        Ok(schema)
    }

    /// Registers a schema under `name`; a name can only be registered once.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema) -> SchemaResult<&Schema> {
        let name = name.into();
        match self.schemas.entry(name) {
            std::collections::btree_map::Entry::Occupied(slot) => {
                Err(SchemaError::duplicate(slot.key().clone()))
            }
            std::collections::btree_map::Entry::Vacant(slot) => Ok(slot.insert(schema)),
        }
    }

    /// Gets a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Checks if a schema exists.
    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns loaded schema names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Writes a schema to `<dir>/<name>.json`, refusing to replace a file.
    pub fn save_schema(&self, name: &str, schema: &Schema) -> SchemaResult<PathBuf> {
        let path = self.schema_dir.join(format!("{}.json", name));
        let source = path.display().to_string();

        if path.exists() {
            return Err(SchemaError::duplicate(name));
        }

        if !self.schema_dir.exists() {
            fs::create_dir_all(&self.schema_dir).map_err(|e| {
                SchemaError::malformed_config(
                    self.schema_dir.display().to_string(),
                    format!("Failed to create schema directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(schema)
            .map_err(|e| SchemaError::malformed_config(&source, format!("Failed to serialize schema: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| SchemaError::malformed_config(&source, format!("Failed to write file: {}", e)))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CastOptions, DocumentCaster};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_schema() -> Schema {
        Schema::new(
            SchemaConfig::new()
                .field("_id", "id")
                .field("name", "string")
                .meta("source", "users"),
        )
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("users", sample_schema()).unwrap();

        let schema = loader.get("users").unwrap();
        assert_eq!(schema.names(), vec!["_id", "name"]);
    }

    #[test]
    fn test_duplicate_registration() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("users", sample_schema()).unwrap();

        let result = loader.register("users", sample_schema());
        assert_eq!(result.unwrap_err().code().code(), "SCHEMA_DUPLICATE");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());

        let schema = sample_schema();
        loader.save_schema("users", &schema).unwrap();

        let mut loader2 = SchemaLoader::new(temp_dir.path());
        loader2.load_all().unwrap();

        assert!(loader2.exists("users"));
        assert_eq!(loader2.get("users"), Some(&schema));
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());
        loader.save_schema("users", &sample_schema()).unwrap();
        assert!(loader.save_schema("users", &sample_schema()).is_err());
    }

    #[test]
    fn test_load_skips_non_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(temp_dir.path().join("posts.json"), r#"{"fields": {"title": "string"}}"#).unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        assert_eq!(loader.names(), vec!["posts"]);
    }

    #[test]
    fn test_malformed_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{\"fields\": ").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert_eq!(err.code().code(), "SCHEMA_MALFORMED_CONFIG");
    }

    #[test]
    fn test_missing_directory_loads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(&temp_dir.path().join("absent"));

        assert!(loader.load_all().is_ok());
        assert_eq!(loader.schema_count(), 0);
    }

    #[test]
    fn test_loaded_schemas_share_caster_and_lock() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("users.json"), r#"{"fields": {"age": "integer"}}"#).unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path())
            .with_caster(DocumentCaster)
            .lock_on_load(true);
        loader.load_all().unwrap();

        let schema = loader.get("users").unwrap();
        assert!(schema.is_locked());
        assert_eq!(schema.caster().name(), "document");
        let out = schema
            .cast(Some("User"), Some("age"), json!("5"), &CastOptions::default())
            .unwrap();
        assert_eq!(out, json!(5));
    }
}
