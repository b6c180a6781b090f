//! CLI command implementations
//!
//! Each command loads one schema file, performs a read-only query or a
//! cast, and returns the JSON payload written to stdout.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::observability::{Logger, Severity};
use crate::schema::{CastOptions, DocumentCaster, Schema, SchemaConfig};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse args, run the command and write the response.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Info);
    }

    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Fields { schema, name } => fields(&schema, name.as_deref()),
        Command::Defaults { schema } => defaults(&schema),
        Command::Cast {
            schema,
            field,
            value,
        } => cast(&schema, field.as_deref(), &value),
    }
}

/// Print every field definition, or one.
pub fn fields(schema_path: &Path, name: Option<&str>) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    match name {
        None => Ok(serde_json::to_value(schema.fields())?),
        Some(name) => {
            let def = schema
                .field(name)
                .ok_or_else(|| CliError::input_error(format!("Unknown field '{}'", name)))?;
            Ok(serde_json::to_value(def)?)
        }
    }
}

/// Print the declared defaults.
pub fn defaults(schema_path: &Path) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    Ok(serde_json::to_value(schema.defaults())?)
}

/// Cast a raw JSON value for one field, or for a whole record.
pub fn cast(schema_path: &Path, field: Option<&str>, raw: &str) -> CliResult<Value> {
    let schema = load_schema(schema_path)?;
    let raw: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::input_error(format!("Value is not valid JSON: {}", e)))?;

    let cast = schema.cast(None, field, raw, &CastOptions::default())?;
    Ok(cast)
}

fn load_schema(path: &Path) -> CliResult<Schema> {
    let source = path.display().to_string();
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::input_error(format!("Cannot read '{}': {}", source, e)))?;
    let config = SchemaConfig::from_json_str(&source, &content)?;

    let mut schema = Schema::new(config).with_caster(DocumentCaster);
    schema.lock();
    Ok(schema)
}
