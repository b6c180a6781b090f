//! CLI module for docschema
//!
//! Provides command-line interface for:
//! - fields: print field definitions
//! - defaults: print declared defaults
//! - cast: cast a raw JSON value with the document caster

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{cast, defaults, fields, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
