//! CLI argument definitions using clap
//!
//! Commands:
//! - docschema fields --schema <path> [--name <field>]
//! - docschema defaults --schema <path>
//! - docschema cast --schema <path> --value <json> [--field <name>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docschema - inspect schema definitions and cast raw values
#[derive(Parser, Debug)]
#[command(name = "docschema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit schema log events at INFO and above
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print field definitions
    Fields {
        /// Path to schema file
        #[arg(long)]
        schema: PathBuf,

        /// Print only this field
        #[arg(long)]
        name: Option<String>,
    },

    /// Print declared defaults
    Defaults {
        /// Path to schema file
        #[arg(long)]
        schema: PathBuf,
    },

    /// Cast a raw JSON value with the document caster
    Cast {
        /// Path to schema file
        #[arg(long)]
        schema: PathBuf,

        /// Field to cast; omit to cast a whole record
        #[arg(long)]
        field: Option<String>,

        /// Raw value as JSON
        #[arg(long)]
        value: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
