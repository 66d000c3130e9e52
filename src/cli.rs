//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;

use crate::commands::Command;
use crate::db::DatabaseConfig;
use crate::error::Result;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database URL: a file path, `:memory:`, `sqlite://PATH` or `postgres://...`.
    /// Defaults to .typed_sql.json, then TYPED_SQL_DATABASE_URL, then ./typed_sql.sqlite
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// The database selected by `--database`, or the resolved default.
    pub fn database_config(&self) -> Result<DatabaseConfig> {
        match &self.database {
            Some(url) => DatabaseConfig::from_url(url),
            None => DatabaseConfig::resolve(),
        }
    }
}
