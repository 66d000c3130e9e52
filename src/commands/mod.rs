//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An [`Execute`] implementation producing an [`Outputable`] result

mod query;
mod record;
mod replay;

pub use query::QueryCmd;
pub use record::{RecordCmd, RecordResult};
pub use replay::ReplayCmd;

use clap::Subcommand;
use std::error::Error;

use crate::cursor::RowCursor;
use crate::db::DatabaseConfig;
use crate::output::{OutputFormat, Outputable, RowSet};
use crate::value::{RawRow, Value};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, database: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a statement on the database and print the rows it returns
    Query(QueryCmd),

    /// Run a query and record the fetched rows to a CSV file
    Record(RecordCmd),

    /// Replay a recorded CSV file through a mock connection
    Replay(ReplayCmd),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, database: &DatabaseConfig, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Query(cmd) => {
                let result = cmd.execute(database)?;
                Ok(result.format(format))
            }
            Command::Record(cmd) => {
                let result = cmd.execute(database)?;
                Ok(result.format(format))
            }
            Command::Replay(cmd) => {
                let result = cmd.execute(database)?;
                Ok(result.format(format))
            }
        }
    }
}

/// Parse a `--param` value: empty is `NULL`, then integer, float, text.
pub fn parse_param(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::Text(raw.to_string())
    }
}

/// Drain `cursor` into a [`RowSet`].
pub(crate) fn collect_rows<C: RowCursor<Row = RawRow>>(cursor: &mut C) -> crate::Result<RowSet> {
    let rows = cursor.fetchall()?;
    Ok(RowSet {
        columns: cursor.description().unwrap_or_default(),
        rows,
        rowcount: cursor.rowcount(),
    })
}
