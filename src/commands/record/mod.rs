mod cli_tests;
mod execute;
mod output;

use clap::Args;
use std::path::PathBuf;

pub use execute::RecordResult;

/// Run a query and record the fetched rows to a CSV file
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  typed_sql record 'SELECT id, name FROM users' -o users.csv
  typed_sql record 'SELECT * FROM events' -o events.csv --limit 100 --no-header
  typed_sql record 'SELECT 1' -o one.csv --enable \"$RECORD\"   # 'false' skips the file")]
pub struct RecordCmd {
    /// SQL query to run
    pub sql: String,

    /// CSV file to write (created or truncated)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Positional parameter (repeatable). Empty binds NULL; numbers bind as numbers
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Maximum number of rows written; fetching is unaffected
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Do not write a header line of column names
    #[arg(long, default_value_t = false)]
    pub no_header: bool,

    /// Recording switch; only "false" (any case) disables recording
    #[arg(long, default_value = "true")]
    pub enable: String,
}
