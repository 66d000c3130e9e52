mod execute;

use clap::Args;
use std::path::PathBuf;

/// Replay a recorded CSV file through a mock connection
///
/// The file is injected into a fresh mock connection and the statement is
/// executed against it, showing exactly what a test using the recording
/// would fetch.
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  typed_sql replay users.csv
  typed_sql replay users.csv --frame -f json
  typed_sql replay raw.csv --no-header")]
pub struct ReplayCmd {
    /// CSV file produced by `record`
    pub file: PathBuf,

    /// The file has no header line
    #[arg(long, default_value_t = false)]
    pub no_header: bool,

    /// Statement executed on the mock connection
    #[arg(long, default_value = "SELECT * FROM replay")]
    pub sql: String,

    /// Inject the file as a frame response (requires a header line)
    #[arg(long, default_value_t = false)]
    pub frame: bool,
}
