mod execute;

use clap::Args;

/// Run a statement on the database and print the rows it returns
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  typed_sql query 'SELECT id, name FROM users'
  typed_sql query 'SELECT * FROM users WHERE id = ?1' --param 42
  typed_sql query 'DELETE FROM users WHERE id = ?1' -p 42 --commit")]
pub struct QueryCmd {
    /// SQL statement to run
    pub sql: String,

    /// Positional parameter (repeatable). Empty binds NULL; numbers bind as numbers
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Commit the transaction after the statement
    #[arg(long, default_value_t = false)]
    pub commit: bool,
}
