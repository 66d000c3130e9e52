use clap::Parser;
use tracing_subscriber::EnvFilter;

use typed_sql::cli::Args;

fn init_logging(verbose: bool) {
    let default = if verbose { "typed_sql=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let database = args.database_config()?;
    tracing::debug!(target: "typed_sql::driver", database = ?database.redacted(), "resolved database");

    let output = args.command.run(&database, args.format)?;
    println!("{}", output);
    Ok(())
}
