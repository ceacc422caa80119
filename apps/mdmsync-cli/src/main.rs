//! mdmsync - operator CLI for the MDM reconciliation jobs

use clap::Parser;
use mdmsync_cli::{logging, run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "Run failed");
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}
