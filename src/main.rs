//! Entry point: parse CLI, set up logging and dispatch to command handlers.

use clap::Parser;
use clubhouse::{cli::Club, commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr so `--json` output on stdout stays machine readable.
/// `RUST_LOG` overrides the level chosen by `--verbose`.
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "clubhouse=debug" } else { "clubhouse=info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Run the CLI.
#[tokio::main]
async fn main() {
    let app = Club::parse();
    setup_logging(app.verbose);

    if let Err(e) = commands::run(app).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
