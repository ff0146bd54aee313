//! Lodestar CLI entry point
//!
//! # Examples
//!
//! ```bash
//! # Index a project directory
//! lodestar index /path/to/project
//!
//! # Search the resulting collection
//! lodestar search "user registration" --collection codebase-index-project
//!
//! # Intent-expanded hybrid search
//! lodestar hybrid-search "what endpoints exist" --collection codebase-index-project
//!
//! # List collections
//! lodestar list-collections
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodestar::cli::{run, Cli};

/// Initialize tracing for the CLI.
///
/// Defaults to warnings only so command output stays clean; set
/// `LODESTAR_LOG=lodestar=debug` for verbose diagnostics and
/// `LODESTAR_LOG_FORMAT=json` for machine-readable log lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LODESTAR_LOG")
        .unwrap_or_else(|_| "lodestar=warn".into());

    let json = std::env::var("LODESTAR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
