#![allow(clippy::multiple_crate_versions)]

//! ffm - focus follows mouse for macOS.
//!
//! With no subcommand the binary runs focus-follows-mouse in the foreground
//! until interrupted. Subcommands inspect and scaffold the configuration.

use clap::Parser;
use ffm_lib::cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = cli.execute() {
        eprintln!("ffm: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ffm={level},ffm_lib={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
