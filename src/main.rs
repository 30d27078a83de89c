//! cityweather - City catalog with cached current weather
//!
//! Keeps a catalog of cities on disk and reports their current weather,
//! answering from a local cache while it is fresh.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cityweather::cli::{self, Cli, CliError};

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the default `warn` level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli::run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let CliError::App(inner) = &e {
                eprintln!("{}", inner.user_message());
            }
            ExitCode::FAILURE
        }
    }
}
