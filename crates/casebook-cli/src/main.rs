//! Casebook CLI - case review and appointment booking from the terminal.
//!
//! Works against local JSON files or a remote API, selected by the config
//! file or `CASEBOOK_*` environment variables.

mod commands;

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use casebook_core::{Casebook, Config};
use commands::{split_json_flag, Command};

/// Log file written in the data directory
const LOG_FILE: &str = "casebook.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when a log directory is available, to a file in
/// it. The returned guard flushes the file writer on drop.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) if std::fs::create_dir_all(dir).is_ok() => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (args, as_json) = split_json_flag(std::env::args().skip(1).collect());
    let command = Command::parse(&args)?;
    if command == Command::Help {
        println!("{}", commands::USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let log_dir = config.data_dir().ok();
    let _guard = init_tracing(log_dir.as_deref());
    info!(backend = ?config.backend, "Casebook starting");

    let casebook = Casebook::new(config.open_storage()?).with_demo_data(config.seed_demo_data);
    if let Err(e) = casebook.initialize().await {
        // Reads still degrade to empty results; only `init` must succeed
        if command == Command::Init {
            return Err(e.into());
        }
        warn!(error = %e, "Initialization failed, continuing");
    }

    if command == Command::Init {
        let path = Config::config_path()?;
        if !path.exists() {
            config.save()?;
            println!("Wrote config to {}", path.display());
        }
    }

    commands::run(&casebook, command, as_json).await
}
