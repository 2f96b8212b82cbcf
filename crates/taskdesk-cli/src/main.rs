//! taskdesk - a command line client for the taskdesk task manager.
//!
//! Log in once; the session is persisted and reused until it expires or the
//! server rejects it.

mod args;
mod commands;
mod output;
mod prompt;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use taskdesk_core::config::Config;
use taskdesk_core::Client;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Cli;
use commands::Context;

/// Directory for a daily-rolling log file, in addition to stderr
const ENV_LOG_DIR: &str = "TASKDESK_LOG_DIR";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(ENV_LOG_DIR) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "taskdesk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.apply_env();
    if let Some(ref url) = cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }
    debug!(api = %config.api_base_url, storage = ?config.storage, "Config loaded");
    config
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli);
    let client = Client::from_config(&config)?;

    let mut ctx = Context {
        config,
        client,
        json: cli.json,
    };
    commands::run(&mut ctx, cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();
    info!(command = ?cli.command, "taskdesk starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", output::alert_message(&e));
            ExitCode::FAILURE
        }
    }
}
