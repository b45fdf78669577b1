//! tailcast - stream a growing file to WebSocket clients.

mod actor;
mod cli;
mod config;
mod core;
mod logger;
mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};

use actor::Coordinator;
use cli::Cli;
use config::Config;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Err(e) = run(&cli) {
        logger::log_error("error", &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    let shutdown_rx = core::setup_shutdown_handler()?;

    let config = Arc::new(Config::load(cli)?);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async {
        Coordinator::with_config(config)
            .with_shutdown_signal(shutdown_rx)
            .bind()
            .await?
            .run()
            .await
    })
}
