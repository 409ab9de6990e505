//! CLI entry point for the linkrelay tool.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use linkrelay_core::sink::{StatusSink, TelegramClient, TelegramStatusMessage, TelegramUploader};
use linkrelay_core::transfer::constants::MIB;
use linkrelay_core::{HttpFetcher, RelayConfig, TransferEngine, TransferRequest};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod app_config;
mod cli;
mod console;

use cli::Args;
use console::ConsoleStatus;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_file = args
        .log_file
        .as_deref()
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))
        })
        .transpose()?;
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = Arc::new(build_config(&args)?);
    info!(
        download_dir = %config.download_dir.display(),
        size_ceiling = config.size_ceiling,
        "linkrelay starting"
    );

    let fetcher = HttpFetcher::new(&config.fetch_timeouts).context("Failed to build HTTP client")?;
    let client = TelegramClient::new(args.bot_token.clone(), &config.upload_timeouts)
        .context("Failed to build Telegram client")?
        .with_api_base(args.api_base.clone());
    let uploader = TelegramUploader::new(client.clone(), args.channel.clone());

    let console = ConsoleStatus::for_stderr(args.quiet);
    let remote_status = args
        .status_chat
        .as_ref()
        .map(|chat| TelegramStatusMessage::new(client, chat.clone()));
    let status: &dyn StatusSink = match &remote_status {
        Some(message) => message,
        None => &console,
    };

    let engine = TransferEngine::new(Arc::clone(&config), Arc::new(fetcher))
        .context("Invalid relay configuration")?;
    let request = TransferRequest::new(args.url.clone(), args.destination_name());
    let outcome = engine.run(&request, status, &uploader).await;
    console.finish();

    if outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Failures always reach stderr, even when status went elsewhere.
        if remote_status.is_some() || args.quiet {
            eprintln!("{}", outcome.status_text());
        }
        Ok(ExitCode::FAILURE)
    }
}

/// Defaults, then the config file, then CLI flags.
fn build_config(args: &Args) -> Result<RelayConfig> {
    let mut config = RelayConfig::default();
    if let Some(file_config) = app_config::load_file_config(args.config.as_deref())? {
        debug!(?file_config, "loaded config file");
        file_config.apply_to(&mut config);
    }
    if let Some(dir) = &args.download_dir {
        config.download_dir.clone_from(dir);
    }
    if let Some(size) = args.max_size_mb {
        config.size_ceiling = size * MIB;
    }
    config.validate().context("Invalid relay configuration")?;
    Ok(config)
}
