//! CLI entrypoint for toolguard
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod fixtures;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Cli, Command};
use fixtures::{RequestFixture, ResponseFixture, read_json};
use tokio_util::sync::CancellationToken;
use toolguard_domain::Severity;
use toolguard_infrastructure::{ConfigLoader, FileConfig, build_pipeline};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };

    let _log_guard = init_logging(cli.verbose, &config)?;

    for issue in config.validate() {
        match issue.severity {
            Severity::Error => tracing::error!("{}", issue),
            Severity::Warning => warn!("{}", issue),
        }
    }

    match cli.command {
        Command::ShowConfig => {
            if !cli.no_config {
                ConfigLoader::print_config_sources(cli.config.as_deref());
                println!();
            }
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Command::PreForward { request } => {
            let request: RequestFixture = read_json(&request)?;
            let pipeline = build_pipeline(&config);
            info!("Running pre-forward on {} messages", request.messages.len());

            let outcome = pipeline.pre_forward(&request.messages, &request.tools);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::PostResponse { request, response } => {
            let request: RequestFixture = read_json(&request)?;
            let response: ResponseFixture = read_json(&response)?;
            let pipeline = build_pipeline(&config);
            info!(
                "Running post-response on {} tool calls",
                response.tool_calls.len()
            );

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let processed = pipeline
                .post_response(response.into(), &request.messages, &request.tools, &cancel)
                .await;
            println!("{}", serde_json::to_string_pretty(&processed)?);
        }
    }

    Ok(())
}

/// Install the tracing subscriber.
///
/// `-v` flags win over `[logging] debug`. With `[logging] file` set, output
/// goes to that file through a non-blocking writer whose guard must live
/// until exit.
fn init_logging(verbose: u8, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 if config.logging.debug => "debug",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::new(level);

    let Some(path) = &config.logging.file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("logging.file has no file name: {}", path.display()))?;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create {}", directory.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}
