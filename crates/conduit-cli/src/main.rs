//! Conduit - browser automation tool gateway

use anyhow::{Context, Result};
use clap::Parser;
use conduit_backend::{HttpBackend, HttpBackendConfig};
use conduit_config::{load_config, require_api_key, TransportKind};
use conduit_gateway::{Gateway, SseOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() {
    // stdout carries the pipe protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let resolved = load_config(cli.config.as_deref())?;
    if let Some(path) = &resolved.path {
        info!("loaded configuration from {}", path.display());
    }

    let mut config = resolved.config;
    cli.apply(&mut config);

    let api_key = require_api_key(&config)?;
    let backend = HttpBackend::new(
        HttpBackendConfig::new(api_key, config.backend.base_url.clone())
            .with_timeout(config.backend.request_timeout_secs),
    )
    .context("Failed to create backend client")?;

    let gateway = Gateway::new(Arc::new(backend), config.server.max_connections)
        .context("Failed to build the tool catalog")?;

    match config.server.transport {
        TransportKind::Stdio => gateway.serve_stdio().await?,
        TransportKind::Sse => {
            let options = SseOptions {
                host: config.server.host.clone(),
                port: config.server.port,
                auth_token: config.server.auth_token.clone(),
                keep_alive: Duration::from_secs(config.server.keep_alive_secs.max(1)),
            };
            gateway.serve_sse(&options, shutdown_signal()).await?
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl-C");
    }
}
