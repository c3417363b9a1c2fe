//! stepflow server binary
//!
//! Serves the bundled workflows over HTTP.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stepflow_server::api::{create_router, AppState};
use stepflow_server::config::ServerConfig;
use stepflow_server::registry::WorkflowRegistry;

#[derive(Parser, Debug)]
#[command(name = "stepflow-server", version, about = "Serve stepflow workflows over HTTP")]
struct Cli {
    /// Path to stepflow.toml
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen host (overrides config and HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let cli = Cli::parse();

    let mut config =
        ServerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    tracing::info!(
        max_steps = config.engine.max_steps,
        checkpoint = ?config.checkpoint.backend,
        model = %config.llm.model,
        "Configuration loaded"
    );

    let registry = WorkflowRegistry::from_config(&config)
        .await
        .context("Failed to build workflows")?;
    let app = create_router(AppState::new(registry), &config.server.cors_origins);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("stepflow-server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
