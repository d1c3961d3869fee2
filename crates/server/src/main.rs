mod api;
mod config;
mod dto;
mod error;
mod provider;
mod state;

use crate::{config::Config, state::AppState};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,haulplan=debug,haulplan_server=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    info!("Starting server...");
    let config = Config::from_env().context("Failed to load configuration")?;
    let state = Arc::new(AppState::from_config(&config)?);
    let app = api::router(state, config.cors_origin.as_deref())?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!("Listening to port {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
