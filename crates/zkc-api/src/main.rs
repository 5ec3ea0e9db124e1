//! `zkc-api` binary: read configuration, install logging and metrics, serve.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;
use zkc_api::{app, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut state = AppState::new(config.clone());
    if config.metrics_enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        state = state.with_metrics(handle);
    }

    tracing::info!(
        addr = %config.bind_addr,
        policy = %config.policy,
        oracles = config.oracles.len(),
        max_attempts = config.publish.max_attempts,
        "zkc-api starting"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}
