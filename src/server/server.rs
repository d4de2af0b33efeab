use anyhow::{Context, Result};
use axum::Router;
use reqwest::Client;
use tracing::info;

use crate::broker::Broker;
use crate::config::service::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub broker: Broker,
}

impl AppState {
    pub fn new(metrics: &Metrics, broker: Broker) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            broker,
        }
    }
}

/// Broker routes plus the metrics route when enabled.
pub fn build_router(state: AppState, settings_config: &SettingsConfig) -> Router {
    Router::new()
        .merge(routes::router())
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start the Axum server and serve until Ctrl-C.
pub async fn start(service_config: &ServiceConfig, client: Client) -> Result<()> {
    let metrics = get_metrics().await;
    let broker = Broker::from_config(service_config, client);
    let state = AppState::new(metrics, broker);
    let settings_config = &service_config.settings;

    let app = build_router(state, settings_config);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    metrics.up.set(0);

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
