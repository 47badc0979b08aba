use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use tabular_model_service::{ExporterConfig, ExporterMetrics, ModelRegistry, init_tracing};

/// Load-health sidecar: serves `/metrics` only, loads the artifact exactly
/// once to record the outcome, then idles until terminated.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ExporterConfig::from_env()?;
    let metrics = Arc::new(ExporterMetrics::new()?);

    let router = Router::new()
        .route("/metrics", get(metrics_exposition))
        .with_state(metrics.clone());

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "metrics exporter ready");

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            error!(error = %err, "metrics server terminated");
        }
    });

    let _registry = ModelRegistry::initialize(&config.model_path, &metrics.model_load_success);

    loop {
        tokio::time::sleep(config.poll_interval).await;
    }
}

async fn metrics_exposition(State(metrics): State<Arc<ExporterMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
