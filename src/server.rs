use std::{sync::Arc, time::Instant};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::{
    error::ServiceError,
    metrics::ServiceMetrics,
    model::{ModelRegistry, TabularInput},
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub metrics: Arc<ServiceMetrics>,
}

pub fn build_router(registry: Arc<ModelRegistry>, metrics: Arc<ServiceMetrics>) -> Router {
    let state = AppState { registry, metrics };

    Router::new()
        .route("/predict", post(predict))
        .route("/metrics", get(metrics_exposition))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<f64>>, ServiceError> {
    if !state.registry.is_loaded() {
        return Err(ServiceError::ModelNotLoaded);
    }

    let started = Instant::now();

    let payload: Value = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "rejecting unparseable prediction payload");
        ServiceError::Parse
    })?;
    if TabularInput::is_empty_payload(&payload) {
        return Err(ServiceError::Parse);
    }

    let predictions = match run_prediction(&state, &payload).await {
        Ok(predictions) => predictions,
        Err(err) => {
            error!(error = %err, "prediction failed");
            return Err(err);
        }
    };

    state.metrics.predictions_total.inc();
    state
        .metrics
        .prediction_duration_seconds
        .observe(started.elapsed().as_secs_f64());

    Ok(Json(predictions))
}

async fn run_prediction(state: &AppState, payload: &Value) -> Result<Vec<f64>, ServiceError> {
    let input = TabularInput::from_json(payload)?;
    state.registry.predict(input).await
}

async fn metrics_exposition(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
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

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.registry.is_loaded() {
        (StatusCode::OK, "Model is loaded and ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Model not loaded")
    }
}
