use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tabular_model_service::{
    ModelRegistry, Predictor, ServiceError, ServiceMetrics, TabularInput, build_router,
};

struct FixedPredictor {
    value: f64,
}

impl Predictor for FixedPredictor {
    fn predict(&self, input: &TabularInput) -> Result<Vec<f64>, ServiceError> {
        Ok(vec![self.value; input.num_rows()])
    }
}

struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn predict(&self, _input: &TabularInput) -> Result<Vec<f64>, ServiceError> {
        Err(ServiceError::Prediction("feature shape mismatch".into()))
    }
}

fn service_with(predictor: Arc<dyn Predictor>) -> (Router, Arc<ServiceMetrics>) {
    let metrics = Arc::new(ServiceMetrics::new().expect("metrics registration"));
    metrics.model_load_success.set(1);
    let registry = Arc::new(ModelRegistry::with_predictor(predictor));
    (build_router(registry, metrics.clone()), metrics)
}

fn loaded_service() -> (Router, Arc<ServiceMetrics>) {
    service_with(Arc::new(FixedPredictor { value: 0.5 }))
}

/// Initialization against a missing artifact, as when a pod starts with a
/// bad mount.
fn degraded_service() -> (Router, Arc<ServiceMetrics>) {
    let metrics = Arc::new(ServiceMetrics::new().expect("metrics registration"));
    let registry = Arc::new(ModelRegistry::initialize(
        "models/does-not-exist.pt",
        &metrics.model_load_success,
    ));
    (build_router(registry, metrics.clone()), metrics)
}

async fn post_predict(router: &Router, body: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_text(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn predict_returns_one_value_per_row() {
    let (router, _) = loaded_service();

    let (status, body) =
        post_predict(&router, r#"{"feature1": [1, 2], "feature2": [3, 4]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([0.5, 0.5]));
}

#[tokio::test]
async fn predict_accepts_row_oriented_payloads() {
    let (router, _) = loaded_service();

    let (status, body) = post_predict(
        &router,
        r#"[{"feature1": 1, "feature2": 3}, {"feature1": 2, "feature2": 4}]"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([0.5, 0.5]));
}

#[tokio::test]
async fn predict_rejects_empty_and_invalid_bodies() {
    let (router, metrics) = loaded_service();

    for body in ["", "not json", "{}", "[]", "null"] {
        let (status, payload) = post_predict(&router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body:?}");
        assert_eq!(payload, json!({"error": "Invalid JSON input"}));
    }
    assert_eq!(metrics.predictions_total.get(), 0);
}

#[tokio::test]
async fn predict_without_model_returns_503_for_any_body() {
    let (router, metrics) = degraded_service();

    for body in ["", "garbage", r#"{"feature1": [1]}"#] {
        let (status, payload) = post_predict(&router, body).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "body: {body:?}");
        assert_eq!(
            payload,
            json!({"error": "Model not loaded. Please check server logs."})
        );
    }
    assert_eq!(metrics.predictions_total.get(), 0);
}

#[tokio::test]
async fn prediction_counter_tracks_successes() {
    let (router, metrics) = loaded_service();
    let before = metrics.predictions_total.get();

    for _ in 0..3 {
        let (status, _) = post_predict(&router, r#"{"feature1": [1]}"#).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(metrics.predictions_total.get(), before + 3);

    let (status, exposition) = get_text(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(exposition.contains("ml_model_predictions_total 3"));
}

#[tokio::test]
async fn prediction_errors_surface_as_500_with_raw_message() {
    let (router, metrics) = service_with(Arc::new(FailingPredictor));

    let (status, payload) = post_predict(&router, r#"{"feature1": [1]}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload, json!({"error": "feature shape mismatch"}));
    assert_eq!(metrics.predictions_total.get(), 0);
}

#[tokio::test]
async fn non_tabular_payloads_surface_as_500() {
    let (router, _) = loaded_service();

    let (status, _) = post_predict(&router, r#"{"feature1": [1], "feature2": [2, 3]}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_reflects_model_state() {
    let (loaded, _) = loaded_service();
    let (status, body) = get_text(&loaded, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Model is loaded and ready");

    let (degraded, _) = degraded_service();
    let (status, body) = get_text(&degraded, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "Model not loaded");
}

#[tokio::test]
async fn failed_load_leaves_metrics_serving() {
    let (router, metrics) = degraded_service();
    assert_eq!(metrics.model_load_success.get(), 0);

    let (status, exposition) = get_text(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(exposition.contains("ml_model_load_success 0"));
}

#[tokio::test]
async fn latency_histogram_observes_each_success() {
    let (router, metrics) = loaded_service();

    let (status, _) = post_predict(&router, r#"{"feature1": [1]}"#).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(metrics.prediction_duration_seconds.get_sample_count(), 1);
    assert!(metrics.prediction_duration_seconds.get_sample_sum() >= 0.0);

    let (_, exposition) = get_text(&router, "/metrics").await;
    assert!(exposition.contains(r#"ml_model_prediction_duration_seconds_bucket{le="+Inf"} 1"#));
}
