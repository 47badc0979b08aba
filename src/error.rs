use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Model not loaded. Please check server logs.")]
    ModelNotLoaded,
    #[error("Invalid JSON input")]
    Parse,
    #[error("failed to load model artifact: {0}")]
    Load(String),
    #[error("{0}")]
    Prediction(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Parse => StatusCode::BAD_REQUEST,
            ServiceError::Load(_) | ServiceError::Prediction(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
