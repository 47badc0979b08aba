use std::sync::Arc;

use prometheus::IntGauge;
use tokio::task;
use tracing::{error, info};

use crate::{
    error::ServiceError,
    model::{TabularInput, loader, loader::Predictor},
};

/// Process-lifetime predictor slot. Filled at most once, at initialization;
/// a failed load leaves it empty and the hosting process keeps serving
/// health and metrics in a degraded state.
pub struct ModelRegistry {
    predictor: Option<Arc<dyn Predictor>>,
}

impl ModelRegistry {
    /// Attempt a single artifact load and record the outcome in
    /// `load_success`. Never fails: the caller keeps running either way.
    pub fn initialize(location: &str, load_success: &IntGauge) -> Self {
        info!(artifact = location, "attempting to load model");
        match loader::load_predictor(location) {
            Ok(predictor) => {
                load_success.set(1);
                info!(artifact = location, "model loaded successfully");
                Self {
                    predictor: Some(predictor),
                }
            }
            Err(err) => {
                load_success.set(0);
                error!(artifact = location, error = %err, "model load failed");
                Self { predictor: None }
            }
        }
    }

    /// Wrap an already-constructed predictor, skipping artifact loading.
    pub fn with_predictor(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor: Some(predictor),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    pub async fn predict(&self, input: TabularInput) -> Result<Vec<f64>, ServiceError> {
        let predictor = self
            .predictor
            .clone()
            .ok_or(ServiceError::ModelNotLoaded)?;

        task::spawn_blocking(move || predictor.predict(&input))
            .await
            .map_err(|err| ServiceError::Prediction(format!("inference task failed: {err}")))?
    }
}
