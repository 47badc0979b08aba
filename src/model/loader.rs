use std::{path::Path, sync::Arc};

use crate::{error::ServiceError, model::TabularInput};

/// A loaded model capable of scoring tabular inputs, one prediction per row.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: &TabularInput) -> Result<Vec<f64>, ServiceError>;
}

pub(crate) fn load_predictor(location: &str) -> Result<Arc<dyn Predictor>, ServiceError> {
    let path = artifact_path(location);
    if !path.exists() {
        return Err(ServiceError::Load(format!(
            "model artifact missing: {}",
            path.display()
        )));
    }

    #[cfg(feature = "tch-backend")]
    return Ok(Arc::new(torch::TorchPredictor::load(path)?));

    #[cfg(not(feature = "tch-backend"))]
    Err(ServiceError::Load(format!(
        "no model backend compiled in, cannot load {}",
        path.display()
    )))
}

/// Artifact locations may be plain paths or `file://` URIs.
fn artifact_path(location: &str) -> &Path {
    Path::new(location.strip_prefix("file://").unwrap_or(location))
}

#[cfg(feature = "tch-backend")]
mod torch {
    use std::{env, fs, path::Path};

    use parking_lot::Mutex;
    use tch::{Device, IValue, Kind, Tensor, no_grad};

    use super::Predictor;
    use crate::{error::ServiceError, model::TabularInput};

    pub struct TorchPredictor {
        device: Device,
        module: Mutex<tch::CModule>,
    }

    impl TorchPredictor {
        pub fn load(path: &Path) -> Result<Self, ServiceError> {
            let device = resolve_device();
            let size_bytes = fs::metadata(path)
                .map_err(|e| {
                    ServiceError::Load(format!("cannot stat {}: {e}", path.display()))
                })?
                .len();

            let mut module = tch::CModule::load_on_device(path, device)
                .map_err(|e| ServiceError::Load(e.to_string()))?;
            module.set_eval();

            tracing::info!(
                artifact = %path.display(),
                size_bytes,
                ?device,
                "model artifact loaded"
            );

            Ok(Self {
                device,
                module: Mutex::new(module),
            })
        }
    }

    impl Predictor for TorchPredictor {
        fn predict(&self, input: &TabularInput) -> Result<Vec<f64>, ServiceError> {
            let cells: Vec<f32> = input
                .rows()
                .iter()
                .flatten()
                .map(|&value| value as f32)
                .collect();
            let features = Tensor::from_slice(&cells)
                .reshape([input.num_rows() as i64, input.num_columns() as i64])
                .to(self.device);

            let output = no_grad(|| {
                let module = self.module.lock();
                module
                    .forward_is(&[IValue::Tensor(features)])
                    .map_err(|e| ServiceError::Prediction(e.to_string()))
            })?;

            // Traced regressors return either the prediction tensor or a
            // tuple with the tensor first.
            let predictions = match output {
                IValue::Tensor(t) => t,
                IValue::Tuple(ref tuple) if !tuple.is_empty() => match &tuple[0] {
                    IValue::Tensor(t) => t.shallow_clone(),
                    _ => {
                        return Err(ServiceError::Prediction(
                            "expected tensor as first tuple element".into(),
                        ));
                    }
                },
                _ => {
                    return Err(ServiceError::Prediction(
                        "unexpected model output format".into(),
                    ));
                }
            };

            let flat = predictions.to_kind(Kind::Double).flatten(0, -1);
            Vec::<f64>::try_from(&flat).map_err(|e| ServiceError::Prediction(e.to_string()))
        }
    }

    fn resolve_device() -> Device {
        let raw = env::var("DEVICE").unwrap_or_else(|_| "cpu".into());
        let lower = raw.to_lowercase();
        if lower.starts_with("cuda") {
            let idx = lower
                .split(':')
                .nth(1)
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(0);
            if tch::Cuda::is_available() {
                Device::Cuda(idx)
            } else {
                Device::Cpu
            }
        } else {
            Device::Cpu
        }
    }
}
