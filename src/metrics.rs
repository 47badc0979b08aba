use prometheus::{
    Encoder, Histogram, IntCounter, IntGauge, Registry, TextEncoder,
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry,
};

/// Latency buckets, in seconds.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Metric family owned by the inference server. Each process builds its own
/// registry; nothing is registered globally.
pub struct ServiceMetrics {
    registry: Registry,
    pub predictions_total: IntCounter,
    pub prediction_duration_seconds: Histogram,
    pub model_load_success: IntGauge,
}

impl ServiceMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let predictions_total = register_int_counter_with_registry!(
            "ml_model_predictions_total",
            "Total number of predictions made by the ML model.",
            registry.clone()
        )?;

        let prediction_duration_seconds = register_histogram_with_registry!(
            "ml_model_prediction_duration_seconds",
            "Histogram of prediction duration in seconds.",
            LATENCY_BUCKETS.to_vec(),
            registry.clone()
        )?;

        let model_load_success = register_int_gauge_with_registry!(
            "ml_model_load_success",
            "Gauge indicating if the ML model was loaded successfully (1 for success, 0 for failure).",
            registry.clone()
        )?;

        Ok(Self {
            registry,
            predictions_total,
            prediction_duration_seconds,
            model_load_success,
        })
    }

    pub fn render(&self) -> prometheus::Result<String> {
        render_registry(&self.registry)
    }
}

/// Metric family owned by the standalone exporter. Same load gauge contract
/// as the server, separate name so the two processes stay distinguishable.
pub struct ExporterMetrics {
    registry: Registry,
    pub model_load_success: IntGauge,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let model_load_success = register_int_gauge_with_registry!(
            "ml_exporter_model_load_success",
            "Gauge indicating if the ML model was loaded successfully by the exporter (1 for success, 0 for failure).",
            registry.clone()
        )?;

        Ok(Self {
            registry,
            model_load_success,
        })
    }

    pub fn render(&self) -> prometheus::Result<String> {
        render_registry(&self.registry)
    }
}

fn render_registry(registry: &Registry) -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
}
