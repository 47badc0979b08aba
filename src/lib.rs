pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod server;

pub use config::{AppConfig, ExporterConfig};
pub use error::ServiceError;
pub use metrics::{ExporterMetrics, ServiceMetrics};
pub use model::{ModelRegistry, Predictor, TabularInput};
pub use server::build_router;

/// Install the global tracing subscriber shared by both binaries.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn,axum::rejection=trace".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
