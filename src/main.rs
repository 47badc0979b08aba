use std::sync::Arc;

use tokio::net::TcpListener;

use tabular_model_service::{
    AppConfig, ModelRegistry, ServiceMetrics, build_router, init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(%config.listen_addr, %config.model_path, "starting inference server");

    let metrics = Arc::new(ServiceMetrics::new()?);
    let registry = Arc::new(ModelRegistry::initialize(
        &config.model_path,
        &metrics.model_load_success,
    ));

    let router = build_router(registry, metrics);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "REST server ready");

    axum::serve(listener, router).await?;

    Ok(())
}
