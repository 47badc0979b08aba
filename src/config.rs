use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

/// Default artifact location; deployments override it through the
/// environment.
pub const DEFAULT_MODEL_PATH: &str = "models/regression.pt";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub model_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            listen_addr: listen_addr("SERVER_HOST", "SERVER_PORT", 5001),
            model_path: env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub listen_addr: SocketAddr,
    pub model_path: String,
    pub poll_interval: Duration,
}

impl ExporterConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let poll_interval = env::var("EXPORTER_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(5));

        Ok(Self {
            listen_addr: listen_addr("EXPORTER_HOST", "EXPORTER_PORT", 8000),
            model_path: env::var("MODEL_EXPORTER_MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
            poll_interval,
        })
    }
}

fn listen_addr(host_var: &str, port_var: &str, default_port: u16) -> SocketAddr {
    let host: IpAddr = env::var(host_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let port = env::var(port_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_port);
    SocketAddr::new(host, port)
}
