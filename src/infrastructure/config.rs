use crate::domain::refresh_state::{DashboardRefreshState, DEFAULT_INTERVAL_SECONDS};
use serde::Deserialize;
use std::time::Duration;

/// Legacy variable naming the order service, e.g. `pizzashop:8080`.
const SERVICE_ENV: &str = "PIZZASHOP_SERVICE";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub service: ServiceSettings,
    pub server: ServerSettings,
    pub refresh: RefreshSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceSettings {
    pub host_port: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    pub auto_refresh: bool,
    pub interval_seconds: i64,
}

impl ServiceSettings {
    pub fn base_url(&self) -> String {
        service_base_url(&self.host_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl RefreshSettings {
    /// Initial session state; a non-positive interval falls back to the default.
    pub fn initial_state(&self) -> DashboardRefreshState {
        DashboardRefreshState::new(self.auto_refresh, self.interval_seconds).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring configured refresh interval");
            DashboardRefreshState {
                auto_refresh_enabled: self.auto_refresh,
                interval_seconds: DEFAULT_INTERVAL_SECONDS,
            }
        })
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_from(config::File::with_name("config/dashboard").required(false))
}

fn load_from<S>(file: S) -> anyhow::Result<DashboardConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("service.host_port", "host.docker.internal:8080")?
        .set_default("service.request_timeout_secs", 10)?
        .set_default("server.listen_addr", "0.0.0.0:8501")?
        .set_default("refresh.auto_refresh", true)?
        .set_default("refresh.interval_seconds", DEFAULT_INTERVAL_SECONDS as i64)?
        .add_source(file)
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .set_override_option("service.host_port", std::env::var(SERVICE_ENV).ok())?
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Accepts `host:port` or a full URL and returns a base URL without trailing slash.
pub fn service_base_url(host_port: &str) -> String {
    let trimmed = host_port.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
