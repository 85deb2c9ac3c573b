// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_controller::RefreshController;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_orders_repository::HttpOrdersRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard_events, dashboard_json, dashboard_page, get_settings, health_check,
    submit_refresh_form, submit_settings_form, trigger_refresh, update_settings,
};

const DEFAULT_LOG_FILTER: &str = "pizzashop_dashboard=info,tower_http=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(health_check))
        .route("/settings", post(submit_settings_form))
        .route("/refresh", post(submit_refresh_form))
        .route("/api/dashboard", get(dashboard_json))
        .route("/api/events", get(dashboard_events))
        .route("/api/settings", get(get_settings).post(update_settings))
        .route("/api/refresh", post(trigger_refresh))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let config = load_dashboard_config()?;
    let initial_settings = config.refresh.initial_state();

    // Create repository (infrastructure layer)
    let repository = Arc::new(
        HttpOrdersRepository::new(config.service.base_url(), config.service.request_timeout())
            .context("Failed to build HTTP client")?,
    );
    tracing::info!(service = %config.service.base_url(), "Polling order service");

    // Create the refresh loop (application layer)
    let service = DashboardService::new(repository);
    let (controller, refresh) = RefreshController::new(service, initial_settings);
    let controller_task = controller.spawn();

    let state = Arc::new(AppState { refresh });
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.server.listen_addr))?;
    tracing::info!("Starting pizzashop dashboard on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    controller_task.abort();
    Ok(())
}
