// HTTP request handlers
use crate::application::refresh_controller::RenderedDashboard;
use crate::domain::refresh_state::{DashboardRefreshState, SettingsError};
use crate::infrastructure::event_stream::refresh_events;
use crate::infrastructure::html_page::render_page;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub auto_refresh: Option<bool>,
    pub interval_seconds: Option<i64>,
}

/// Fields posted by the settings form on the dashboard page.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    // Browsers omit unchecked checkboxes
    pub auto_refresh: Option<String>,
    pub interval_seconds: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn settings_rejected(err: SettingsError) -> Response {
    tracing::info!(error = %err, "Rejected refresh settings");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Dashboard page with the last rendered view
pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let rendered = state.refresh.rendered();
    Html(render_page(&rendered, &state.refresh.settings()))
}

pub async fn dashboard_json(State(state): State<Arc<AppState>>) -> Json<RenderedDashboard> {
    Json(state.refresh.rendered())
}

/// Push one event per completed refresh cycle
pub async fn dashboard_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    refresh_events(state.refresh.subscribe())
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<DashboardRefreshState> {
    Json(state.refresh.settings())
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state
        .refresh
        .update_settings(update.auto_refresh, update.interval_seconds)
    {
        Ok(settings) => Json(settings).into_response(),
        Err(err) => settings_rejected(err),
    }
}

pub async fn submit_settings_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingsForm>,
) -> Response {
    let interval = match form.interval_seconds.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(seconds) => Some(seconds),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("refresh interval '{}' is not a whole number", raw),
                )
                    .into_response();
            }
        },
    };

    match state
        .refresh
        .update_settings(Some(form.auto_refresh.is_some()), interval)
    {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => settings_rejected(err),
    }
}

/// External trigger: start a cycle now
pub async fn trigger_refresh(State(state): State<Arc<AppState>>) -> StatusCode {
    tracing::debug!("Manual refresh requested");
    state.refresh.trigger_refresh();
    StatusCode::ACCEPTED
}

pub async fn submit_refresh_form(State(state): State<Arc<AppState>>) -> Redirect {
    state.refresh.trigger_refresh();
    Redirect::to("/")
}
