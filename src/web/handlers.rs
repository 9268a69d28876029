//! HTTP request handlers.

use super::AppState;
use crate::app::{Tab, UiState, Visibility};
use crate::notify::Notification;
use crate::render::html::RegionSet;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Templates (simple string replacement)
// ============================================================================

const DASHBOARD_TEMPLATE: &str = include_str!("templates/dashboard.html");
const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");

// ============================================================================
// Dashboard
// ============================================================================

pub async fn handle_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let regions = state.renderer.snapshot();

    let content = DASHBOARD_TEMPLATE
        .replace("{{status}}", &regions.status)
        .replace("{{performance}}", &regions.performance)
        .replace("{{recommendations}}", &regions.recommendations)
        .replace("{{results_table}}", &regions.results_table)
        .replace("{{recent_detections}}", &regions.recent_detections)
        .replace("{{database_info}}", &regions.database_info);

    let page = LAYOUT_TEMPLATE
        .replace("{{title}}", "FrameWatch Dashboard")
        .replace("{{content}}", &content);

    Html(page)
}

// ============================================================================
// API: view state
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub regions: RegionSet,
    pub notifications: Vec<Notification>,
    pub ui: UiState,
}

pub async fn handle_view(State(state): State<AppState>) -> impl IntoResponse {
    Json(ViewResponse {
        regions: state.renderer.snapshot(),
        notifications: state.ctx.notifications.active(),
        ui: state.ctx.ui_state(),
    })
}

pub async fn handle_diagnostics(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.ctx.diagnostics();
    let filename = format!(
        "framewatch_diagnostics_{}.json",
        report.timestamp.replace(':', "-")
    );

    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )],
        Json(report),
    )
}

pub async fn handle_dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> impl IntoResponse {
    if state.ctx.notifications.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ============================================================================
// API: control actions
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub success: bool,
}

pub async fn handle_start_camera(State(state): State<AppState>) -> impl IntoResponse {
    let success = state.ctx.start_camera().await;
    Json(ActionResult { success })
}

pub async fn handle_stop_camera(State(state): State<AppState>) -> impl IntoResponse {
    let success = state.ctx.stop_camera().await;
    Json(ActionResult { success })
}

pub async fn handle_restart_camera(State(state): State<AppState>) -> impl IntoResponse {
    let success = state.ctx.restart_camera().await;
    Json(ActionResult { success })
}

pub async fn handle_reset_statistics(State(state): State<AppState>) -> impl IntoResponse {
    let success = state.ctx.reset_statistics().await;
    Json(ActionResult { success })
}

pub async fn handle_cleanup(State(state): State<AppState>) -> impl IntoResponse {
    let success = state.ctx.cleanup_database().await;
    Json(ActionResult { success })
}

pub async fn handle_refresh_results(State(state): State<AppState>) -> impl IntoResponse {
    state.ctx.refresh_results().await;
    Json(ActionResult { success: true })
}

pub async fn handle_refresh_performance(State(state): State<AppState>) -> impl IntoResponse {
    state.ctx.refresh_performance().await;
    Json(ActionResult { success: true })
}

pub async fn handle_force_update(State(state): State<AppState>) -> impl IntoResponse {
    state.ctx.force_update().await;
    Json(ActionResult { success: true })
}

// ============================================================================
// API: UI state
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: Tab,
}

pub async fn handle_tab(
    State(state): State<AppState>,
    Json(req): Json<TabRequest>,
) -> impl IntoResponse {
    state.ctx.set_active_tab(req.tab);
    Json(ActionResult { success: true })
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub hidden: bool,
}

pub async fn handle_visibility(
    State(state): State<AppState>,
    Json(req): Json<VisibilityRequest>,
) -> impl IntoResponse {
    let visibility = if req.hidden {
        Visibility::Hidden
    } else {
        Visibility::Visible
    };
    state.ctx.set_visibility(visibility);
    Json(ActionResult { success: true })
}

// ============================================================================
// Static Assets
// ============================================================================

pub async fn handle_favicon() -> impl IntoResponse {
    // Return a simple SVG favicon
    let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
        <rect x="10" y="25" width="60" height="50" rx="8" fill="#4a90d9"/>
        <polygon points="70,40 90,30 90,70 70,60" fill="#4a90d9"/>
        <circle cx="40" cy="50" r="12" fill="white"/>
        <circle cx="40" cy="50" r="5" fill="#2c5f8a"/>
    </svg>"##;

    ([(header::CONTENT_TYPE, "image/svg+xml")], svg)
}
