//! End-to-end tests: the dashboard engine against a canned camera service.
//!
//! Each test spins up a mock upstream on an ephemeral port, points the
//! engine at it and drives the engine through its own HTTP surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use framewatch::app::AppContext;
use framewatch::config::AppConfig;
use framewatch::render::html::HtmlRenderer;
use framewatch::sched::PollScheduler;
use framewatch::web::Server;

// ============================================================================
// Mock upstream
// ============================================================================

#[derive(Default)]
struct Upstream {
    status_calls: AtomicUsize,
    results_calls: AtomicUsize,
    info_calls: AtomicUsize,
    performance_calls: AtomicUsize,
    start_calls: AtomicUsize,
    last_results_limit: AtomicUsize,
    busy: AtomicBool,
}

async fn upstream_status(State(state): State<Arc<Upstream>>) -> Json<Value> {
    state.status_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "camera": {
            "active": true,
            "efficiency": 95.2,
            "frame_count": 1200,
            "analyzed_frame_count": 48,
            "current_fps": 24.8,
            "analysis_rate": 1.02,
            "uptime": 3661.0,
            "error_count": 0,
            "target_fps": 25.0
        },
        "neural_network": {
            "processed_frames": 48,
            "average_processing_time": 0.041,
            "total_processing_time": 1.97,
            "model_loaded": true
        },
        "config": {
            "target_fps": 25.0,
            "analysis_interval": 1.0,
            "expected_analysis_rate": 1.0
        }
    }))
}

async fn upstream_results(
    State(state): State<Arc<Upstream>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.results_calls.fetch_add(1, Ordering::SeqCst);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    state.last_results_limit.store(limit, Ordering::SeqCst);

    // Rows deliberately cover the stored-detection shapes: a plain array,
    // a JSON-encoded string and null.
    Json(json!({
        "success": true,
        "data": [
            {
                "id": 3,
                "timestamp": "2024-05-01T12:30:45",
                "created_at": "2024-05-01T12:30:46",
                "detection_results": [
                    {"object_type": "person", "confidence": 0.91, "bbox": [10.0, 20.0, 110.0, 220.0]},
                    {"object_type": "person", "confidence": 0.84, "bbox": [300.0, 40.0, 380.0, 200.0]}
                ],
                "processing_time": 0.15
            },
            {
                "id": 2,
                "timestamp": "2024-05-01T12:30:40",
                "created_at": "2024-05-01T12:30:41",
                "detection_results": "[{\"object_type\": \"car\", \"confidence\": 0.72, \"bbox\": [5.0, 5.0, 95.0, 60.0]}]",
                "processing_time": 0.11
            },
            {
                "id": 1,
                "timestamp": "2024-05-01T12:30:35",
                "created_at": "2024-05-01T12:30:36",
                "detection_results": null,
                "processing_time": 0.09
            }
        ]
    }))
}

async fn upstream_info(State(state): State<Arc<Upstream>>) -> Json<Value> {
    state.info_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "data": {
            "results_count": 128,
            "database_size": "2.4 MB",
            "last_activity": "2024-05-01T12:30:45"
        }
    }))
}

async fn upstream_performance(State(state): State<Arc<Upstream>>) -> Json<Value> {
    state.performance_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "data": {
            "uptime_seconds": 3661.0,
            "total_frames": 1200,
            "analyzed_frames": 48,
            "average_fps": 28.0,
            "analysis_rate_per_second": 0.96,
            "expected_analysis_rate": 1.0,
            "analysis_efficiency_percent": 96.0,
            "frames_per_analysis": 25.0,
            "error_count": 1,
            "error_rate_percent": 0.08
        },
        "recommendations": ["Lower the analysis interval"]
    }))
}

async fn upstream_start(State(state): State<Arc<Upstream>>) -> Json<Value> {
    state.start_calls.fetch_add(1, Ordering::SeqCst);
    if state.busy.load(Ordering::SeqCst) {
        Json(json!({"success": false, "message": "Camera is busy"}))
    } else {
        Json(json!({"success": true, "message": "started"}))
    }
}

async fn upstream_cleanup() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Removed 12 records older than 30 days",
        "deleted_count": 12
    }))
}

async fn serve_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_upstream(state: Arc<Upstream>) -> String {
    let router = Router::new()
        .route("/api/camera/status", get(upstream_status))
        .route("/api/database/results", get(upstream_results))
        .route("/api/database/info", get(upstream_info))
        .route("/api/camera/performance", get(upstream_performance))
        .route("/api/camera/start", post(upstream_start))
        .route("/api/database/cleanup", post(upstream_cleanup))
        .with_state(state);
    serve_router(router).await
}

// ============================================================================
// Dashboard harness
// ============================================================================

struct Harness {
    ctx: Arc<AppContext>,
    scheduler: Arc<PollScheduler>,
    base: String,
    client: reqwest::Client,
}

async fn dashboard_for(api_url: &str) -> Harness {
    let config = AppConfig {
        api_url: api_url.to_string(),
        request_timeout_secs: 2,
        ..AppConfig::default()
    };
    let renderer = Arc::new(HtmlRenderer::new());
    let ctx = AppContext::new(config, renderer.clone()).unwrap();
    let scheduler = Arc::new(PollScheduler::new(ctx.clone()));
    let server = Server::new(ctx.clone(), renderer, scheduler.clone());
    let base = serve_router(server.routes()).await;

    Harness {
        ctx,
        scheduler,
        base,
        client: reqwest::Client::new(),
    }
}

impl Harness {
    async fn post_action(&self, path: &str) -> Value {
        self.client
            .post(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn post_json(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn view(&self) -> Value {
        self.client
            .get(format!("{}/api/view", self.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

fn notification_messages(view: &Value) -> Vec<String> {
    view["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_start_camera_posts_exactly_once_and_notifies() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    let result = h.post_action("/actions/camera/start").await;
    assert_eq!(result["success"], json!(true));
    assert_eq!(upstream.start_calls.load(Ordering::SeqCst), 1);

    let view = h.view().await;
    assert!(notification_messages(&view)
        .iter()
        .any(|m| m == "Camera analysis started"));
}

#[tokio::test]
async fn test_busy_service_raises_error_notification() {
    let upstream = Arc::new(Upstream::default());
    upstream.busy.store(true, Ordering::SeqCst);
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    let result = h.post_action("/actions/camera/start").await;
    assert_eq!(result["success"], json!(false));
    assert_eq!(upstream.start_calls.load(Ordering::SeqCst), 1);

    let view = h.view().await;
    let notifications = view["notifications"].as_array().unwrap().clone();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], json!("error"));
    assert!(notifications[0]["message"]
        .as_str()
        .unwrap()
        .contains("busy"));
}

#[tokio::test]
async fn test_transport_failure_notifies_with_reason() {
    // Bind and drop a listener so the port is dead.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let h = dashboard_for(&format!("http://{}", addr)).await;

    let result = h.post_action("/actions/camera/start").await;
    assert_eq!(result["success"], json!(false));

    let view = h.view().await;
    let messages = notification_messages(&view);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Failed to start camera"));
    // The transport reason rides along after the prefix.
    assert!(messages[0].len() > "Failed to start camera: ".len());
}

#[tokio::test]
async fn test_initial_loads_render_all_regions() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    h.scheduler.start();

    let mut view = Value::Null;
    for _ in 0..100 {
        view = h.view().await;
        if view["regions"]["status"]
            .as_str()
            .unwrap()
            .contains("Analysis active")
            && view["regions"]["results_table"]
                .as_str()
                .unwrap()
                .contains("person")
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let regions = &view["regions"];
    let status = regions["status"].as_str().unwrap();
    assert!(status.contains("Analysis active"));
    assert!(status.contains("01:01:01"));

    let table = regions["results_table"].as_str().unwrap();
    assert!(table.contains("person (2)"));
    assert!(table.contains("car"));
    assert!(table.contains("150 ms"));

    // The encoded-string row decodes into a visible detection entry.
    let recent = regions["recent_detections"].as_str().unwrap();
    assert!(recent.contains("car"));
    assert!(recent.contains("72.0%"));
    assert!(recent.contains("medium"));

    let info = regions["database_info"].as_str().unwrap();
    assert!(info.contains("128"));
    assert!(info.contains("2.4 MB"));

    h.scheduler.shutdown();
}

#[tokio::test]
async fn test_tab_switch_triggers_immediate_loads() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    let resp = h.post_json("/ui/tab", json!({"tab": "database"})).await;
    assert!(resp.status().is_success());

    for _ in 0..100 {
        if upstream.results_calls.load(Ordering::SeqCst) == 1
            && upstream.info_calls.load(Ordering::SeqCst) == 1
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(upstream.results_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.info_calls.load(Ordering::SeqCst), 1);

    h.post_json("/ui/tab", json!({"tab": "performance"})).await;
    for _ in 0..100 {
        if upstream.performance_calls.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(upstream.performance_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_visibility_toggle_issues_single_status_fetch() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    // Hiding fetches nothing.
    h.post_json("/ui/visibility", json!({"hidden": true})).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(upstream.status_calls.load(Ordering::SeqCst), 0);

    // Becoming visible fetches status once.
    h.post_json("/ui/visibility", json!({"hidden": false}))
        .await;
    for _ in 0..100 {
        if upstream.status_calls.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(upstream.status_calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(upstream.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_force_update_refreshes_status_results_performance() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    let result = h.post_action("/actions/force-update").await;
    assert_eq!(result["success"], json!(true));

    assert_eq!(upstream.status_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.results_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.performance_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.info_calls.load(Ordering::SeqCst), 0);
    assert_eq!(upstream.last_results_limit.load(Ordering::SeqCst), 50);
}

#[tokio::test]
async fn test_cleanup_forwards_message_and_refreshes() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    let result = h.post_action("/actions/cleanup").await;
    assert_eq!(result["success"], json!(true));

    let view = h.view().await;
    assert!(notification_messages(&view)
        .iter()
        .any(|m| m == "Removed 12 records older than 30 days"));

    // Success triggers a results and storage-info refresh.
    assert_eq!(upstream.results_calls.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.info_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dismiss_notification_endpoint() {
    let upstream = Arc::new(Upstream::default());
    upstream.busy.store(true, Ordering::SeqCst);
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    h.post_action("/actions/camera/start").await;

    let view = h.view().await;
    let id = view["notifications"][0]["id"].as_u64().unwrap();

    let resp = h
        .post_json(&format!("/api/notifications/{}/dismiss", id), Value::Null)
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);

    let view = h.view().await;
    assert!(view["notifications"].as_array().unwrap().is_empty());

    let resp = h
        .post_json(&format!("/api/notifications/{}/dismiss", id), Value::Null)
        .await;
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_diagnostics_endpoint_reports_engine_state() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream.clone()).await;
    let h = dashboard_for(&api).await;

    h.ctx.refresh_status().await;

    let resp = h
        .client
        .get(format!("{}/api/diagnostics", h.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("framewatch_diagnostics"));

    let report: Value = resp.json().await.unwrap();
    assert_eq!(report["api_url"], json!(api));
    assert_eq!(report["update_intervals"]["status_ms"], json!(3000));
    assert_eq!(report["update_intervals"]["database_ms"], json!(10000));
    assert_eq!(report["poll_counts"]["status_polls"], json!(1));
    assert_eq!(report["performance"], Value::Null);
}

#[tokio::test]
async fn test_dashboard_page_serves_shell() {
    let upstream = Arc::new(Upstream::default());
    let api = spawn_upstream(upstream).await;
    let h = dashboard_for(&api).await;

    let page = h
        .client
        .get(format!("{}/", h.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("FrameWatch"));
    assert!(page.contains("region-status"));
    assert!(page.contains("region-performance"));
    // Regions start from their empty states before any poll.
    assert!(page.contains("Stopped"));
}
