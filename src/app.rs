//! Application context and dashboard operations.
//!
//! `AppContext` is the explicit hub every component receives a handle to:
//! configuration, the API client, the renderer, the notification sink and
//! the shared UI state. All fetch-and-render operations live here; the
//! scheduler and the web surface only decide when to call them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::{ApiClient, ApiError};
use crate::config::AppConfig;
use crate::model::{ActionResponse, PerformanceSnapshot};
use crate::notify::NotificationSink;
use crate::render::Renderer;
use crate::sched;

/// Newest rows scanned for the recent-detections panel.
const RECENT_ROW_SCAN: usize = 10;

/// Page visibility as reported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Dashboard tab as reported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Overview,
    Database,
    Performance,
}

/// Shared UI state the scheduler reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub visibility: Visibility,
    pub active_tab: Tab,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            visibility: Visibility::Visible,
            active_tab: Tab::Overview,
        }
    }
}

/// Entry counters for the fetch operations, for diagnostics.
#[derive(Debug, Default)]
pub struct PollStats {
    status_polls: AtomicU64,
    results_loads: AtomicU64,
    info_loads: AtomicU64,
    performance_loads: AtomicU64,
}

impl PollStats {
    pub fn snapshot(&self) -> PollCounts {
        PollCounts {
            status_polls: self.status_polls.load(Ordering::Relaxed),
            results_loads: self.results_loads.load(Ordering::Relaxed),
            info_loads: self.info_loads.load(Ordering::Relaxed),
            performance_loads: self.performance_loads.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PollStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollCounts {
    pub status_polls: u64,
    pub results_loads: u64,
    pub info_loads: u64,
    pub performance_loads: u64,
}

/// Effective timer periods, for diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IntervalReport {
    pub status_ms: u64,
    pub database_ms: u64,
    pub performance_ms: u64,
}

/// Engine state snapshot served for download.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub timestamp: String,
    pub visibility: Visibility,
    pub active_tab: Tab,
    pub update_intervals: IntervalReport,
    pub poll_counts: PollCounts,
    pub performance: Option<PerformanceSnapshot>,
    pub active_notifications: usize,
    pub api_url: String,
}

/// Shared application context.
pub struct AppContext {
    pub config: AppConfig,
    pub api: ApiClient,
    pub renderer: Arc<dyn Renderer>,
    pub notifications: NotificationSink,
    ui_tx: watch::Sender<UiState>,
    performance: RwLock<Option<PerformanceSnapshot>>,
    stats: PollStats,
    connected: AtomicBool,
}

impl AppContext {
    pub fn new(config: AppConfig, renderer: Arc<dyn Renderer>) -> Result<Arc<Self>, ApiError> {
        let api = ApiClient::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let (ui_tx, _) = watch::channel(UiState::default());

        Ok(Arc::new(Self {
            config,
            api,
            renderer,
            notifications: NotificationSink::new(),
            ui_tx,
            performance: RwLock::new(None),
            stats: PollStats::default(),
            connected: AtomicBool::new(true),
        }))
    }

    // ------------------------------------------------------------------
    // UI state
    // ------------------------------------------------------------------

    pub fn ui_state(&self) -> UiState {
        *self.ui_tx.borrow()
    }

    pub fn subscribe_ui(&self) -> watch::Receiver<UiState> {
        self.ui_tx.subscribe()
    }

    /// Apply a visibility change. Becoming visible issues one immediate
    /// status fetch on top of restoring the normal poll periods.
    pub fn set_visibility(self: &Arc<Self>, visibility: Visibility) {
        let changed = self.ui_tx.send_if_modified(|ui| {
            if ui.visibility == visibility {
                false
            } else {
                ui.visibility = visibility;
                true
            }
        });

        if !changed {
            return;
        }

        match visibility {
            Visibility::Visible => {
                info!("App: page visible, restoring update frequency");
                let ctx = Arc::clone(self);
                tokio::spawn(async move { ctx.refresh_status().await });
            }
            Visibility::Hidden => {
                info!("App: page hidden, reducing update frequency");
            }
        }
    }

    /// Apply a tab change. Entering a gated tab refreshes its data
    /// immediately; the repeating timers keep their phase.
    pub fn set_active_tab(self: &Arc<Self>, tab: Tab) {
        let changed = self.ui_tx.send_if_modified(|ui| {
            if ui.active_tab == tab {
                false
            } else {
                ui.active_tab = tab;
                true
            }
        });

        if !changed {
            return;
        }

        match tab {
            Tab::Database => {
                let ctx = Arc::clone(self);
                tokio::spawn(async move {
                    tokio::join!(ctx.refresh_results(), ctx.refresh_database_info());
                });
            }
            Tab::Performance => {
                let ctx = Arc::clone(self);
                tokio::spawn(async move { ctx.refresh_performance().await });
            }
            Tab::Overview => {}
        }
    }

    // ------------------------------------------------------------------
    // Fetch-and-render operations
    // ------------------------------------------------------------------

    /// Poll camera status and rebuild the status region.
    ///
    /// Failures are logged, not notified; connectivity transitions raise
    /// one notification per edge.
    pub async fn refresh_status(&self) {
        self.stats.status_polls.fetch_add(1, Ordering::Relaxed);

        match self.api.camera_status().await {
            Ok(resp) => {
                self.note_connected();
                if !resp.success {
                    return;
                }
                self.renderer.render_status(&resp.camera);
                if resp.neural_network.processed_frames > 0 {
                    debug!(
                        "Status: neural network processed {} frames, avg {:.4}s",
                        resp.neural_network.processed_frames,
                        resp.neural_network.average_processing_time
                    );
                }
                debug!(
                    "Status: service config target_fps={} analysis_interval={}",
                    resp.config.target_fps, resp.config.analysis_interval
                );
            }
            Err(e) => {
                error!("Status: poll failed: {}", e);
                self.note_disconnected();
            }
        }
    }

    /// Load stored results and rebuild the table and recent-detections
    /// regions.
    pub async fn refresh_results(&self) {
        self.stats.results_loads.fetch_add(1, Ordering::Relaxed);

        match self.api.database_results(self.config.results_limit).await {
            Ok(resp) if resp.success => {
                let recent = &resp.data[..resp.data.len().min(RECENT_ROW_SCAN)];
                self.renderer.render_results_table(&resp.data);
                self.renderer.render_recent_detections(recent);
            }
            Ok(_) => {
                self.notifications.error("Failed to load database data");
            }
            Err(e) => {
                error!("Results: load failed: {}", e);
                self.notifications
                    .error(format!("Database connection error: {}", e));
            }
        }
    }

    /// Load storage statistics. Failures are logged only.
    pub async fn refresh_database_info(&self) {
        self.stats.info_loads.fetch_add(1, Ordering::Relaxed);

        match self.api.database_info().await {
            Ok(resp) if resp.success => self.renderer.render_database_info(&resp.data),
            Ok(_) => {}
            Err(e) => error!("Database info: load failed: {}", e),
        }
    }

    /// Load performance metrics, rebuild the indicator and recommendation
    /// regions and retain the snapshot for diagnostics.
    pub async fn refresh_performance(&self) {
        self.stats.performance_loads.fetch_add(1, Ordering::Relaxed);

        match self.api.camera_performance().await {
            Ok(resp) if resp.success => {
                self.renderer.render_performance(&resp.data);
                self.renderer.render_recommendations(&resp.recommendations);
                *self.performance.write().unwrap() = Some(resp.data);
            }
            Ok(_) => {
                self.notifications.error("Failed to load performance data");
            }
            Err(e) => {
                error!("Performance: load failed: {}", e);
                self.notifications
                    .error(format!("Performance API connection error: {}", e));
            }
        }
    }

    /// Refresh status, results and performance at once.
    pub async fn force_update(&self) {
        info!("App: forced refresh of all regions");
        tokio::join!(
            self.refresh_status(),
            self.refresh_results(),
            self.refresh_performance()
        );
    }

    // ------------------------------------------------------------------
    // Control actions
    // ------------------------------------------------------------------

    pub async fn start_camera(&self) -> bool {
        info!("App: starting camera analysis");
        let result = self.api.start_camera().await;
        self.report_action(
            result,
            Some("Camera analysis started"),
            "Unknown error",
            "Failed to start camera",
        )
    }

    pub async fn stop_camera(&self) -> bool {
        info!("App: stopping camera analysis");
        let result = self.api.stop_camera().await;
        self.report_action(
            result,
            Some("Camera analysis stopped"),
            "Unknown error",
            "Failed to stop camera",
        )
    }

    pub async fn restart_camera(&self) -> bool {
        info!("App: restarting camera");
        let result = self.api.restart_camera().await;
        self.report_action(
            result,
            Some("Camera restarted"),
            "Unknown error",
            "Failed to restart camera",
        )
    }

    /// Reset inference statistics; success refreshes the performance view.
    pub async fn reset_statistics(&self) -> bool {
        info!("App: resetting neural statistics");
        let result = self.api.reset_statistics().await;
        let ok = self.report_action(
            result,
            Some("Statistics reset"),
            "Failed to reset statistics",
            "Failed to reset statistics",
        );
        if ok {
            self.refresh_performance().await;
        }
        ok
    }

    /// Remove old stored records; success refreshes the table and the
    /// storage statistics.
    pub async fn cleanup_database(&self) -> bool {
        info!("App: cleaning up old database records");
        let result = self.api.cleanup_database().await;

        if let Ok(resp) = &result {
            if let Some(count) = resp.deleted_count {
                info!("App: cleanup removed {} records", count);
            }
        }

        let ok = self.report_action(
            result,
            None,
            "Failed to clean up data",
            "Failed to clean up database",
        );
        if ok {
            tokio::join!(self.refresh_results(), self.refresh_database_info());
        }
        ok
    }

    /// Route an action outcome to the notification sink.
    ///
    /// `success_message` of `None` forwards the server's message on
    /// success. Failure uses the server message when present, the fallback
    /// otherwise; transport failures carry the prefixed reason.
    fn report_action(
        &self,
        result: Result<ActionResponse, ApiError>,
        success_message: Option<&str>,
        failure_fallback: &str,
        transport_prefix: &str,
    ) -> bool {
        match result {
            Ok(resp) if resp.success => {
                let message = match success_message {
                    Some(fixed) => fixed.to_string(),
                    None if resp.message.is_empty() => "Old records removed".to_string(),
                    None => resp.message,
                };
                self.notifications.success(message);
                true
            }
            Ok(resp) => {
                let message = if resp.message.is_empty() {
                    failure_fallback.to_string()
                } else {
                    resp.message
                };
                self.notifications.error(message);
                false
            }
            Err(e) => {
                error!("Action: {}: {}", transport_prefix, e);
                self.notifications
                    .error(format!("{}: {}", transport_prefix, e));
                false
            }
        }
    }

    fn note_connected(&self) {
        if !self.connected.swap(true, Ordering::Relaxed) {
            self.notifications
                .success("Connection to camera service restored");
        }
    }

    fn note_disconnected(&self) {
        if self.connected.swap(false, Ordering::Relaxed) {
            self.notifications
                .warning("Connection to camera service lost");
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn poll_counts(&self) -> PollCounts {
        self.stats.snapshot()
    }

    pub fn last_performance(&self) -> Option<PerformanceSnapshot> {
        self.performance.read().unwrap().clone()
    }

    pub fn diagnostics(&self) -> DiagnosticsReport {
        let ui = self.ui_state();
        DiagnosticsReport {
            timestamp: Utc::now().to_rfc3339(),
            visibility: ui.visibility,
            active_tab: ui.active_tab,
            update_intervals: IntervalReport {
                status_ms: sched::status_period(ui.visibility).as_millis() as u64,
                database_ms: sched::DATABASE_PERIOD.as_millis() as u64,
                performance_ms: sched::performance_period(ui.visibility).as_millis() as u64,
            },
            poll_counts: self.poll_counts(),
            performance: self.last_performance(),
            active_notifications: self.notifications.active().len(),
            api_url: self.config.api_url.clone(),
        }
    }
}
