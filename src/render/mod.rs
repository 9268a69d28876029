//! Render layer.
//!
//! Rendering is stateless: each call fully rebuilds the region it owns from
//! the view-model it is handed, so concurrent fetches resolve to
//! last-writer-wins without partial updates. [`Renderer`] is the seam the
//! rest of the engine talks through; [`html::HtmlRenderer`] is the shipped
//! implementation.

pub mod html;

use crate::model::{CameraStatus, DatabaseInfo, PerformanceSnapshot, ResultRow};

/// Severity bucket for a performance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Warning,
    Bad,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Good => "perf-good",
            Severity::Warning => "perf-warning",
            Severity::Bad => "perf-bad",
        }
    }
}

/// Bucket a higher-is-better metric against `(warning, good)` thresholds.
pub fn classify(value: f64, warning: f64, good: f64) -> Severity {
    if value >= good {
        Severity::Good
    } else if value >= warning {
        Severity::Warning
    } else {
        Severity::Bad
    }
}

/// Bucket a lower-is-better metric (error rates) against `(warning, good)`
/// thresholds.
pub fn classify_inverse(value: f64, warning: f64, good: f64) -> Severity {
    if value <= good {
        Severity::Good
    } else if value <= warning {
        Severity::Warning
    } else {
        Severity::Bad
    }
}

/// Region rendering capability.
///
/// One method per dashboard region. Implementations replace the whole
/// region on every call and must tolerate calls in any order from any
/// task.
pub trait Renderer: Send + Sync {
    /// Camera state banner, efficiency badge, metric grid and live stats.
    fn render_status(&self, status: &CameraStatus);
    /// The four performance indicators with severity classes.
    fn render_performance(&self, perf: &PerformanceSnapshot);
    /// Tuning recommendations list, or the "operating optimally" state.
    fn render_recommendations(&self, recommendations: &[String]);
    /// Stored-results table from the latest database poll.
    fn render_results_table(&self, rows: &[ResultRow]);
    /// Per-object cards for recent rows that contain detections.
    fn render_recent_detections(&self, rows: &[ResultRow]);
    /// Record count, size and last-activity panel.
    fn render_database_info(&self, info: &DatabaseInfo);
}
