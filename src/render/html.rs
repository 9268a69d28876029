//! HTML region renderer.
//!
//! Builds the dashboard's region fragments with plain string formatting
//! (the same replacement idiom the page templates use) and keeps the latest
//! fragments in a shared set for the web surface to snapshot. Everything
//! interpolated from upstream payloads is escaped.

use std::sync::RwLock;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use super::{classify, classify_inverse, Renderer};
use crate::model::{CameraStatus, DatabaseInfo, DetectionRecord, PerformanceSnapshot, ResultRow};
use crate::normalize::normalize;

/// Rows with detections shown in the recent-detections panel.
const MAX_DETECTION_ROWS: usize = 5;

// (warning, good) threshold pairs per indicator. Frames-per-analysis keeps
// the service's inverted pair; error rate uses lower-is-better bucketing.
const AVG_FPS_LIMITS: (f64, f64) = (20.0, 25.0);
const EFFICIENCY_LIMITS: (f64, f64) = (70.0, 90.0);
const FRAMES_PER_ANALYSIS_LIMITS: (f64, f64) = (30.0, 25.0);
const ERROR_RATE_LIMITS: (f64, f64) = (5.0, 1.0);

/// The latest rendered fragment for every dashboard region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionSet {
    pub status: String,
    pub performance: String,
    pub recommendations: String,
    pub results_table: String,
    pub recent_detections: String,
    pub database_info: String,
}

impl Default for RegionSet {
    fn default() -> Self {
        Self {
            status: status_html(&CameraStatus::default()),
            performance: performance_html(&PerformanceSnapshot::default()),
            recommendations: recommendations_html(&[]),
            results_table: results_table_html(&[]),
            recent_detections: recent_detections_html(&[]),
            database_info: database_info_html(&DatabaseInfo::default()),
        }
    }
}

/// [`Renderer`] that rebuilds HTML fragments into a shared region set.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    regions: RwLock<RegionSet>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current region set, for the view endpoint.
    pub fn snapshot(&self) -> RegionSet {
        self.regions.read().unwrap().clone()
    }
}

impl Renderer for HtmlRenderer {
    fn render_status(&self, status: &CameraStatus) {
        self.regions.write().unwrap().status = status_html(status);
    }

    fn render_performance(&self, perf: &PerformanceSnapshot) {
        self.regions.write().unwrap().performance = performance_html(perf);
    }

    fn render_recommendations(&self, recommendations: &[String]) {
        self.regions.write().unwrap().recommendations = recommendations_html(recommendations);
    }

    fn render_results_table(&self, rows: &[ResultRow]) {
        self.regions.write().unwrap().results_table = results_table_html(rows);
    }

    fn render_recent_detections(&self, rows: &[ResultRow]) {
        self.regions.write().unwrap().recent_detections = recent_detections_html(rows);
    }

    fn render_database_info(&self, info: &DatabaseInfo) {
        self.regions.write().unwrap().database_info = database_info_html(info);
    }
}

// ============================================================================
// Region builders
// ============================================================================

fn status_html(status: &CameraStatus) -> String {
    let (status_class, status_text) = if status.active {
        ("status-active", "Analysis active")
    } else {
        ("status-inactive", "Stopped")
    };

    let efficiency_class = if status.efficiency >= 90.0 {
        "status-active"
    } else if status.efficiency >= 70.0 {
        "status-warning"
    } else {
        "status-inactive"
    };

    let mut html = format!(
        concat!(
            r#"<div class="status-banner"><span class="status-indicator {status_class}"></span>{status_text}</div>"#,
            r#"<div class="status-row"><span class="status-label">Efficiency</span>"#,
            r#"<span class="status-value {efficiency_class}">{efficiency:.1}%</span></div>"#,
            r#"<div class="metric-grid">"#,
            r#"<div class="metric"><span class="metric-label">Frames received</span><span class="metric-value">{frames}</span></div>"#,
            r#"<div class="metric"><span class="metric-label">Frames analyzed</span><span class="metric-value">{analyzed}</span></div>"#,
            r#"<div class="metric"><span class="metric-label">Current FPS</span><span class="metric-value">{fps:.1}</span></div>"#,
            r#"<div class="metric"><span class="metric-label">Analyses per second</span><span class="metric-value">{rate:.2}</span></div>"#,
            r#"<div class="metric"><span class="metric-label">Uptime</span><span class="metric-value">{uptime}</span></div>"#,
            r#"<div class="metric"><span class="metric-label">Errors</span><span class="metric-value">{errors}</span></div>"#,
            r#"</div>"#
        ),
        status_class = status_class,
        status_text = status_text,
        efficiency_class = efficiency_class,
        efficiency = status.efficiency,
        frames = status.frame_count,
        analyzed = status.analyzed_frame_count,
        fps = status.current_fps,
        rate = status.analysis_rate,
        uptime = format_uptime(status.uptime),
        errors = status.error_count,
    );

    // Live strip only while the camera runs.
    if status.active {
        html.push_str(&format!(
            concat!(
                r#"<div class="camera-stats">"#,
                r#"<div class="camera-stat">Received: {frames}</div>"#,
                r#"<div class="camera-stat">Analyzed: {analyzed}</div>"#,
                r#"<div class="camera-stat">FPS: {fps:.1}/{target:.0}</div>"#,
                r#"<div class="camera-stat">Analyses/sec: {rate:.2}</div>"#,
                r#"<div class="camera-stat">Efficiency: {efficiency:.1}%</div>"#,
                r#"<div class="camera-stat">Errors: {errors}</div>"#,
                r#"</div>"#
            ),
            frames = status.frame_count,
            analyzed = status.analyzed_frame_count,
            fps = status.current_fps,
            target = status.target_fps,
            rate = status.analysis_rate,
            efficiency = status.efficiency,
            errors = status.error_count,
        ));
    }

    html
}

fn performance_html(perf: &PerformanceSnapshot) -> String {
    let indicator = |label: &str, value: String, class: &str| {
        format!(
            r#"<div class="perf-indicator"><span class="perf-label">{}</span><span class="perf-value {}">{}</span></div>"#,
            label, class, value
        )
    };

    let (fps_warn, fps_good) = AVG_FPS_LIMITS;
    let (eff_warn, eff_good) = EFFICIENCY_LIMITS;
    let (fpa_warn, fpa_good) = FRAMES_PER_ANALYSIS_LIMITS;
    let (err_warn, err_good) = ERROR_RATE_LIMITS;

    let mut html = String::from(r#"<div class="perf-grid">"#);
    html.push_str(&indicator(
        "Average FPS",
        format!("{:.1}", perf.average_fps),
        classify(perf.average_fps, fps_warn, fps_good).css_class(),
    ));
    html.push_str(&indicator(
        "Analysis efficiency",
        format!("{:.1}%", perf.analysis_efficiency_percent),
        classify(perf.analysis_efficiency_percent, eff_warn, eff_good).css_class(),
    ));
    html.push_str(&indicator(
        "Frames per analysis",
        format!("{:.1}", perf.frames_per_analysis),
        classify(perf.frames_per_analysis, fpa_warn, fpa_good).css_class(),
    ));
    html.push_str(&indicator(
        "Error rate",
        format!("{:.2}%", perf.error_rate_percent),
        classify_inverse(perf.error_rate_percent, err_warn, err_good).css_class(),
    ));
    html.push_str("</div>");
    html
}

fn recommendations_html(recommendations: &[String]) -> String {
    if recommendations.is_empty() {
        return r#"<div class="recommendation-item ok">System is operating optimally</div>"#
            .to_string();
    }

    let mut html = String::new();
    for text in recommendations {
        html.push_str(&format!(
            r#"<div class="recommendation-item">{}</div>"#,
            html_escape(text)
        ));
    }
    html
}

fn results_table_html(rows: &[ResultRow]) -> String {
    if rows.is_empty() {
        return concat!(
            r#"<tr><td colspan="4"><div class="empty-state">"#,
            r#"<h3>No data</h3><p>Analysis results will appear here</p>"#,
            r#"</div></td></tr>"#
        )
        .to_string();
    }

    let mut html = String::new();
    for row in rows {
        let records = normalize(row.detection_results.as_ref());

        let objects_cell = if records.is_empty() {
            r#"<span class="muted">No objects</span>"#.to_string()
        } else {
            let mut tags = String::from(r#"<div class="object-list">"#);
            for (object_type, count) in group_object_types(&records) {
                let label = if count > 1 {
                    format!("{} ({})", object_type, count)
                } else {
                    object_type.clone()
                };
                tags.push_str(&format!(
                    r#"<span class="object-tag {}">{}</span>"#,
                    html_escape(&object_type),
                    html_escape(&label)
                ));
            }
            tags.push_str("</div>");
            tags
        };

        let processing = match row.processing_time {
            Some(seconds) => format!("<br><small>{:.0} ms</small>", seconds * 1000.0),
            None => String::new(),
        };

        html.push_str(&format!(
            concat!(
                r#"<tr class="fade-in">"#,
                r#"<td>{id}</td>"#,
                r#"<td title="Created: {created}">{time}</td>"#,
                r#"<td>{objects}</td>"#,
                r#"<td><strong>{count}</strong>{processing}</td>"#,
                r#"</tr>"#
            ),
            id = row.id,
            created = html_escape(&format_datetime(row.created_at.as_deref())),
            time = html_escape(&format_datetime(row.timestamp.as_deref())),
            objects = objects_cell,
            count = records.len(),
            processing = processing,
        ));
    }
    html
}

fn recent_detections_html(rows: &[ResultRow]) -> String {
    if rows.is_empty() {
        return concat!(
            r#"<div class="empty-state"><i>&#128269;</i>"#,
            r#"<h3>No detection results</h3>"#,
            r#"<p>Analysis results will appear here</p></div>"#
        )
        .to_string();
    }

    let rows_with_objects: Vec<(&ResultRow, Vec<DetectionRecord>)> = rows
        .iter()
        .map(|row| (row, normalize(row.detection_results.as_ref())))
        .filter(|(_, records)| !records.is_empty())
        .take(MAX_DETECTION_ROWS)
        .collect();

    if rows_with_objects.is_empty() {
        return concat!(
            r#"<div class="empty-state"><i>&#128269;</i>"#,
            r#"<h3>No objects in recent frames</h3>"#,
            r#"<p>Frames are analyzed but no objects are detected</p></div>"#
        )
        .to_string();
    }

    let mut html = String::new();
    for (row, records) in rows_with_objects {
        for record in records {
            let object_type = if record.object_type.is_empty() {
                "unknown"
            } else {
                record.object_type.as_str()
            };

            let bbox = record
                .bbox
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            // A record without its own timestamp inherits the row's.
            let time = record
                .timestamp
                .as_deref()
                .or(row.timestamp.as_deref());

            let frame_size = match &record.frame_size {
                Some(dims) => {
                    let joined = dims
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join("x");
                    format!("<span>Frame: {}</span>", joined)
                }
                None => String::new(),
            };

            html.push_str(&format!(
                concat!(
                    r#"<div class="detection-item">"#,
                    r#"<div class="detection-item-header">"#,
                    r#"<span class="detection-type">{object_type}</span>"#,
                    r#"<span class="detection-confidence {class}">{confidence:.1}%</span>"#,
                    r#"</div>"#,
                    r#"<div class="detection-details">"#,
                    r#"<span>Box: [{bbox}]</span>"#,
                    r#"<span>Time: {time}</span>"#,
                    r#"{frame_size}"#,
                    r#"</div>"#,
                    r#"</div>"#
                ),
                object_type = html_escape(object_type),
                class = confidence_class(record.confidence),
                confidence = record.confidence * 100.0,
                bbox = bbox,
                time = html_escape(&format_time(time)),
                frame_size = frame_size,
            ));
        }
    }
    html
}

fn database_info_html(info: &DatabaseInfo) -> String {
    let size = if info.database_size.is_empty() {
        "-"
    } else {
        info.database_size.as_str()
    };

    format!(
        concat!(
            r#"<div class="db-stat"><span class="db-stat-label">Records</span>"#,
            r#"<span class="db-stat-value">{count}</span></div>"#,
            r#"<div class="db-stat"><span class="db-stat-label">Database size</span>"#,
            r#"<span class="db-stat-value">{size}</span></div>"#,
            r#"<div class="db-stat"><span class="db-stat-label">Last activity</span>"#,
            r#"<span class="db-stat-value">{activity}</span></div>"#
        ),
        count = info.results_count,
        size = html_escape(size),
        activity = html_escape(&format_datetime(info.last_activity.as_deref())),
    )
}

// ============================================================================
// Formatting helpers
// ============================================================================

fn confidence_class(confidence: f64) -> &'static str {
    if confidence > 0.8 {
        "high"
    } else if confidence > 0.6 {
        "medium"
    } else {
        "low"
    }
}

/// Seconds to zero-padded `HH:MM:SS`. Hours do not wrap.
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse the timestamp formats the service has emitted over time.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .ok()
}

/// Full date and time for table cells; unparseable input passes through.
fn format_datetime(value: Option<&str>) -> String {
    match value {
        None => "-".to_string(),
        Some(s) => match parse_timestamp(s) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => s.to_string(),
        },
    }
}

/// Time of day for detection entries; unparseable input passes through.
fn format_time(value: Option<&str>) -> String {
    match value {
        None => "-".to_string(),
        Some(s) => match parse_timestamp(s) {
            Some(dt) => dt.format("%H:%M:%S").to_string(),
            None => s.to_string(),
        },
    }
}

/// Grouped object-type counts in first-seen order. Empty types count as
/// "unknown".
fn group_object_types(records: &[DetectionRecord]) -> Vec<(String, usize)> {
    let mut groups: Vec<(String, usize)> = Vec::new();
    for record in records {
        let object_type = if record.object_type.is_empty() {
            "unknown"
        } else {
            record.object_type.as_str()
        };
        match groups.iter_mut().find(|(t, _)| t == object_type) {
            Some((_, count)) => *count += 1,
            None => groups.push((object_type.to_string(), 1)),
        }
    }
    groups
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
