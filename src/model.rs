//! View-model types for camera service payloads.
//!
//! Every type here is rebuilt from scratch on each successful poll and never
//! persisted. Fields the service omits fall back to their defaults so a
//! partial payload degrades to a zeroed view instead of a parse error;
//! unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// One detected object inside a stored analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub confidence: f64,
    /// Pixel coordinates, `[x1, y1, x2, y2]` by convention. Length is not
    /// enforced; the renderer prints whatever arrived.
    #[serde(default)]
    pub bbox: Vec<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub frame_size: Option<Vec<u32>>,
}

/// The `detection_results` column as it arrives off the wire.
///
/// The service has stored this field in several shapes over time: a JSON
/// array, a JSON-encoded string, a `{"results": [...]}` wrapper, or a bare
/// object. The untagged union captures whichever shape shows up;
/// [`crate::normalize::normalize`] folds all of them into a flat record
/// list. The trailing `Other` arm accepts any remaining JSON value, so
/// deserializing this field never fails a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDetections {
    Many(Vec<DetectionRecord>),
    Wrapped { results: Vec<DetectionRecord> },
    Encoded(String),
    One(DetectionRecord),
    Other(serde_json::Value),
}

/// One stored analysis result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub detection_results: Option<RawDetections>,
    /// Seconds spent analyzing the frame, rendered as milliseconds.
    #[serde(default)]
    pub processing_time: Option<f64>,
}

fn default_target_fps() -> f64 {
    25.0
}

/// Live camera state from `GET /api/camera/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub efficiency: f64,
    #[serde(default)]
    pub frame_count: u64,
    #[serde(default)]
    pub analyzed_frame_count: u64,
    #[serde(default)]
    pub current_fps: f64,
    #[serde(default)]
    pub analysis_rate: f64,
    /// Seconds since capture started.
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    #[serde(default)]
    pub performance: Option<PerformanceSnapshot>,
}

/// Aggregated pipeline metrics from `GET /api/camera/performance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    #[serde(default)]
    pub uptime_seconds: f64,
    #[serde(default)]
    pub total_frames: u64,
    #[serde(default)]
    pub analyzed_frames: u64,
    #[serde(default)]
    pub average_fps: f64,
    #[serde(default)]
    pub analysis_rate_per_second: f64,
    #[serde(default)]
    pub expected_analysis_rate: f64,
    #[serde(default)]
    pub analysis_efficiency_percent: f64,
    #[serde(default)]
    pub frames_per_analysis: f64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub error_rate_percent: f64,
}

/// Inference statistics, reported alongside camera status. Logged only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeuralStats {
    #[serde(default)]
    pub processed_frames: u64,
    #[serde(default)]
    pub average_processing_time: f64,
    #[serde(default)]
    pub total_processing_time: f64,
    #[serde(default)]
    pub model_loaded: bool,
}

/// Service-side pipeline configuration, reported alongside camera status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub target_fps: f64,
    #[serde(default)]
    pub analysis_interval: f64,
    #[serde(default)]
    pub expected_analysis_rate: f64,
}

/// Storage statistics from `GET /api/database/info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseInfo {
    #[serde(default)]
    pub results_count: i64,
    /// Already human-formatted by the service ("2.4 MB").
    #[serde(default)]
    pub database_size: String,
    #[serde(default)]
    pub last_activity: Option<String>,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// Envelope for `GET /api/camera/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub camera: CameraStatus,
    #[serde(default)]
    pub neural_network: NeuralStats,
    #[serde(default)]
    pub config: ServiceConfig,
}

/// Envelope for `GET /api/database/results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ResultRow>,
}

/// Envelope for `GET /api/camera/performance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: PerformanceSnapshot,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Envelope for `GET /api/database/info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: DatabaseInfo,
}

/// Envelope for every POST action endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub deleted_count: Option<i64>,
}
