//! Configuration module for FrameWatch.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP port for the dashboard server (default: 8090)
    pub http_port: u16,
    /// Base URL of the camera service API (default: "http://localhost:8000")
    pub api_url: String,
    /// Timeout for outbound API requests, in seconds (default: 10)
    pub request_timeout_secs: u64,
    /// Number of result rows requested per database poll (default: 50)
    pub results_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: 8090,
            api_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 10,
            results_limit: 50,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FRAMEWATCH_HTTP_PORT`: dashboard port (default: 8090)
    /// - `FRAMEWATCH_API_URL`: camera service base URL (default: "http://localhost:8000")
    /// - `FRAMEWATCH_REQUEST_TIMEOUT_SECS`: outbound request timeout (default: 10)
    /// - `FRAMEWATCH_RESULTS_LIMIT`: rows per database poll (default: 50)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("FRAMEWATCH_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(api_url) = env::var("FRAMEWATCH_API_URL") {
            cfg.api_url = api_url.trim_end_matches('/').to_string();
        }

        if let Ok(timeout_str) = env::var("FRAMEWATCH_REQUEST_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout_str.parse() {
                cfg.request_timeout_secs = timeout;
            }
        }

        if let Ok(limit_str) = env::var("FRAMEWATCH_RESULTS_LIMIT") {
            if let Ok(limit) = limit_str.parse() {
                cfg.results_limit = limit;
            }
        }

        cfg
    }
}
