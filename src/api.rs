//! HTTP client for the camera service API.
//!
//! One thin method per endpoint, no retries. Callers decide how to report
//! failures; the client only classifies them.

use std::time::Duration;

use thiserror::Error;

use crate::model::{
    ActionResponse, InfoResponse, PerformanceResponse, ResultsResponse, StatusResponse,
};

/// API call error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    Http { status: u16, url: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    fn from_send(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Client for the camera service REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client with the given base URL and per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(ApiError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /api/camera/status`
    pub async fn camera_status(&self) -> Result<StatusResponse, ApiError> {
        self.get_json("/api/camera/status").await
    }

    /// `GET /api/camera/performance`
    pub async fn camera_performance(&self) -> Result<PerformanceResponse, ApiError> {
        self.get_json("/api/camera/performance").await
    }

    /// `POST /api/camera/start`
    pub async fn start_camera(&self) -> Result<ActionResponse, ApiError> {
        self.post_json("/api/camera/start").await
    }

    /// `POST /api/camera/stop`
    pub async fn stop_camera(&self) -> Result<ActionResponse, ApiError> {
        self.post_json("/api/camera/stop").await
    }

    /// `POST /api/camera/restart`
    pub async fn restart_camera(&self) -> Result<ActionResponse, ApiError> {
        self.post_json("/api/camera/restart").await
    }

    /// `POST /api/neural/reset-statistics`
    pub async fn reset_statistics(&self) -> Result<ActionResponse, ApiError> {
        self.post_json("/api/neural/reset-statistics").await
    }

    /// `GET /api/database/results?limit=N`
    pub async fn database_results(&self, limit: u32) -> Result<ResultsResponse, ApiError> {
        self.get_json(&format!("/api/database/results?limit={}", limit))
            .await
    }

    /// `GET /api/database/info`
    pub async fn database_info(&self) -> Result<InfoResponse, ApiError> {
        self.get_json("/api/database/info").await
    }

    /// `POST /api/database/cleanup`
    pub async fn cleanup_database(&self) -> Result<ActionResponse, ApiError> {
        self.post_json("/api/database/cleanup").await
    }
}
