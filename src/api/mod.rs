//! HTTP collaborators: the settings service and its token validator.

pub mod auth;
pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use types::{CreateSettingsRequest, Setting};

/// Header carrying the stored credential on every settings call.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Message shown for transport failures and undecodable responses.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Settings operations the views depend on.
///
/// Implemented over HTTP by [`client::SettingsClient`]; tests substitute an
/// in-memory service.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Setting>, AppError>;

    async fn get_by_key(&self, key: &str) -> Result<Setting, AppError>;

    async fn create(&self, request: &CreateSettingsRequest) -> Result<(), AppError>;

    async fn update(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn delete_by_key(&self, key: &str) -> Result<(), AppError>;
}

/// Shared `reqwest` client with the configured per-request timeout.
pub fn build_http(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))
}

/// Convert any transport error into the normalised network error.
fn network_err(e: impl std::fmt::Display) -> AppError {
    tracing::warn!(error = %e, "settings service request failed");
    AppError::Network(UNEXPECTED_ERROR.to_string())
}
