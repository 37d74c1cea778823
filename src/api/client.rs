use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::types::{
    CreateSettingsRequest, DeleteSettingsRequest, MessageResponse, Setting, UpdateSettingsRequest,
};
use super::{network_err, SettingsApi, API_KEY_HEADER};
use crate::auth::AuthToken;
use crate::error::AppError;

const NO_TOKEN: &str = "No auth token available";
const TOKEN_REJECTED: &str = "Auth token was rejected; please sign in again";

// ============================================================================
// SettingsClient
// ============================================================================

/// HTTP client for the settings service endpoints.
///
/// The credential is passed in at construction; every operation fails locally
/// with [`AppError::Auth`] when there is none, before touching the network.
pub struct SettingsClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<AuthToken>,
}

impl SettingsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: Option<AuthToken>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // --------------------------------------------------------------------
    // Private HTTP helpers
    // --------------------------------------------------------------------

    /// Build a request carrying the credential header.
    fn authed(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, AppError> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| AppError::Auth(NO_TOKEN.to_string()))?;
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, token.expose()))
    }

    /// Send and log; transport failures become [`AppError::Network`].
    async fn send(&self, req: reqwest::RequestBuilder, op: &'static str) -> Result<reqwest::Response, AppError> {
        let resp = req.send().await.map_err(network_err)?;
        tracing::debug!(op, status = resp.status().as_u16(), "settings service responded");
        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AppError::Auth(TOKEN_REJECTED.to_string()));
        }
        Ok(resp)
    }

    /// Error for a failed write: the service's `message` when it sent one,
    /// otherwise a status-coded fallback.
    async fn write_error(resp: reqwest::Response, action: &str) -> AppError {
        let status = resp.status().as_u16();
        let message = resp
            .json::<MessageResponse>()
            .await
            .ok()
            .map(|body| body.message)
            .filter(|m| !m.trim().is_empty());
        AppError::Remote(message.unwrap_or_else(|| format!("Failed to {action} setting (Status: {status})")))
    }

    // --------------------------------------------------------------------
    // Reads
    // --------------------------------------------------------------------

    /// `GET /settings?prefix={prefix}` -- server-side key prefix filter.
    pub async fn list_with_prefix(&self, prefix: &str) -> Result<Vec<Setting>, AppError> {
        let mut req = self.authed(Method::GET, "/settings")?;
        if !prefix.is_empty() {
            req = req.query(&[("prefix", prefix)]);
        }
        let resp = self.send(req, "list").await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote("Failed to fetch settings".into()));
        }
        resp.json().await.map_err(network_err)
    }

    /// `GET /health_check` -- unauthenticated liveness probe.
    pub async fn health(&self) -> Result<(), AppError> {
        let resp = self
            .http
            .get(format!("{}/health_check", self.base_url))
            .send()
            .await
            .map_err(network_err)?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(format!(
                "Health check failed (Status: {})",
                resp.status().as_u16()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsApi for SettingsClient {
    /// `GET /settings`
    async fn list(&self) -> Result<Vec<Setting>, AppError> {
        self.list_with_prefix("").await
    }

    /// `GET /settings/{key}`
    async fn get_by_key(&self, key: &str) -> Result<Setting, AppError> {
        let path = format!("/settings/{}", urlencoding::encode(key));
        let resp = self.send(self.authed(Method::GET, &path)?, "get").await?;
        if !resp.status().is_success() {
            return Err(AppError::NotFound("Setting not found".into()));
        }
        resp.json().await.map_err(network_err)
    }

    /// `POST /settings`
    async fn create(&self, request: &CreateSettingsRequest) -> Result<(), AppError> {
        let req = self.authed(Method::POST, "/settings")?.json(request);
        let resp = self.send(req, "create").await?;
        if !resp.status().is_success() {
            return Err(Self::write_error(resp, "create").await);
        }
        tracing::info!(key = %request.key, value_type = request.value_type.wire_name(), "setting created");
        Ok(())
    }

    /// `PUT /settings` with only key and value.
    async fn update(&self, key: &str, value: &str) -> Result<(), AppError> {
        let req = self
            .authed(Method::PUT, "/settings")?
            .json(&UpdateSettingsRequest { key, value });
        let resp = self.send(req, "update").await?;
        if !resp.status().is_success() {
            return Err(Self::write_error(resp, "update").await);
        }
        tracing::info!(key = %key, "setting updated");
        Ok(())
    }

    /// `DELETE /settings` with a single-element key batch.
    async fn delete_by_key(&self, key: &str) -> Result<(), AppError> {
        let req = self.authed(Method::DELETE, "/settings")?.json(&DeleteSettingsRequest {
            keys: vec![key.to_string()],
        });
        let resp = self.send(req, "delete").await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote("Failed to delete setting".into()));
        }
        tracing::info!(key = %key, "setting deleted");
        Ok(())
    }
}
