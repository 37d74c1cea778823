use async_trait::async_trait;

use super::network_err;
use super::types::ValidateTokenBody;
use crate::auth::{AuthToken, TokenValidator};
use crate::error::AppError;

/// Client for the service's token validation endpoint.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TokenValidator for AuthClient {
    /// `POST /auth/validate-token` -- any non-2xx means the token is invalid.
    async fn validate(&self, token: &AuthToken) -> Result<(), AppError> {
        let resp = self
            .http
            .post(format!("{}/auth/validate-token", self.base_url))
            .json(&ValidateTokenBody { token: token.expose() })
            .send()
            .await
            .map_err(network_err)?;

        if !resp.status().is_success() {
            tracing::info!(status = resp.status().as_u16(), "token rejected by service");
            return Err(AppError::Auth("Invalid token".into()));
        }
        Ok(())
    }
}
