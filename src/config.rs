use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const ENV_API_URL: &str = "SETTINGS_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "SETTINGS_API_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "SETTINGS_ADMIN_DATA_DIR";

const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const APP_DIR_NAME: &str = "settings-admin";

/// Deployment-time configuration. Sourced from environment variables only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service base URL without a trailing slash, e.g. `http://host/api/v1`.
    pub api_url: String,
    pub timeout: Duration,
    /// Holds the credential file, logs and crash reports.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load from the process environment, honouring a `.env` file if present.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// `SETTINGS_API_URL` baked in at compile time wins over the runtime
    /// variable, so release builds stay pinned to their service.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = option_env!("SETTINGS_API_URL")
            .map(String::from)
            .or_else(|| lookup(ENV_API_URL))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_api_url(&raw_url)?;

        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
                })?;
                if secs == 0 {
                    return Err(AppError::Config(format!("{ENV_TIMEOUT_SECS} must be greater than zero")));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let data_dir = match lookup(ENV_DATA_DIR).filter(|s| !s.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .or_else(dirs::home_dir)
                .ok_or_else(|| {
                    AppError::Config(format!("Cannot resolve a data directory; set {ENV_DATA_DIR}"))
                })?
                .join(APP_DIR_NAME),
        };

        Ok(Self { api_url, timeout, data_dir })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn normalize_api_url(raw: &str) -> Result<String, AppError> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| AppError::Config(format!("{ENV_API_URL} is not a valid URL ({e}): '{raw}'")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::Config(format!(
                "{ENV_API_URL} must use http or https, got '{other}'"
            )))
        }
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
