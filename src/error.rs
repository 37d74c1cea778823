/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
///
/// The `Display` text of each variant is exactly what a view shows inline, so
/// variants carry the user-facing message rather than a prefix.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client-side input problem. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// Missing or rejected credential.
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    /// Non-2xx response from the settings service.
    #[error("{0}")]
    Remote(String),

    /// Transport or decoding failure.
    #[error("{0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AppError {
    /// Stable tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Auth(_) => "auth",
            AppError::NotFound(_) => "not_found",
            AppError::Remote(_) => "remote",
            AppError::Network(_) => "network",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Serde(_) => "serde",
        }
    }

    /// True when the caller should drop the stored credential and re-authenticate.
    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}
