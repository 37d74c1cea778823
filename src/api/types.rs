use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::ValueType;

// ============================================================================
// Response types
// ============================================================================

/// A setting as owned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub value: String,
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Setting {
    /// Recency used for ordering. Older service revisions only stamp creation.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// `{ "message": ... }` body the service returns on errors and acks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSettingsRequest {
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub value: String,
}

/// Type and key are immutable after creation, so only the value travels.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateSettingsRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSettingsRequest {
    pub keys: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct ValidateTokenBody<'a> {
    pub token: &'a str,
}
