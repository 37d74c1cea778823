//! Credential handling: the persisted token slot and the gate in front of
//! every settings view.

pub mod gate;
pub mod store;

use std::fmt;

use async_trait::async_trait;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::AppError;

pub use gate::{AuthGate, GateState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

/// Opaque shared token. Validated by the service, never decoded here.
///
/// Wiped from memory on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Remote validate-token round-trip.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &AuthToken) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_rejected() {
        assert!(AuthToken::new("   ").is_none());
        assert_eq!(AuthToken::new(" abc \n").unwrap().expose(), "abc");
    }

    #[test]
    fn test_debug_redacts() {
        let token = AuthToken::new("super-secret").unwrap();
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
    }
}
