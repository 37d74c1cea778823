use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::AuthToken;
use crate::error::AppError;

const CREDENTIALS_FILE: &str = "credentials.json";

/// The single well-known slot holding the auth token.
///
/// Writes are last-writer-wins; only the token page and the gate write it.
pub trait CredentialStore: Send + Sync {
    /// Stored token, or `None` when the slot is empty or unreadable.
    fn load(&self) -> Option<AuthToken>;

    fn store(&self, token: &AuthToken) -> Result<(), AppError>;

    /// Empty the slot. Never fails; problems are logged.
    fn clear(&self);
}

// ============================================================================
// File-backed slot
// ============================================================================

#[derive(Serialize, Deserialize)]
struct CredentialsFile {
    auth_token: String,
}

/// Token persisted as JSON in the app data directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<AuthToken> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to read credential file: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<CredentialsFile>(&content) {
            Ok(file) => AuthToken::new(&file.auth_token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring malformed credential file: {}", e);
                None
            }
        }
    }

    fn store(&self, token: &AuthToken) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string(&CredentialsFile {
            auth_token: token.expose().to_string(),
        })?;
        std::fs::write(&self.path, body)?;
        restrict_permissions(&self.path)?;
        tracing::debug!(path = %self.path.display(), "Auth token stored");
        Ok(())
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Auth token cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "Failed to clear auth token: {}", e),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

// ============================================================================
// In-memory slot
// ============================================================================

/// Process-local slot. Used by tests and by sessions that must not persist.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<AuthToken>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(AuthToken::new(token)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<AuthToken> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn store(&self, token: &AuthToken) -> Result<(), AppError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AppError::Io(std::io::Error::other("credential slot poisoned")))?;
        *slot = Some(token.clone());
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

// ============================================================================
// OS keyring slot
// ============================================================================

#[cfg(feature = "keyring")]
pub use keyring_store::KeyringCredentialStore;

#[cfg(feature = "keyring")]
mod keyring_store {
    use keyring::Entry;

    use super::{AuthToken, CredentialStore};
    use crate::error::AppError;

    const SERVICE: &str = "settings-admin";
    const KEY_TOKEN: &str = "auth_token";

    /// Token kept in the OS credential vault.
    #[derive(Default)]
    pub struct KeyringCredentialStore;

    impl CredentialStore for KeyringCredentialStore {
        fn load(&self) -> Option<AuthToken> {
            let token = Entry::new(SERVICE, KEY_TOKEN).ok()?.get_password().ok()?;
            AuthToken::new(&token)
        }

        fn store(&self, token: &AuthToken) -> Result<(), AppError> {
            Entry::new(SERVICE, KEY_TOKEN)
                .map_err(|e| AppError::Auth(format!("Keyring entry error: {e}")))?
                .set_password(token.expose())
                .map_err(|e| AppError::Auth(format!("Failed to store auth token: {e}")))?;
            Ok(())
        }

        fn clear(&self) {
            if let Ok(entry) = Entry::new(SERVICE, KEY_TOKEN) {
                let _ = entry.delete_credential();
            }
        }
    }
}
