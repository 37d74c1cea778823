use super::{CredentialStore, TokenValidator};
use crate::views::Route;

/// Where the gate stands for the current protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Check in progress; content is suspended.
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// Guards every settings route behind a validated credential.
///
/// Re-checked on each entry to a protected route. A credential that fails
/// validation for any reason, including a transport error, is removed from
/// the store.
#[derive(Debug)]
pub struct AuthGate {
    state: GateState,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Unknown,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Run the entry check for a protected route.
    ///
    /// An empty slot resolves to `Unauthenticated` without any network call.
    pub async fn check(
        &mut self,
        store: &dyn CredentialStore,
        validator: &dyn TokenValidator,
    ) -> GateState {
        self.state = GateState::Unknown;

        let Some(token) = store.load() else {
            tracing::debug!("No stored auth token");
            self.state = GateState::Unauthenticated;
            return self.state;
        };

        self.state = match validator.validate(&token).await {
            Ok(()) => GateState::Authenticated,
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Stored auth token failed validation: {}", e);
                store.clear();
                GateState::Unauthenticated
            }
        };
        self.state
    }

    /// Drop the credential after the service rejected it mid-session, or on logout.
    pub fn revoke(&mut self, store: &dyn CredentialStore) {
        store.clear();
        self.state = GateState::Unauthenticated;
    }

    /// Route to send the session to instead of the protected content.
    pub fn redirect(&self) -> Option<Route> {
        match self.state {
            GateState::Unauthenticated => Some(Route::Auth),
            GateState::Unknown | GateState::Authenticated => None,
        }
    }

    /// Placeholder shown while the check is pending.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.state {
            GateState::Unknown => Some("Checking credentials..."),
            GateState::Authenticated | GateState::Unauthenticated => None,
        }
    }
}
