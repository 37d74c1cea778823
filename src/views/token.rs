use super::Route;
use crate::auth::{AuthToken, CredentialStore, TokenValidator};
use crate::error::AppError;

/// Token entry page. No rate limiting; the operator may retry freely.
#[derive(Debug, Default)]
pub struct TokenView {
    input: String,
    error: Option<String>,
    loading: bool,
}

impl TokenView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, raw: &str) {
        self.input = raw.to_string();
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Validate the entered token and persist it on success.
    pub async fn submit(
        &mut self,
        store: &dyn CredentialStore,
        validator: &dyn TokenValidator,
    ) -> Result<Route, AppError> {
        let token = match AuthToken::new(&self.input) {
            Some(token) if !self.loading => token,
            _ => return Err(AppError::Validation("Enter a token first".into())),
        };

        self.loading = true;
        self.error = None;
        let outcome = validator.validate(&token).await;
        self.loading = false;

        match outcome.and_then(|()| store.store(&token)) {
            Ok(()) => {
                tracing::info!("Auth token accepted");
                Ok(Route::List)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Enter Authentication Token\n\n");
        let shown = "*".repeat(self.input.trim().chars().count());
        out.push_str(&format!("Token: {shown}\n"));
        out.push_str(if self.loading {
            "[Validating...]"
        } else if self.can_submit() {
            "[Submit]"
        } else {
            "[Submit] (disabled)"
        });
        if let Some(err) = &self.error {
            out.push_str(&format!("\n! {err}"));
        }
        out
    }
}
