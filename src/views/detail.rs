use super::Route;
use crate::api::types::Setting;
use crate::api::SettingsApi;
use crate::codec::{check_limits, TypedValue, ValueEditor};
use crate::error::AppError;
use crate::format::format_short_date;

/// View, edit and delete one setting.
///
/// Key and type are never editable. The value becomes editable only after
/// [`DetailView::start_edit`].
#[derive(Debug)]
pub struct DetailView {
    key: Option<String>,
    setting: Option<Setting>,
    editor: Option<ValueEditor>,
    editing: bool,
    confirming_delete: bool,
    error: Option<String>,
}

impl DetailView {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key,
            setting: None,
            editor: None,
            editing: false,
            confirming_delete: false,
            error: None,
        }
    }

    pub fn setting(&self) -> Option<&Setting> {
        self.setting.as_ref()
    }

    /// Current contents of the value field.
    pub fn value(&self) -> Option<&str> {
        self.editor.as_ref().map(ValueEditor::raw)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch-on-mount. A route without a key fails locally.
    pub async fn load(&mut self, api: &dyn SettingsApi) -> Result<(), AppError> {
        let Some(key) = self.key.clone() else {
            let err = AppError::Validation("Invalid setting key".into());
            self.error = Some(err.to_string());
            return Err(err);
        };

        match api.get_by_key(&key).await {
            Ok(setting) => {
                self.apply(setting);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), key = %key, "Failed to fetch setting: {}", e);
                self.setting = None;
                self.editor = None;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn apply(&mut self, setting: Setting) {
        self.editor = Some(ValueEditor::with_value(setting.value_type, &setting.value));
        self.setting = Some(setting);
        self.error = None;
    }

    pub fn start_edit(&mut self) -> Result<(), AppError> {
        if self.setting.is_none() {
            return Err(AppError::Validation("No setting loaded".into()));
        }
        self.editing = true;
        self.confirming_delete = false;
        Ok(())
    }

    pub fn set_value(&mut self, raw: &str) -> Result<(), AppError> {
        self.editable()?.set_raw(raw)
    }

    pub fn choose_bool(&mut self, value: bool) -> Result<(), AppError> {
        self.editable()?.choose_bool(value);
        Ok(())
    }

    fn editable(&mut self) -> Result<&mut ValueEditor, AppError> {
        if !self.editing {
            return Err(AppError::Validation("Value is read-only; type `edit` first".into()));
        }
        self.editor
            .as_mut()
            .ok_or_else(|| AppError::Validation("No setting loaded".into()))
    }

    /// Throw away the edit buffer and return to read-only. No network call.
    pub fn cancel_edit(&mut self) {
        if let Some(setting) = &self.setting {
            self.editor = Some(ValueEditor::with_value(setting.value_type, &setting.value));
        }
        self.editing = false;
        self.error = None;
    }

    pub fn can_update(&self) -> bool {
        self.editing && self.editor.as_ref().is_some_and(ValueEditor::is_submittable)
    }

    /// Submit the edited value, then re-fetch so the view shows what the
    /// service actually stored. On failure the edits stay in place.
    pub async fn update(&mut self, api: &dyn SettingsApi) -> Result<(), AppError> {
        if !self.can_update() {
            return Err(AppError::Validation("Nothing valid to update".into()));
        }
        let (Some(setting), Some(editor)) = (&self.setting, &self.editor) else {
            return Err(AppError::Validation("No setting loaded".into()));
        };
        let key = setting.key.clone();
        let value = editor.raw().to_string();

        check_limits(&key, &value)?;

        if let Err(e) = api.update(&key, &value).await {
            tracing::warn!(kind = e.kind(), key = %key, "Failed to update setting: {}", e);
            self.error = Some(e.to_string());
            return Err(e);
        }

        self.editing = false;
        match api.get_by_key(&key).await {
            Ok(fresh) => {
                self.apply(fresh);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), key = %key, "Failed to re-fetch updated setting: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// First step of deletion: ask for confirmation.
    pub fn request_delete(&mut self) -> Result<(), AppError> {
        if self.setting.is_none() {
            return Err(AppError::Validation("No setting loaded".into()));
        }
        self.confirming_delete = true;
        Ok(())
    }

    /// Operator said no. Nothing is sent.
    pub fn decline_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Second step of deletion. Returns the list route on success; on failure
    /// the page stays with an inline error.
    pub async fn confirm_delete(&mut self, api: &dyn SettingsApi) -> Result<Route, AppError> {
        if !self.confirming_delete {
            return Err(AppError::Validation("Delete must be confirmed first".into()));
        }
        self.confirming_delete = false;
        let Some(key) = self.setting.as_ref().map(|s| s.key.clone()) else {
            return Err(AppError::Validation("No setting loaded".into()));
        };

        match api.delete_by_key(&key).await {
            Ok(()) => Ok(Route::List),
            Err(e) => {
                tracing::warn!(kind = e.kind(), key = %key, "Failed to delete setting: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Manage Setting\n\n");
        if let Some(err) = &self.error {
            out.push_str(&format!("! {err}\n\n"));
        }

        let (Some(setting), Some(editor)) = (&self.setting, &self.editor) else {
            if self.error.is_none() {
                out.push_str("Loading setting...");
            }
            return out.trim_end().to_string();
        };

        out.push_str(&format!("Key (read-only): {}\n", setting.key));
        out.push_str(&format!("Type (read-only): {}\n", setting.value_type.label()));
        out.push_str(&editor.render_input(!self.editing));
        out.push('\n');
        if !self.editing {
            // The service validates on write, so this only trips on legacy rows.
            if let Err(e) = TypedValue::decode(setting.value_type, &setting.value) {
                out.push_str(&format!("  ! {e}\n"));
            }
        }

        if let Some(at) = setting.last_modified() {
            out.push_str(&format!("Updated: {}\n", format_short_date(at)));
        }

        if self.confirming_delete {
            out.push_str(&format!("\nDelete '{}'? [y/N]", setting.key));
        } else if self.editing {
            let update = if self.can_update() { "[Update]" } else { "[Update] (disabled)" };
            out.push_str(&format!("\n{update} [Cancel]"));
        } else {
            out.push_str("\n[Edit] [Delete]");
        }
        out
    }
}
