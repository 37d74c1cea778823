use super::Route;
use crate::api::types::CreateSettingsRequest;
use crate::api::SettingsApi;
use crate::codec::{check_limits, ValueEditor, ValueType};
use crate::error::AppError;

/// New-setting form.
#[derive(Debug)]
pub struct CreateView {
    key: String,
    editor: ValueEditor,
    error: Option<String>,
}

impl Default for CreateView {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateView {
    pub fn new() -> Self {
        Self {
            key: String::new(),
            editor: ValueEditor::new(ValueType::default()),
            error: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value_type(&self) -> ValueType {
        self.editor.value_type()
    }

    pub fn value(&self) -> &str {
        self.editor.raw()
    }

    pub fn json_error(&self) -> Option<&str> {
        self.editor.json_error()
    }

    /// Last submission failure, shown under the form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_string();
    }

    /// Changing type resets the value to the new type's default.
    pub fn set_type(&mut self, value_type: ValueType) {
        self.editor.set_type(value_type);
    }

    pub fn set_value(&mut self, raw: &str) -> Result<(), AppError> {
        self.editor.set_raw(raw)
    }

    pub fn choose_bool(&mut self, value: bool) {
        self.editor.choose_bool(value);
    }

    /// Save is enabled only for a non-blank key and a non-blank, valid value.
    pub fn can_submit(&self) -> bool {
        !self.key.trim().is_empty() && self.editor.is_submittable()
    }

    /// Create the setting. On success the caller navigates to the list; on
    /// failure the message is kept inline and the form stays populated.
    pub async fn submit(&mut self, api: &dyn SettingsApi) -> Result<Route, AppError> {
        if !self.can_submit() {
            return Err(AppError::Validation(self.disabled_reason().to_string()));
        }
        self.error = None;

        let request = CreateSettingsRequest {
            key: self.key.trim().to_string(),
            value_type: self.editor.value_type(),
            value: self.editor.raw().to_string(),
        };

        check_limits(&request.key, &request.value)?;

        match api.create(&request).await {
            Ok(()) => Ok(Route::List),
            Err(e) => {
                tracing::warn!(kind = e.kind(), key = %request.key, "Failed to create setting: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn disabled_reason(&self) -> &'static str {
        if self.key.trim().is_empty() {
            "Key is required"
        } else if self.editor.json_error().is_some() {
            "Value is not valid JSON"
        } else {
            "Value is required"
        }
    }

    pub fn render(&self) -> String {
        let types: Vec<String> = ValueType::ALL
            .iter()
            .map(|t| {
                if *t == self.editor.value_type() {
                    format!("[{}]", t.label())
                } else {
                    t.label().to_string()
                }
            })
            .collect();

        let mut out = String::from("Create New Setting\n\n");
        out.push_str(&format!("Key: {}\n", self.key));
        out.push_str(&format!("Type: {}\n", types.join(" | ")));
        out.push_str(&self.editor.render_input(false));
        out.push('\n');
        out.push_str(if self.can_submit() { "\n[Save]" } else { "\n[Save] (disabled)" });
        if let Some(err) = &self.error {
            out.push_str(&format!("\n! {err}"));
        }
        out
    }
}
