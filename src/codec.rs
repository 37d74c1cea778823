//! Value types and their textual encoding.
//!
//! A setting's value always travels as text; the declared [`ValueType`]
//! decides which input widget edits it, what its default is, and whether the
//! client validates it before submission. Only JSON is validated here. Numeric
//! text is left to the service, which rejects malformed numbers with a 422.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The service refuses longer keys.
pub const MAX_KEY_LENGTH: usize = 1024;
/// The service refuses longer values.
pub const MAX_VALUE_LENGTH: usize = 65536;

const BOOL_CHOICES: &[&str] = &["true", "false"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueType {
    #[default]
    #[serde(rename = "str", alias = "string")]
    Str,
    #[serde(rename = "int", alias = "integer")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "bool", alias = "boolean")]
    Bool,
    #[serde(rename = "json")]
    Json,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        ValueType::Str,
        ValueType::Int,
        ValueType::Float,
        ValueType::Bool,
        ValueType::Json,
    ];

    /// Name used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Json => "json",
        }
    }

    /// Name shown to the operator.
    pub fn label(self) -> &'static str {
        match self {
            ValueType::Str => "string",
            ValueType::Int => "integer",
            ValueType::Float => "float",
            ValueType::Bool => "boolean",
            ValueType::Json => "json",
        }
    }

    /// Canonical value a fresh field of this type starts with.
    pub fn default_value(self) -> &'static str {
        match self {
            ValueType::Str => "",
            ValueType::Int => "0",
            ValueType::Float => "0.0",
            ValueType::Bool => "false",
            ValueType::Json => "{}",
        }
    }

    pub fn input_kind(self) -> InputKind {
        match self {
            ValueType::Str => InputKind::Text,
            ValueType::Int => InputKind::Number { step: "1" },
            ValueType::Float => InputKind::Number { step: "0.1" },
            ValueType::Bool => InputKind::Choice(BOOL_CHOICES),
            ValueType::Json => InputKind::Json,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ValueType {
    type Err = AppError;

    /// Accepts both wire and display names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ValueType::ALL
            .into_iter()
            .find(|t| t.wire_name() == lowered || t.label() == lowered)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown type '{s}'. Expected one of: string, integer, float, boolean, json"
                ))
            })
    }
}

/// Which widget edits a value of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    /// Numeric entry; `step` is the widget granularity, not a validation rule.
    Number { step: &'static str },
    /// Mutually exclusive literal choices.
    Choice(&'static [&'static str]),
    Json,
}

/// Parse `raw` as JSON, returning the inline error message on failure.
pub fn validate_json(raw: &str) -> Result<(), String> {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(|_| ())
        .map_err(|e| format!("Invalid JSON: {e}"))
}

/// Length limits enforced by the service, checked before submitting.
pub fn check_limits(key: &str, value: &str) -> Result<(), AppError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(AppError::Validation(format!(
            "Key length should be less than {MAX_KEY_LENGTH} bytes"
        )));
    }
    if value.len() > MAX_VALUE_LENGTH {
        return Err(AppError::Validation(format!(
            "Value length should be less than {MAX_VALUE_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// A setting value decoded according to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(serde_json::Value),
}

impl TypedValue {
    pub fn decode(value_type: ValueType, raw: &str) -> Result<Self, AppError> {
        let invalid = || AppError::Validation(format!("Value '{raw}' is not a valid {}", value_type.label()));
        match value_type {
            ValueType::Str => Ok(TypedValue::Str(raw.to_string())),
            ValueType::Int => raw.trim().parse().map(TypedValue::Int).map_err(|_| invalid()),
            ValueType::Float => raw.trim().parse().map(TypedValue::Float).map_err(|_| invalid()),
            ValueType::Bool => match raw {
                "true" => Ok(TypedValue::Bool(true)),
                "false" => Ok(TypedValue::Bool(false)),
                _ => Err(invalid()),
            },
            ValueType::Json => serde_json::from_str(raw).map(TypedValue::Json).map_err(|_| invalid()),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Str(_) => ValueType::Str,
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::Bool(_) => ValueType::Bool,
            TypedValue::Json(_) => ValueType::Json,
        }
    }

    /// Wire text for this value.
    pub fn encode(&self) -> String {
        match self {
            TypedValue::Str(s) => s.clone(),
            TypedValue::Int(n) => n.to_string(),
            TypedValue::Float(x) => format!("{x:?}"),
            TypedValue::Bool(b) => b.to_string(),
            TypedValue::Json(v) => v.to_string(),
        }
    }

    /// Multi-line text for read-only display. JSON is pretty-printed.
    pub fn display(&self) -> String {
        match self {
            TypedValue::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
            other => other.encode(),
        }
    }
}

/// Editing state for one value field, including the JSON and boolean
/// side-channels the forms consult before enabling submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEditor {
    value_type: ValueType,
    raw: String,
    json_error: Option<String>,
}

impl ValueEditor {
    /// Fresh editor holding the type's default value.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            raw: value_type.default_value().to_string(),
            json_error: None,
        }
    }

    /// Editor seeded with an existing value.
    pub fn with_value(value_type: ValueType, raw: &str) -> Self {
        let mut editor = Self {
            value_type,
            raw: String::new(),
            json_error: None,
        };
        editor.assign(raw.to_string());
        editor
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn json_error(&self) -> Option<&str> {
        self.json_error.as_deref()
    }

    /// Current boolean choice, if the field is boolean.
    pub fn bool_choice(&self) -> Option<bool> {
        match self.value_type {
            ValueType::Bool => Some(self.raw == "true"),
            _ => None,
        }
    }

    /// Switch type. Always discards the previous value.
    pub fn set_type(&mut self, value_type: ValueType) {
        *self = Self::new(value_type);
    }

    /// Replace the raw text.
    ///
    /// Boolean fields only take the two literals; anything else is refused and
    /// the current choice is kept. JSON is re-validated on every change.
    pub fn set_raw(&mut self, raw: &str) -> Result<(), AppError> {
        if self.value_type == ValueType::Bool {
            let lowered = raw.trim().to_ascii_lowercase();
            if !BOOL_CHOICES.contains(&lowered.as_str()) {
                return Err(AppError::Validation("Boolean value must be true or false".into()));
            }
            self.choose_bool(lowered == "true");
            return Ok(());
        }
        self.assign(raw.to_string());
        Ok(())
    }

    pub fn choose_bool(&mut self, value: bool) {
        self.raw = value.to_string();
    }

    /// Value is non-blank and, for JSON, parses.
    pub fn is_submittable(&self) -> bool {
        !self.raw.trim().is_empty() && self.json_error.is_none()
    }

    /// Text rendering of the input widget for the console.
    pub fn render_input(&self, disabled: bool) -> String {
        let lock = if disabled { " (read-only)" } else { "" };
        match self.value_type.input_kind() {
            InputKind::Choice(options) => {
                let marks: Vec<String> = options
                    .iter()
                    .map(|opt| {
                        let mark = if *opt == self.raw { "(*)" } else { "( )" };
                        format!("{mark} {opt}")
                    })
                    .collect();
                format!("Value{lock}: {}", marks.join("  "))
            }
            InputKind::Number { step } => format!("Value{lock} [step {step}]: {}", self.raw),
            InputKind::Json => {
                let body = match TypedValue::decode(ValueType::Json, &self.raw) {
                    Ok(v) => v.display(),
                    Err(_) => self.raw.clone(),
                };
                let mut out = format!("Value{lock} (json):\n{}", indent(&body));
                if let Some(err) = &self.json_error {
                    out.push_str(&format!("\n  ! {err}"));
                }
                out
            }
            InputKind::Text => format!("Value{lock}:\n{}", indent(&self.raw)),
        }
    }

    fn assign(&mut self, raw: String) {
        self.json_error = match self.value_type {
            ValueType::Json => validate_json(&raw).err(),
            _ => None,
        };
        self.raw = raw;
    }
}

fn indent(text: &str) -> String {
    if text.is_empty() {
        return "  ".to_string();
    }
    text.lines().map(|l| format!("  {l}")).collect::<Vec<_>>().join("\n")
}
