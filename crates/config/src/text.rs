// Text document form of job settings
//
// Only explicitly set values are written. `Unset` and `Default` both come out
// as an absent key, so a reset does not survive a trip through this form:
// reading the document back yields `Unset` for that field.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::settings::{SettingsField, SettingsModel};
use crate::tri_state::TriState;

/// Ordered key-value fields of a settings document.
pub type Document = Map<String, Value>;

/// How to treat keys that are not settings fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Unknown keys are an error. Used for user input.
    #[default]
    Strict,
    /// Unknown keys are ignored. Used for stored documents written by newer nodes.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("[settings] expected an object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("[settings] unknown field [{field}]")]
    UnknownField { field: String },
    #[error("[settings] failed to parse field [{field}]: expected {expected}, found {found}")]
    TypeMismatch {
        field: SettingsField,
        expected: &'static str,
        found: &'static str,
    },
    #[error("[settings] malformed document: {0}")]
    Malformed(String),
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// f32 -> f64 through the shortest decimal form, so 0.1f32 is written as 0.1
fn number_from_f32(value: f32) -> Option<Number> {
    value
        .to_string()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
}

// Whole numbers only, written as a number or a numeric string
fn as_integer(value: &Value) -> Option<i64> {
    let integral = |f: f64| {
        (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
    };
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().and_then(integral)),
        _ => None,
    }
}

// Finite once narrowed to f32, written as a number or a numeric string
fn as_float(value: &Value) -> Option<f32> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    float.map(|f| f as f32).filter(|f| f.is_finite())
}

fn parse_int(field: SettingsField, value: &Value) -> Result<TriState<i32>, ParseError> {
    if value.is_null() {
        return Ok(TriState::Default);
    }
    as_integer(value)
        .and_then(|i| i32::try_from(i).ok())
        .map(TriState::Value)
        .ok_or(ParseError::TypeMismatch {
            field,
            expected: "integer or null",
            found: type_name(value),
        })
}

fn parse_float(field: SettingsField, value: &Value) -> Result<TriState<f32>, ParseError> {
    if value.is_null() {
        return Ok(TriState::Default);
    }
    as_float(value)
        .map(TriState::Value)
        .ok_or(ParseError::TypeMismatch {
            field,
            expected: "float or null",
            found: type_name(value),
        })
}

fn parse_bool(field: SettingsField, value: &Value) -> Result<TriState<bool>, ParseError> {
    match value {
        Value::Null => Ok(TriState::Default),
        Value::Bool(b) => Ok(TriState::Value(*b)),
        Value::String(s) if s == "true" => Ok(TriState::Value(true)),
        Value::String(s) if s == "false" => Ok(TriState::Value(false)),
        other => Err(ParseError::TypeMismatch {
            field,
            expected: "boolean or null",
            found: type_name(other),
        }),
    }
}

impl SettingsModel {
    /// Document holding only the explicitly set fields, in fixed key order.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        if let TriState::Value(v) = self.max_page_search_size_raw() {
            doc.insert(SettingsField::MaxPageSearchSize.key().into(), Value::from(v));
        }
        // A non-finite rate has no JSON form and is left out.
        let rate = self.docs_per_second_raw();
        if let Some(n) = rate.value().and_then(|v| number_from_f32(*v)) {
            doc.insert(SettingsField::DocsPerSecond.key().into(), Value::Number(n));
        }
        if let TriState::Value(v) = self.dates_as_epoch_millis_raw() {
            doc.insert(SettingsField::DatesAsEpochMillis.key().into(), Value::Bool(v));
        }
        if let TriState::Value(v) = self.align_checkpoints_raw() {
            doc.insert(SettingsField::AlignCheckpoints.key().into(), Value::Bool(v));
        }
        doc
    }

    /// Parse a settings document.
    ///
    /// Per key: absent is `Unset`, `null` is `Default`, a value of the right
    /// type is `Value`. Ranges are not checked here; see [`SettingsModel::validate`].
    pub fn from_document(doc: &Value, mode: ParseMode) -> Result<SettingsModel, ParseError> {
        let map = doc.as_object().ok_or(ParseError::NotAnObject {
            found: type_name(doc),
        })?;

        let mut max_page_search_size = TriState::Unset;
        let mut docs_per_second = TriState::Unset;
        let mut dates_as_epoch_millis = TriState::Unset;
        let mut align_checkpoints = TriState::Unset;

        for (key, value) in map {
            match SettingsField::from_key(key) {
                Some(field @ SettingsField::MaxPageSearchSize) => {
                    max_page_search_size = parse_int(field, value)?;
                }
                Some(field @ SettingsField::DocsPerSecond) => {
                    docs_per_second = parse_float(field, value)?;
                }
                Some(field @ SettingsField::DatesAsEpochMillis) => {
                    dates_as_epoch_millis = parse_bool(field, value)?;
                }
                Some(field @ SettingsField::AlignCheckpoints) => {
                    align_checkpoints = parse_bool(field, value)?;
                }
                None => match mode {
                    ParseMode::Strict => {
                        return Err(ParseError::UnknownField { field: key.clone() });
                    }
                    ParseMode::Lenient => {}
                },
            }
        }

        Ok(SettingsModel::new(
            max_page_search_size,
            docs_per_second,
            dates_as_epoch_millis,
            align_checkpoints,
        ))
    }

    pub fn from_json_str(input: &str, mode: ParseMode) -> Result<SettingsModel, ParseError> {
        let value: Value =
            serde_json::from_str(input).map_err(|e| ParseError::Malformed(e.to_string()))?;
        Self::from_document(&value, mode)
    }

    /// Compact single-line JSON.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.to_document()).to_string()
    }
}

impl Serialize for SettingsModel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.to_document())
    }
}

// Embedded settings are user input, so unknown keys are rejected.
impl<'de> Deserialize<'de> for SettingsModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SettingsModel::from_document(&value, ParseMode::Strict).map_err(D::Error::custom)
    }
}
