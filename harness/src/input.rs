//! Field readers for adapter JSON input.
//!
//! Inputs are hand-edited, so numbers and flags are accepted either as JSON
//! scalars or as their string spellings (`8` or `"8"`, `true` or `"true"`).

use stepviz_search::DetailMode;

use crate::contract::InputError;

/// Parse `text` as a JSON object.
///
/// # Errors
///
/// Returns [`InputError::NotJson`] or [`InputError::NotAnObject`].
pub fn parse_object(text: &str) -> Result<serde_json::Map<String, serde_json::Value>, InputError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| InputError::NotJson {
            detail: e.to_string(),
        })?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(InputError::NotAnObject),
    }
}

/// Positive integer field. `default` applies only when the field is absent.
///
/// # Errors
///
/// Returns [`InputError::InvalidField`] if the field is missing without a
/// default, or is not a positive integer.
pub fn positive_int(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &'static str,
    default: Option<u64>,
) -> Result<u64, InputError> {
    let invalid = || InputError::InvalidField {
        field,
        detail: "must be a positive integer".into(),
    };
    let parsed = match obj.get(field) {
        None | Some(serde_json::Value::Null) => return default.ok_or_else(invalid),
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v > 0 => Ok(v),
        _ => Err(invalid()),
    }
}

/// Boolean flag; anything other than `true` / `"true"` reads as false.
#[must_use]
pub fn flag(obj: &serde_json::Map<String, serde_json::Value>, field: &str, default: bool) -> bool {
    match obj.get(field) {
        None | Some(serde_json::Value::Null) => default,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "true",
        Some(_) => false,
    }
}

/// Detail mode; anything other than `"summary"` reads as detailed.
#[must_use]
pub fn detail_mode(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &str,
    default: DetailMode,
) -> DetailMode {
    match obj.get(field) {
        None | Some(serde_json::Value::Null) => default,
        Some(serde_json::Value::String(s)) if s == "summary" => DetailMode::Summary,
        Some(_) => DetailMode::Detailed,
    }
}

/// Non-empty integer list, as a JSON array or a comma-separated string.
///
/// # Errors
///
/// Returns [`InputError::InvalidField`] on an empty list or a non-integer
/// entry.
pub fn int_list(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &'static str,
    default: &[i64],
) -> Result<Vec<i64>, InputError> {
    let invalid = || InputError::InvalidField {
        field,
        detail: "must be a non-empty list of integers".into(),
    };
    let values: Option<Vec<i64>> = match obj.get(field) {
        None | Some(serde_json::Value::Null) => return Ok(default.to_vec()),
        Some(serde_json::Value::Array(items)) => items.iter().map(serde_json::Value::as_i64).collect(),
        Some(serde_json::Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<i64>().ok())
            .collect(),
        Some(_) => None,
    };
    match values {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid()),
    }
}
