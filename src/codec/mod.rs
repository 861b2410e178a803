//! Field-level JSON decoding rules shared by the domain types.
//!
//! Backend payloads are partially optional, so every field is read through
//! one of the helpers below instead of a derived `Deserialize`:
//!
//! - required values fail with [`DecodeError::MissingField`] when absent,
//!   `null`, empty or unparsable;
//! - optional values collapse to a default on any failure;
//! - lists of entities are best effort, see [`decode_lenient`].

mod timestamp;

pub use timestamp::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("expected a JSON array")]
    NotAnArray,

    #[error("missing key: {0}")]
    MissingField(&'static str),

    #[error("invalid value for key: {0}")]
    InvalidField(&'static str),
}

pub fn parse_body(body: &[u8]) -> Result<Value, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}

pub fn as_object(value: &Value) -> Result<&Map<String, Value>, DecodeError> {
    value.as_object().ok_or(DecodeError::NotAnObject)
}

/// A present, non-empty string. `null` and `""` count as absent.
pub fn required_string(object: &Map<String, Value>, key: &'static str) -> Result<String, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(key)),
        Some(Value::String(s)) if s.is_empty() => Err(DecodeError::MissingField(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::InvalidField(key)),
    }
}

pub fn optional_string(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

pub fn required_url(object: &Map<String, Value>, key: &'static str) -> Result<Url, DecodeError> {
    optional_url(object, key).ok_or(DecodeError::MissingField(key))
}

pub fn optional_url(object: &Map<String, Value>, key: &str) -> Option<Url> {
    object.get(key).and_then(Value::as_str).and_then(parse_url)
}

pub fn required_timestamp(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<DateTime<Utc>, DecodeError> {
    optional_timestamp(object, key).ok_or(DecodeError::MissingField(key))
}

pub fn optional_timestamp(object: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    object
        .get(key)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

/// Reads a flag sent either as a boolean or as an integer (nonzero is true).
/// A missing key reads as `false`; any other kind of value, `null`
/// included, is rejected.
pub fn flag(object: &Map<String, Value>, key: &'static str) -> Result<bool, DecodeError> {
    match object.get(key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i != 0)
            } else if let Some(u) = n.as_u64() {
                Ok(u != 0)
            } else {
                Err(DecodeError::InvalidField(key))
            }
        }
        Some(_) => Err(DecodeError::InvalidField(key)),
    }
}

/// Decodes every element of the array at `key`, keeping the successes in
/// order and dropping the rest. A missing key or a non-array value yields an
/// empty list.
pub fn decode_lenient<T, F>(object: &Map<String, Value>, key: &str, decode: F) -> Vec<T>
where
    F: Fn(&Value) -> Result<T, DecodeError>,
{
    match object.get(key) {
        Some(Value::Array(elements)) => decode_elements(elements, decode),
        _ => Vec::new(),
    }
}

pub fn decode_elements<T, F>(elements: &[Value], decode: F) -> Vec<T>
where
    F: Fn(&Value) -> Result<T, DecodeError>,
{
    let mut decoded = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match decode(element) {
            Ok(value) => decoded.push(value),
            Err(e) => tracing::debug!(index, error = %e, "Dropping undecodable list entry"),
        }
    }
    decoded
}

/// Decodes a bare JSON array of URL strings, skipping entries that are not
/// absolute URLs.
pub fn url_list(value: &Value) -> Result<Vec<Url>, DecodeError> {
    let elements = value.as_array().ok_or(DecodeError::NotAnArray)?;
    Ok(decode_elements(elements, url_element))
}

pub fn url_element(value: &Value) -> Result<Url, DecodeError> {
    value
        .as_str()
        .and_then(parse_url)
        .ok_or(DecodeError::InvalidField("url"))
}

fn parse_url(raw: &str) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw).ok()
}
