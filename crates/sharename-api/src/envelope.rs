// Response envelope normalization
//
// The backend answers with either the standardized
// `{ success, data, message, timestamp, pagination? }` envelope or a raw
// legacy payload. Both are decoded once, at the boundary, into `Payload`
// so downstream code matches on a variant instead of probing keys.

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Message attached when a legacy payload is wrapped into an envelope.
pub const NORMALIZED_MESSAGE: &str = "Request completed successfully";

/// Fallback used by [`Payload::message_or`] callers that have nothing better.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

static NULL: Value = Value::Null;

// ── Envelope types ───────────────────────────────────────────────────

/// Page metadata attached to paginated list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub count: Option<u64>,
    pub pages: Option<u64>,
    pub current_page: Option<u64>,
    pub page_size: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

/// The canonical `{ success, data, message, timestamp }` response shape.
///
/// Keys the backend adds beyond the known ones are kept in `extra` so a
/// standardized payload survives a decode/encode cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Wrap an arbitrary payload as a successful envelope stamped with now.
    pub fn wrap(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(NORMALIZED_MESSAGE.to_owned()),
            timestamp: now_rfc3339(),
            pagination: None,
            errors: None,
            extra: Map::new(),
        }
    }

    /// Decode from a JSON object already known to carry `success` and
    /// `timestamp`. Never fails: odd value types are coerced.
    fn from_map(mut map: Map<String, Value>) -> Self {
        let success = map.remove("success").is_some_and(|v| truthy(&v));
        let timestamp = match map.remove("timestamp") {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let data = map.remove("data");
        let message = match map.remove("message") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let pagination = map
            .remove("pagination")
            .and_then(|v| serde_json::from_value(v).ok());
        let errors = map.remove("errors").filter(|v| !v.is_null());

        Self {
            success,
            data,
            message,
            timestamp,
            pagination,
            errors,
            extra: map,
        }
    }

    /// Re-encode as a JSON object.
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert("success".into(), Value::Bool(self.success));
        if let Some(data) = self.data {
            map.insert("data".into(), data);
        }
        if let Some(message) = self.message {
            map.insert("message".into(), Value::String(message));
        }
        map.insert("timestamp".into(), Value::String(self.timestamp));
        if let Some(pagination) = self.pagination {
            map.insert(
                "pagination".into(),
                serde_json::to_value(pagination).unwrap_or_default(),
            );
        }
        if let Some(errors) = self.errors {
            map.insert("errors".into(), errors);
        }
        map.extend(self.extra);
        Value::Object(map)
    }
}

// ── Payload ──────────────────────────────────────────────────────────

/// A response body, decoded at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Carries both `success` and `timestamp`.
    Standardized(Envelope),
    /// Anything else, including JSON `null` for an empty body.
    Legacy(Value),
}

impl Payload {
    pub fn decode(value: Value) -> Self {
        match value {
            Value::Object(map) if is_standardized_map(&map) => {
                Self::Standardized(Envelope::from_map(map))
            }
            other => Self::Legacy(other),
        }
    }

    pub fn is_standardized(&self) -> bool {
        matches!(self, Self::Standardized(_))
    }

    /// The meaningful data: the envelope's `data` for standardized
    /// payloads, the payload itself otherwise.
    pub fn data(&self) -> &Value {
        match self {
            Self::Standardized(env) => env.data.as_ref().unwrap_or(&NULL),
            Self::Legacy(value) => value,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Self::Standardized(env) => env.data.unwrap_or(Value::Null),
            Self::Legacy(value) => value,
        }
    }

    /// Borrowing form of [`into_array_data`](Self::into_array_data) with an
    /// empty fallback.
    pub fn array_data(&self) -> &[Value] {
        match self.data() {
            Value::Array(items) => items,
            _ => &[],
        }
    }

    /// The data as a sequence, or `fallback` when it is not one.
    pub fn into_array_data(self, fallback: Vec<Value>) -> Vec<Value> {
        match self.into_data() {
            Value::Array(items) => items,
            _ => fallback,
        }
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        match self {
            Self::Standardized(env) => env.pagination.as_ref(),
            Self::Legacy(_) => None,
        }
    }

    /// The envelope message, or `default` for legacy payloads and
    /// envelopes without one.
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self {
            Self::Standardized(env) => env.message.as_deref().unwrap_or(default),
            Self::Legacy(_) => default,
        }
    }

    /// Idempotent: standardized payloads come back untouched.
    pub fn normalize(self) -> Envelope {
        match self {
            Self::Standardized(env) => env,
            Self::Legacy(value) => Envelope::wrap(value),
        }
    }

    /// Decode the extracted data into a typed model.
    pub fn deserialize_data<T: DeserializeOwned>(self) -> Result<T, Error> {
        let data = self.into_data();
        serde_json::from_value(data.clone()).map_err(|e| {
            let body = data.to_string();
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Standardized(env) => env.into_value(),
            Self::Legacy(value) => value,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::decode(value)
    }
}

// ── Value-level operations ───────────────────────────────────────────

/// True iff `payload` is an object with both a `success` and a `timestamp` key.
pub fn is_standardized(payload: &Value) -> bool {
    payload.as_object().is_some_and(is_standardized_map)
}

fn is_standardized_map(map: &Map<String, Value>) -> bool {
    map.contains_key("success") && map.contains_key("timestamp")
}

/// Inner `data` of a standardized payload, the payload itself otherwise.
pub fn extract_data(payload: &Value) -> &Value {
    if is_standardized(payload) {
        payload.get("data").unwrap_or(&NULL)
    } else {
        payload
    }
}

/// Like [`extract_data`], but any non-array result becomes `fallback`.
pub fn extract_array_data(payload: &Value, fallback: Vec<Value>) -> Vec<Value> {
    match extract_data(payload) {
        Value::Array(items) => items.clone(),
        _ => fallback,
    }
}

/// Wrap a legacy payload in a standardized envelope; standardized input is
/// returned as-is.
pub fn normalize(payload: Value) -> Value {
    if is_standardized(&payload) {
        payload
    } else {
        Envelope::wrap(payload).into_value()
    }
}

pub fn extract_pagination(payload: &Value) -> Option<Pagination> {
    if !is_standardized(payload) {
        return None;
    }
    payload
        .get("pagination")
        .filter(|p| !p.is_null())
        .and_then(|p| serde_json::from_value(p.clone()).ok())
}

/// A successful response body that still reads as a legacy failure:
/// present, `success` false-y, and no `timestamp`.
pub(crate) fn looks_like_legacy_failure(payload: &Value) -> bool {
    truthy(payload)
        && !payload.get("success").is_some_and(truthy)
        && !payload.get("timestamp").is_some_and(truthy)
}

/// JSON truthiness: `null`, `false`, `0`, and `""` are false-y.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
