use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::envelope;

// ── User-facing messages ─────────────────────────────────────────────

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";
pub const BAD_REQUEST_MESSAGE: &str = "Invalid request. Please check your input.";
pub const UNAUTHORIZED_MESSAGE: &str = "Authentication required. Please log in again.";
pub const FORBIDDEN_MESSAGE: &str =
    "Access denied. You do not have permission to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
pub const CONFLICT_MESSAGE: &str = "Conflict. The resource already exists or is in use.";
pub const UNPROCESSABLE_MESSAGE: &str = "Validation failed. Please check your input.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please wait a moment and try again.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

// ── Classification ───────────────────────────────────────────────────

/// Failure taxonomy, derived from the HTTP status (or its absence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached us: connection refused, DNS, timeout.
    Network,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    RateLimited,
    /// Any 5xx.
    Server,
    Other(u16),
}

impl ErrorKind {
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            None => Self::Network,
            Some(400) => Self::BadRequest,
            Some(401) => Self::Unauthorized,
            Some(403) => Self::Forbidden,
            Some(404) => Self::NotFound,
            Some(409) => Self::Conflict,
            Some(422) => Self::Unprocessable,
            Some(429) => Self::RateLimited,
            Some(s) if s >= 500 => Self::Server,
            Some(s) => Self::Other(s),
        }
    }

    /// The single human-readable message for this kind, preferring the
    /// backend's own wording where the kind allows it.
    pub fn message(self, body: Option<&Value>) -> String {
        let backend = || backend_message(body);
        match self {
            Self::Network => NETWORK_ERROR_MESSAGE.to_owned(),
            Self::BadRequest => first_value_message(body)
                .or_else(backend)
                .unwrap_or_else(|| BAD_REQUEST_MESSAGE.to_owned()),
            Self::Unauthorized => UNAUTHORIZED_MESSAGE.to_owned(),
            Self::Forbidden => backend().unwrap_or_else(|| FORBIDDEN_MESSAGE.to_owned()),
            Self::NotFound => backend().unwrap_or_else(|| NOT_FOUND_MESSAGE.to_owned()),
            Self::Conflict => backend().unwrap_or_else(|| CONFLICT_MESSAGE.to_owned()),
            Self::Unprocessable => backend().unwrap_or_else(|| UNPROCESSABLE_MESSAGE.to_owned()),
            Self::RateLimited => RATE_LIMITED_MESSAGE.to_owned(),
            Self::Server => SERVER_ERROR_MESSAGE.to_owned(),
            Self::Other(status) => backend()
                .unwrap_or_else(|| format!("An error occurred ({status}). Please try again.")),
        }
    }
}

/// `message` field of an object payload, when it is a non-empty string.
fn backend_message(body: Option<&Value>) -> Option<String> {
    body?
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

/// The first value of an object payload, or the first element of it when
/// that value is a sequence.
fn first_value_message(body: Option<&Value>) -> Option<String> {
    let (_, first) = body?.as_object()?.iter().next()?;
    match first {
        Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_owned),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Message for a failure with the given status (`None` = no response).
pub fn error_message(status: Option<u16>, body: Option<&Value>) -> String {
    ErrorKind::from_status(status).message(body)
}

/// Per-field messages for inline form annotation.
///
/// Reads the `errors` object of a standardized error envelope, or the
/// payload itself otherwise. Sequences contribute their first element.
pub fn field_errors(body: Option<&Value>) -> BTreeMap<String, String> {
    let Some(body) = body else {
        return BTreeMap::new();
    };
    let source = if envelope::is_standardized(body) {
        body.get("errors").unwrap_or(&Value::Null)
    } else {
        body
    };
    let Some(fields) = source.as_object() else {
        return BTreeMap::new();
    };

    fields
        .iter()
        .filter_map(|(field, value)| {
            let message = match value {
                Value::Array(items) => match items.first()? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                Value::String(s) => s.clone(),
                _ => return None,
            };
            Some((field.clone(), message))
        })
        .collect()
}

// ── ErrorInfo ────────────────────────────────────────────────────────

/// One message plus structured field errors, derived from a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub errors: BTreeMap<String, String>,
    pub success: bool,
    pub timestamp: String,
}

impl ErrorInfo {
    pub fn classify(status: Option<u16>, body: Option<&Value>) -> Self {
        let timestamp = body
            .filter(|b| envelope::is_standardized(b))
            .and_then(|b| b.get("timestamp"))
            .and_then(Value::as_str)
            .map_or_else(now_rfc3339, str::to_owned);

        Self {
            message: error_message(status, body),
            errors: field_errors(body),
            success: false,
            timestamp,
        }
    }

    pub fn network() -> Self {
        Self::classify(None, None)
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Error ────────────────────────────────────────────────────────────

/// Top-level error type for the `sharename-api` crate.
///
/// Every failure that reached the network carries an [`ErrorInfo`], so
/// callers never re-inspect transport details to show a message.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request was sent but no response came back (connection
    /// refused, DNS failure, or the request timeout elapsed).
    #[error("{}", .info.message)]
    Network {
        info: ErrorInfo,
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be built or sent at all.
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CA certificate could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-2xx response other than 401.
    #[error("{} (HTTP {status})", .info.message)]
    Http {
        status: u16,
        info: ErrorInfo,
        body: Option<Value>,
    },

    /// 401 response. Session storage has already been cleared and a
    /// `SessionEvent::Expired` published by the time this is returned.
    #[error("Session expired: {}", .info.message)]
    SessionExpired { info: ErrorInfo },

    // ── Session ─────────────────────────────────────────────────────
    /// No access or refresh token stored for an operation that needs one.
    #[error("Not signed in -- no {0} token in session storage")]
    MissingToken(&'static str),

    /// The session store could not be read or written.
    #[error("Session storage error: {0}")]
    Session(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the failed response, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Network { .. } => Some(ErrorKind::Network),
            Self::Http { status, .. } => Some(ErrorKind::from_status(Some(*status))),
            Self::SessionExpired { .. } => Some(ErrorKind::Unauthorized),
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Network { info, .. } | Self::Http { info, .. } | Self::SessionExpired { info } => {
                Some(info)
            }
            _ => None,
        }
    }

    /// Raw error body returned by the backend, when there was one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// The message to show a person.
    pub fn user_message(&self) -> String {
        self.info()
            .map_or_else(|| self.to_string(), |info| info.message.clone())
    }

    pub fn field_errors(&self) -> BTreeMap<String, String> {
        self.info().map(|i| i.errors.clone()).unwrap_or_default()
    }

    /// Request left this process but no response came back.
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn no_response_is_always_a_network_error() {
        assert_eq!(error_message(None, None), NETWORK_ERROR_MESSAGE);
        let body = json!({"message": "ignored", "detail": ["also ignored"]});
        assert_eq!(error_message(None, Some(&body)), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn bad_request_takes_first_field_message() {
        let body = json!({"field": ["too short"]});
        assert_eq!(error_message(Some(400), Some(&body)), "too short");

        let body = json!({"email": "already registered", "password": ["weak"]});
        assert_eq!(error_message(Some(400), Some(&body)), "already registered");
    }

    #[test]
    fn bad_request_falls_back_to_message_then_generic() {
        let envelope = json!({
            "success": false,
            "message": "Context ID is required",
            "timestamp": "2024-01-01T00:00:00Z"
        });
        assert_eq!(
            error_message(Some(400), Some(&envelope)),
            "Context ID is required"
        );
        assert_eq!(error_message(Some(400), Some(&json!({}))), BAD_REQUEST_MESSAGE);
        assert_eq!(error_message(Some(400), Some(&json!("oops"))), BAD_REQUEST_MESSAGE);
        assert_eq!(error_message(Some(400), None), BAD_REQUEST_MESSAGE);
    }

    #[test]
    fn fixed_messages_ignore_backend_text() {
        let body = json!({"message": "backend says"});
        assert_eq!(error_message(Some(401), Some(&body)), UNAUTHORIZED_MESSAGE);
        assert_eq!(error_message(Some(429), Some(&body)), RATE_LIMITED_MESSAGE);
        assert_eq!(error_message(Some(500), Some(&body)), SERVER_ERROR_MESSAGE);
        assert_eq!(error_message(Some(503), Some(&body)), SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn backend_message_overrides_where_allowed() {
        let body = json!({"message": "Code expired or revoked"});
        for status in [403, 404, 409, 422] {
            assert_eq!(
                error_message(Some(status), Some(&body)),
                "Code expired or revoked"
            );
        }
        assert_eq!(error_message(Some(403), None), FORBIDDEN_MESSAGE);
        assert_eq!(error_message(Some(404), None), NOT_FOUND_MESSAGE);
        assert_eq!(error_message(Some(409), None), CONFLICT_MESSAGE);
        assert_eq!(error_message(Some(422), None), UNPROCESSABLE_MESSAGE);
    }

    #[test]
    fn other_statuses_are_templated() {
        assert_eq!(
            error_message(Some(418), None),
            "An error occurred (418). Please try again."
        );
        assert_eq!(
            error_message(Some(418), Some(&json!({"message": "teapot"}))),
            "teapot"
        );
    }

    #[test]
    fn field_errors_from_plain_payload() {
        let body = json!({
            "email": ["Enter a valid email address.", "second"],
            "password": "too common",
            "count": 3
        });
        let errors = field_errors(Some(&body));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["email"], "Enter a valid email address.");
        assert_eq!(errors["password"], "too common");
    }

    #[test]
    fn field_errors_from_envelope_errors() {
        let body = json!({
            "success": false,
            "message": "Validation failed",
            "errors": {"label": ["Ensure this field has no more than 40 characters."]},
            "timestamp": "2024-01-01T00:00:00Z"
        });
        let info = ErrorInfo::classify(Some(400), Some(&body));
        assert_eq!(info.message, "Validation failed");
        assert_eq!(
            info.errors["label"],
            "Ensure this field has no more than 40 characters."
        );
        assert_eq!(info.timestamp, "2024-01-01T00:00:00Z");
        assert!(!info.success);
    }

    #[test]
    fn kind_taxonomy() {
        assert_eq!(ErrorKind::from_status(None), ErrorKind::Network);
        assert_eq!(ErrorKind::from_status(Some(502)), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(Some(405)), ErrorKind::Other(405));
    }

    #[test]
    fn predicates_follow_status() {
        let http = |status| Error::Http {
            status,
            info: ErrorInfo::classify(Some(status), None),
            body: None,
        };
        assert!(http(404).is_client_error());
        assert!(http(404).is_not_found());
        assert!(!http(404).is_server_error());
        assert!(http(500).is_server_error());
        assert!(!http(500).is_client_error());
        assert!(!http(500).is_network_error());

        let expired = Error::SessionExpired {
            info: ErrorInfo::classify(Some(401), None),
        };
        assert!(expired.is_client_error());
        assert!(expired.is_session_expired());
        assert_eq!(expired.user_message(), UNAUTHORIZED_MESSAGE);
    }
}
