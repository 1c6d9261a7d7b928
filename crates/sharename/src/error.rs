//! CLI error types with miette diagnostics.
//!
//! Maps `sharename_api::Error` into user-facing errors with actionable help
//! text and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use sharename_api::{ConsentRequired, ErrorKind};
use sharename_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(sharename::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Configured with: sharename config show"
        )
    )]
    ConnectionFailed {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(sharename::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(sharename::tls_error),
        help("Check ca_cert in your profile, or use --insecure (-k) for a test backend.")
    )]
    Tls { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(sharename::session_expired),
        help("The stored session was cleared. Run: sharename login")
    )]
    SessionExpired { message: String },

    #[error("Sign-in failed for {email}")]
    #[diagnostic(
        code(sharename::login_failed),
        help("Check the email and password, or create an account with: sharename signup")
    )]
    LoginFailed { email: String },

    #[error("Not signed in")]
    #[diagnostic(code(sharename::not_signed_in), help("Run: sharename login"))]
    NotSignedIn,

    // ── API ──────────────────────────────────────────────────────────
    #[error("'{label}' requires the owner's consent")]
    #[diagnostic(
        code(sharename::consent_required),
        help(
            "Ask for access with: sharename consent request-code <CODE>\n\
             Owner: {owner}"
        )
    )]
    ConsentRequired { label: String, owner: String },

    #[error("{message}")]
    #[diagnostic(code(sharename::api_error), help("{details}"))]
    Api {
        message: String,
        kind: ErrorKind,
        details: String,
    },

    #[error("Unexpected response: {message}")]
    #[diagnostic(
        code(sharename::decode),
        help("The backend answered in a shape this client does not understand. Re-run with -vv.")
    )]
    Decode { message: String },

    #[error("Session storage error: {0}")]
    #[diagnostic(code(sharename::session_storage))]
    SessionStorage(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sharename::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sharename::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sharename config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(sharename::no_config),
        help(
            "Create a profile with: sharename config init\n\
             Or pass --api-url / set SHARENAME_API_URL.\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(sharename::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(sharename::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(sharename::render))]
    Render(String),

    #[error("Could not produce QR code: {reason}")]
    #[diagnostic(code(sharename::qr_code))]
    QrCode { reason: String },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::SessionExpired { .. } | Self::LoginFailed { .. } | Self::NotSignedIn => {
                exit_code::AUTH
            }
            Self::ConsentRequired { .. } => exit_code::PERMISSION,
            Self::Api { kind, .. } => match kind {
                ErrorKind::Unauthorized => exit_code::AUTH,
                ErrorKind::Forbidden => exit_code::PERMISSION,
                ErrorKind::NotFound => exit_code::NOT_FOUND,
                ErrorKind::Conflict => exit_code::CONFLICT,
                ErrorKind::BadRequest | ErrorKind::Unprocessable => exit_code::USAGE,
                ErrorKind::Network => exit_code::CONNECTION,
                _ => exit_code::GENERAL,
            },
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── sharename_api::Error → CliError ──────────────────────────────────

impl From<sharename_api::Error> for CliError {
    fn from(err: sharename_api::Error) -> Self {
        use sharename_api::Error as ApiError;

        if let Some(gate) = ConsentRequired::from_error(&err) {
            return Self::ConsentRequired {
                label: gate.context_label.unwrap_or_else(|| "This context".into()),
                owner: gate.owner.unwrap_or_else(|| "unknown".into()),
            };
        }

        if err.is_timeout() {
            return Self::Timeout;
        }

        match err {
            ApiError::Network { info, source } => Self::ConnectionFailed {
                message: info.message,
                source: Box::new(source),
            },
            ApiError::Transport(source) => Self::ConnectionFailed {
                message: "Could not send the request".into(),
                source: Box::new(source),
            },
            ApiError::Tls(reason) => Self::Tls { reason },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "api_url".into(),
                reason: e.to_string(),
            },
            ApiError::SessionExpired { info } => Self::SessionExpired {
                message: info.message,
            },
            ApiError::MissingToken(_) => Self::NotSignedIn,
            ApiError::Session(reason) => Self::SessionStorage(reason),
            ApiError::Deserialization { message, .. } => Self::Decode { message },
            ApiError::Http { status, info, .. } => Self::Api {
                details: format_field_errors(&info.errors, status),
                kind: ErrorKind::from_status(Some(status)),
                message: info.message,
            },
        }
    }
}

fn format_field_errors(errors: &std::collections::BTreeMap<String, String>, status: u16) -> String {
    if errors.is_empty() {
        return format!("HTTP {status}");
    }
    errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(see: sharename config profiles)".into(),
            },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
            ConfigError::Serialization(e) => Self::Render(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;
    use sharename_api::ErrorInfo;

    use super::*;

    fn http(status: u16, body: serde_json::Value) -> sharename_api::Error {
        sharename_api::Error::Http {
            status,
            info: ErrorInfo::classify(Some(status), Some(&body)),
            body: Some(body),
        }
    }

    #[test]
    fn status_classes_map_to_exit_codes() {
        let cases = [
            (403, exit_code::PERMISSION),
            (404, exit_code::NOT_FOUND),
            (409, exit_code::CONFLICT),
            (400, exit_code::USAGE),
            (500, exit_code::GENERAL),
        ];
        for (status, code) in cases {
            let err = CliError::from(http(status, json!({})));
            assert_eq!(err.exit_code(), code, "status {status}");
        }
    }

    #[test]
    fn expired_session_is_an_auth_failure() {
        let err = CliError::from(sharename_api::Error::SessionExpired {
            info: ErrorInfo::classify(Some(401), None),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert!(matches!(err, CliError::SessionExpired { .. }));
    }

    #[test]
    fn consent_gate_wins_over_plain_forbidden() {
        let err = CliError::from(http(
            403,
            json!({"requires_consent": true, "context_label": "Work", "owner": "ana"}),
        ));
        match err {
            CliError::ConsentRequired { ref label, ref owner } => {
                assert_eq!(label, "Work");
                assert_eq!(owner, "ana");
            }
            ref other => panic!("expected consent gate, got {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_code::PERMISSION);
    }

    #[test]
    fn field_errors_become_help_lines() {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_owned(), "already taken".to_owned());
        errors.insert("password".to_owned(), "too short".to_owned());
        assert_eq!(format_field_errors(&errors, 400), "email: already taken\npassword: too short");
        assert_eq!(format_field_errors(&BTreeMap::new(), 418), "HTTP 418");
    }
}
