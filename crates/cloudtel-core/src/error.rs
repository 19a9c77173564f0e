// ── Core error types ──
//
// Pipeline-level errors from cloudtel-core. Consumers never see raw HTTP
// or JSON failures; the `From<cloudtel_api::Error>` impl translates
// transport-layer errors into these variants.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Vendor access ────────────────────────────────────────────────
    /// Token endpoint unreachable or credentials rejected.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Cannot reach cloud API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Cloud API request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Status, specification or log call failed, or answered `success: false`.
    #[error("Fetch failed: {message}")]
    Fetch {
        message: String,
        /// Vendor numeric error code, when the vendor supplied one.
        code: Option<i64>,
    },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },
}

impl CoreError {
    /// Build the `{title, message, code}` payload for a failed diagnostic.
    pub fn diagnostic(&self, title: impl Into<String>, code: DiagnosticCode) -> DiagnosticFailure {
        DiagnosticFailure {
            title: title.into(),
            message: self.to_string(),
            code,
        }
    }

    pub(crate) fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            message: err.to_string(),
        }
    }
}

// ── Diagnostic payload ───────────────────────────────────────────────

/// Machine-readable code of a failed diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    RawDataError,
    SpecificationsError,
    ComparisonError,
    PollError,
    StatusError,
}

/// Structured failure surfaced by diagnostic operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticFailure {
    pub title: String,
    pub message: String,
    pub code: DiagnosticCode,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cloudtel_api::Error> for CoreError {
    fn from(err: cloudtel_api::Error) -> Self {
        match err {
            cloudtel_api::Error::Authentication { message } => CoreError::Auth { message },
            cloudtel_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Fetch {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            cloudtel_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cloudtel_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cloudtel_api::Error::Vendor { code, message } => CoreError::Fetch {
                message: format!("vendor code {code}: {message}"),
                code: Some(code),
            },
            cloudtel_api::Error::Deserialization { message, body: _ } => CoreError::Fetch {
                message: format!("unexpected response: {message}"),
                code: None,
            },
        }
    }
}
