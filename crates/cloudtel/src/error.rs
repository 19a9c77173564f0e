//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use cloudtel_config::ConfigError;
use cloudtel_core::{CoreError, DiagnosticCode, DiagnosticFailure};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the cloud API at {url}")]
    #[diagnostic(
        code(cloudtel::connection_failed),
        help(
            "Check network access and the regional base URL.\n\
             Reason: {reason}\n\
             Try: cloudtel --base-url https://openapi.tuyaeu.com raw"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(cloudtel::timeout),
        help("Increase the timeout with --timeout or cloud.timeout_secs.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(cloudtel::auth_failed),
        help(
            "Verify the client id and secret of your cloud project.\n\
             Store the secret with: cloudtel config set-secret"
        )
    )]
    AuthFailed { message: String },

    #[error("No client secret configured for client '{client_id}'")]
    #[diagnostic(
        code(cloudtel::no_credentials),
        help(
            "Store one with: cloudtel config set-secret\n\
             Or set the CLOUDTEL_CLIENT_SECRET environment variable."
        )
    )]
    NoCredentials { client_id: String },

    // ── Vendor ───────────────────────────────────────────────────────
    #[error("Cloud API error: {message}")]
    #[diagnostic(code(cloudtel::fetch_failed))]
    Fetch { message: String },

    /// A diagnostic operation failed; carries the structured payload.
    #[error("{title}: {message}")]
    #[diagnostic(code(cloudtel::diagnostic))]
    DiagnosticFailed {
        title: String,
        message: String,
        code: DiagnosticCode,
        exit: i32,
    },

    #[error("A poll is already running")]
    #[diagnostic(code(cloudtel::busy))]
    Busy,

    // ── Storage ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(cloudtel::not_found),
        help("Run: cloudtel {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Reading store error: {message}")]
    #[diagnostic(
        code(cloudtel::store),
        help("Check the --store path or store.path in the config file.")
    )]
    Store { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cloudtel::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting '{field}'")]
    #[diagnostic(
        code(cloudtel::missing_setting),
        help(
            "Set it in {path} or pass the matching flag.\n\
             Create a starter file with: cloudtel config init"
        )
    )]
    MissingSetting { field: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(cloudtel::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(cloudtel::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(cloudtel::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::MissingSetting { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::DiagnosticFailed { exit, .. } => *exit,
            _ => exit_code::GENERAL,
        }
    }

    /// Wrap a diagnostic payload, keeping the exit code of its cause.
    pub fn diagnostic(failure: DiagnosticFailure, cause: CoreError) -> Self {
        Self::DiagnosticFailed {
            exit: Self::from(cause).exit_code(),
            title: failure.title,
            message: failure.message,
            code: failure.code,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Auth { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Fetch { message, code: _ } => CliError::Fetch { message },
            CoreError::Persistence { message } => CliError::Store { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field } => CliError::MissingSetting {
                field,
                path: cloudtel_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { client_id } => CliError::NoCredentials { client_id },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let auth = CliError::from(CoreError::Auth {
            message: "sign invalid".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing = CliError::from(CoreError::NotFound {
            entity_type: "reading".into(),
            identifier: "abc".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert!(missing.to_string().contains("'abc'"));

        let slow = CliError::from(CoreError::Timeout { timeout_secs: 10 });
        assert_eq!(slow.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn diagnostic_failure_inherits_cause_exit_code() {
        let cause = CoreError::ConnectionFailed {
            url: "https://openapi.tuyaus.com".into(),
            reason: "dns".into(),
        };
        let payload = cause.diagnostic("Raw data analysis failed", DiagnosticCode::RawDataError);
        let err = CliError::diagnostic(payload, cause);
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
        assert!(err.to_string().starts_with("Raw data analysis failed:"));
    }

    #[test]
    fn config_errors_name_the_field() {
        let err = CliError::from(ConfigError::Missing {
            field: "cloud.device_id".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(err.to_string().contains("cloud.device_id"));
    }
}
