use thiserror::Error;

/// Vendor code returned when an access token is no longer accepted.
pub const VENDOR_CODE_TOKEN_INVALID: i64 = 1010;

/// Top-level error type for the `cloudtel-api` crate.
///
/// Covers every failure mode of the vendor open API: token grant,
/// transport, the `{success, code, msg}` envelope, and payload decoding.
/// `cloudtel-core` maps these into pipeline-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token grant failed (bad client id/secret, signature rejected, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Vendor envelope ─────────────────────────────────────────────
    /// The vendor answered with `success: false`.
    #[error("Vendor API error (code {code}): {message}")]
    Vendor { code: i64, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the vendor rejected the access token and a fresh
    /// grant might resolve it.
    pub fn is_token_rejected(&self) -> bool {
        matches!(
            self,
            Self::Vendor {
                code: VENDOR_CODE_TOKEN_INVALID,
                ..
            }
        )
    }

    /// Returns `true` if this is a transient error worth retrying on the next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Extract the vendor's numeric error code, if available.
    pub fn vendor_code(&self) -> Option<i64> {
        match self {
            Self::Vendor { code, .. } => Some(*code),
            _ => None,
        }
    }
}
