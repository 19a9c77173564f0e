// ── Access token cache ──
//
// Holds the single bearer credential for the vendor API. The whole
// check-acquire-write sequence runs under one async mutex, so callers that
// arrive during an acquisition wait for it instead of issuing their own.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use cloudtel_api::{CloudClient, TokenGrant};
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Seconds subtracted from the declared lifetime before a token is refreshed.
pub const REFRESH_MARGIN_SECS: u64 = 300;

/// A cached access token with its effective expiry.
#[derive(Debug, Clone)]
pub struct Credential {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build from a grant received at `now`.
    ///
    /// The expiry is `now + expire_time - 300s`. Lifetimes at or below the
    /// margin saturate to `now`.
    pub fn from_grant(grant: &TokenGrant, now: DateTime<Utc>) -> Self {
        let usable = grant.expire_time.saturating_sub(REFRESH_MARGIN_SECS);
        let delta = i64::try_from(usable)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            token: SecretString::from(grant.access_token.clone()),
            expires_at: now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Serves a valid access token, acquiring a new one when needed.
pub struct TokenCache {
    client: Arc<CloudClient>,
    state: Mutex<Option<Credential>>,
}

impl TokenCache {
    pub fn new(client: Arc<CloudClient>) -> Self {
        Self {
            client,
            state: Mutex::new(None),
        }
    }

    /// Return the cached token if still valid, otherwise acquire a fresh one.
    ///
    /// On failure the cached credential is left as it was.
    pub async fn get_token(&self) -> Result<SecretString, CoreError> {
        let mut guard = self.state.lock().await;

        if let Some(cred) = guard.as_ref().filter(|c| c.is_valid_at(Utc::now())) {
            debug!("access token cache hit");
            return Ok(cred.token().clone());
        }

        let grant = self.client.request_token().await.map_err(|e| {
            warn!(error = %e, "token acquisition failed");
            match CoreError::from(e) {
                CoreError::Fetch { message, .. } | CoreError::Auth { message } => {
                    CoreError::Auth { message }
                }
                other => CoreError::Auth {
                    message: other.to_string(),
                },
            }
        })?;

        let cred = Credential::from_grant(&grant, Utc::now());
        info!(expires_at = %cred.expires_at(), "acquired access token");
        let token = cred.token().clone();
        *guard = Some(cred);
        Ok(token)
    }

    /// Drop the cached credential so the next call acquires a new one.
    pub async fn invalidate(&self) {
        let mut guard = self.state.lock().await;
        if guard.take().is_some() {
            debug!("access token invalidated");
        }
    }

    /// Effective expiry of the cached credential, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.as_ref().map(Credential::expires_at)
    }
}
