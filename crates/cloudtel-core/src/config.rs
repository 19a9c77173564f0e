// ── Runtime acquisition configuration ──
//
// Describes which device to poll and how. Carries credential data and
// tuning but never touches disk; the CLI builds a `RuntimeConfig` from
// its config file and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;
use crate::model::DEFAULT_POLL_LABEL;

/// Upper bound accepted by the report-log endpoint for one page.
pub const MAX_LOG_PAGE_SIZE: u32 = 100;

/// Settings for historical backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichSettings {
    /// Trailing window queried for missing codes.
    pub window: Duration,
    /// Requested page size, capped at [`MAX_LOG_PAGE_SIZE`].
    pub page_size: u32,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(3600),
            page_size: 20,
        }
    }
}

/// Everything needed to acquire readings from one cloud device.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Vendor API root (e.g. `https://openapi.tuyaus.com`).
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: SecretString,
    pub device_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Label stamped on polled readings.
    pub label: String,
    /// `None` disables backfill.
    pub enrich: Option<EnrichSettings>,
}

impl RuntimeConfig {
    pub fn new(
        base_url: Url,
        client_id: impl Into<String>,
        client_secret: SecretString,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url,
            client_id: client_id.into(),
            client_secret,
            device_id: device_id.into(),
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(30_000),
            label: DEFAULT_POLL_LABEL.to_owned(),
            enrich: Some(EnrichSettings::default()),
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.client_id.trim().is_empty() {
            return Err(config_error("client id must not be empty"));
        }
        if self.device_id.trim().is_empty() {
            return Err(config_error("device id must not be empty"));
        }
        if self.poll_interval.is_zero() {
            return Err(config_error("poll interval must be greater than zero"));
        }
        if self.timeout.is_zero() {
            return Err(config_error("request timeout must be greater than zero"));
        }
        if let Some(enrich) = &self.enrich {
            if enrich.page_size == 0 {
                return Err(config_error("log page size must be greater than zero"));
            }
            if enrich.window.is_zero() {
                return Err(config_error("log window must be greater than zero"));
            }
        }
        Ok(())
    }
}

fn config_error(message: &str) -> CoreError {
    CoreError::Config {
        message: message.to_owned(),
    }
}
