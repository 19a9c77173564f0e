//! Configuration for the cloudtel CLI.
//!
//! TOML file + `CLOUDTEL_` environment layering, client secret resolution
//! (env var, keyring, plaintext) and translation to
//! `cloudtel_core::RuntimeConfig`. The CLI applies its flag overrides on
//! top of the loaded [`Config`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cloudtel_core::{EnrichSettings, RuntimeConfig};

/// Keyring service under which client secrets are stored.
pub const KEYRING_SERVICE: &str = "cloudtel";
/// Environment variable consulted when `client_secret_env` is unset.
pub const DEFAULT_SECRET_ENV: &str = "CLOUDTEL_CLIENT_SECRET";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CLOUDTEL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing required setting '{field}'")]
    Missing { field: String },

    #[error("no client secret configured for client '{client_id}'")]
    NoCredentials { client_id: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cloud: CloudSection,

    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub store: StoreSection,
}

/// Vendor account and device.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CloudSection {
    /// Regional API root, e.g. `https://openapi.tuyaus.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub client_id: Option<String>,

    /// Client secret (plaintext; prefer the keyring or an env var).
    pub client_secret: Option<String>,

    /// Environment variable holding the client secret.
    pub client_secret_env: Option<String>,

    pub device_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CloudSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: None,
            client_secret: None,
            client_secret_env: None,
            device_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://openapi.tuyaus.com".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Scheduling and backfill.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_true")]
    pub enrich: bool,

    #[serde(default = "default_log_window_secs")]
    pub log_window_secs: u64,

    #[serde(default = "default_log_page_size")]
    pub log_page_size: u32,

    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            enrich: true,
            log_window_secs: default_log_window_secs(),
            log_page_size: default_log_page_size(),
            label: default_label(),
        }
    }
}

fn default_interval_ms() -> u64 {
    30_000
}
fn default_true() -> bool {
    true
}
fn default_log_window_secs() -> u64 {
    3600
}
fn default_log_page_size() -> u32 {
    20
}
fn default_label() -> String {
    cloudtel_core::model::DEFAULT_POLL_LABEL.into()
}

/// Where readings are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StoreSection {
    /// JSON file; defaults to `readings.json` in the platform data dir.
    pub path: Option<PathBuf>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "cloudtel", "cloudtel")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the reading store.
pub fn default_store_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".local/share").join("readings.json"),
        |dirs| dirs.data_dir().join("readings.json"),
    )
}

fn fallback_dir(under_home: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(under_home);
    p.push("cloudtel");
    p
}

impl Config {
    /// The configured store path, or the platform default.
    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(default_store_path)
    }
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load defaults, then the TOML file at `path` (if present), then
/// `CLOUDTEL_` environment variables (nested keys split on `__`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Load from the canonical config path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Serialize `cfg` to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

/// A starter configuration with placeholders for the account fields.
pub fn starter_config() -> Config {
    Config {
        cloud: CloudSection {
            client_id: Some("your-client-id".into()),
            client_secret_env: Some(DEFAULT_SECRET_ENV.into()),
            device_id: Some("your-device-id".into()),
            ..CloudSection::default()
        },
        ..Config::default()
    }
}

// ── Secret resolution ───────────────────────────────────────────────

/// Keyring entry name for a client id's secret.
pub fn keyring_entry(client_id: &str) -> String {
    format!("{client_id}/client-secret")
}

/// Resolve the client secret: env var, then keyring, then plaintext.
pub fn resolve_client_secret(cloud: &CloudSection) -> Result<SecretString, ConfigError> {
    let client_id = cloud.client_id.as_deref().unwrap_or_default();

    // 1. Named env var
    let env_name = cloud.client_secret_env.as_deref().unwrap_or(DEFAULT_SECRET_ENV);
    if let Ok(val) = std::env::var(env_name) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if !client_id.is_empty() {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_entry(client_id)) {
            if let Ok(secret) = entry.get_password() {
                return Ok(SecretString::from(secret));
            }
        }
    }

    // 3. Plaintext in config
    if let Some(ref secret) = cloud.client_secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials {
        client_id: client_id.into(),
    })
}

/// Store a client secret in the system keyring.
pub fn store_client_secret(client_id: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_entry(client_id))?;
    entry.set_password(secret)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

fn required<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, ConfigError> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing {
            field: field.into(),
        })
}

/// Build a `RuntimeConfig`, resolving the client secret.
pub fn to_runtime_config(cfg: &Config) -> Result<RuntimeConfig, ConfigError> {
    let base_url: url::Url = cfg.cloud.base_url.parse().map_err(|_| ConfigError::Validation {
        field: "cloud.base_url".into(),
        reason: format!("invalid URL: {}", cfg.cloud.base_url),
    })?;
    let client_id = required(cfg.cloud.client_id.as_ref(), "cloud.client_id")?;
    let device_id = required(cfg.cloud.device_id.as_ref(), "cloud.device_id")?;

    if cfg.cloud.timeout_secs == 0 {
        return Err(invalid("cloud.timeout_secs", "must be greater than zero"));
    }
    if cfg.poll.interval_ms == 0 {
        return Err(invalid("poll.interval_ms", "must be greater than zero"));
    }
    if cfg.poll.enrich {
        if cfg.poll.log_window_secs == 0 {
            return Err(invalid("poll.log_window_secs", "must be greater than zero"));
        }
        if cfg.poll.log_page_size == 0 {
            return Err(invalid("poll.log_page_size", "must be greater than zero"));
        }
    }

    let secret = resolve_client_secret(&cfg.cloud)?;

    let mut runtime = RuntimeConfig::new(base_url, client_id, secret, device_id);
    runtime.timeout = Duration::from_secs(cfg.cloud.timeout_secs);
    runtime.poll_interval = Duration::from_millis(cfg.poll.interval_ms);
    runtime.label.clone_from(&cfg.poll.label);
    runtime.enrich = cfg.poll.enrich.then(|| EnrichSettings {
        window: Duration::from_secs(cfg.poll.log_window_secs),
        page_size: cfg.poll.log_page_size,
    });
    Ok(runtime)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}
