//! CLI-side configuration: file + env layering from `cloudtel-config`,
//! then global flag overrides.

use std::path::PathBuf;
use std::sync::Arc;

use cloudtel_config::Config;
use cloudtel_core::{JsonFileStore, ReadingStore, Telemetry};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(cloudtel_config::config_path)
}

/// Load the layered config and apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = cloudtel_config::load_config_from(&config_path(global))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

/// Flags win over file and environment.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref url) = global.base_url {
        cfg.cloud.base_url.clone_from(url);
    }
    if let Some(ref id) = global.client_id {
        cfg.cloud.client_id = Some(id.clone());
    }
    if let Some(ref id) = global.device_id {
        cfg.cloud.device_id = Some(id.clone());
    }
    if let Some(secs) = global.timeout {
        cfg.cloud.timeout_secs = secs;
    }
    if let Some(ref path) = global.store {
        cfg.store.path = Some(path.clone());
    }
}

/// Open the JSON reading store named by the config.
pub fn open_store(cfg: &Config) -> Arc<dyn ReadingStore> {
    let path = cfg.store_path();
    tracing::debug!(path = %path.display(), "opening reading store");
    Arc::new(JsonFileStore::new(path))
}

/// Wire the acquisition services for the configured device.
pub fn telemetry(cfg: &Config) -> Result<Telemetry, CliError> {
    let runtime = cloudtel_config::to_runtime_config(cfg)?;
    Ok(Telemetry::new(&runtime, open_store(cfg))?)
}
