//! Config subcommand handlers.

use cloudtel_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

const REDACTED: &str = "****";

/// Copy of `cfg` with the plaintext secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    if out.cloud.client_secret.is_some() {
        out.cloud.client_secret = Some(REDACTED.into());
    }
    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                        field: "config".into(),
                        reason: e.to_string(),
                    })?
                }
                ref structured => output::render_structured(structured, &cfg)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists()
                && !force
                && !util::confirm(
                    &format!("{} exists. Overwrite?", path.display()),
                    global.yes,
                )?
            {
                return Ok(());
            }
            cloudtel_config::save_config_to(&cloudtel_config::starter_config(), &path)?;
            if !global.quiet {
                eprintln!("Wrote starter config to {}", path.display());
                eprintln!("Fill in client_id and device_id, then run: cloudtel config set-secret");
            }
            Ok(())
        }

        ConfigCommand::SetSecret => {
            let cfg = config::load(global)?;
            let client_id = cfg
                .cloud
                .client_id
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| CliError::MissingSetting {
                    field: "cloud.client_id".into(),
                    path: path.display().to_string(),
                })?;

            let secret = rpassword::prompt_password(format!("Client secret for {client_id}: "))
                .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "client secret".into(),
                    reason: "cannot be empty".into(),
                });
            }

            cloudtel_config::store_client_secret(&client_id, &secret)?;
            if !global.quiet {
                eprintln!("Client secret stored in system keyring");
            }
            Ok(())
        }
    }
}
