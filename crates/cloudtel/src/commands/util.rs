//! Shared helpers for command handlers.

use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cloudtel_core::{ChannelValues, ReadingInput};

use crate::cli::ReadingFields;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a reading id argument.
pub fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    raw.trim().parse().map_err(|_| CliError::Validation {
        field: "id".into(),
        reason: format!("'{raw}' is not a UUID"),
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CliError::Validation {
            field: "timestamp".into(),
            reason: format!("'{raw}' is not an RFC 3339 timestamp: {e}"),
        })
}

/// Read and parse a reading from a JSON file for `--from-file`.
pub fn read_reading_file(path: &Path) -> Result<ReadingInput, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid reading JSON: {e}"),
    })
}

/// Build a reading input from flags or `--from-file`.
pub fn reading_input(fields: ReadingFields) -> Result<ReadingInput, CliError> {
    if let Some(path) = fields.from_file {
        return read_reading_file(&path);
    }
    Ok(ReadingInput {
        label: fields.label,
        values: ChannelValues {
            temperature: fields.temperature,
            ph: fields.ph,
            orp: fields.orp,
            conductivity: fields.conductivity,
            dissolved_solids: fields.dissolved_solids,
            salinity: fields.salinity,
        },
        timestamp: fields.timestamp.as_deref().map(parse_timestamp).transpose()?,
    })
}
