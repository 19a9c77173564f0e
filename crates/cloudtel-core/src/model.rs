// ── Canonical reading model ──
//
// The persisted record shape is shared by scheduled polls, manual inserts
// and updates. Absent channels are omitted from the serialized form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::mapper::TEMPERATURE_RANGE;

/// Label given to readings produced by a poll.
pub const DEFAULT_POLL_LABEL: &str = "Temperature Sensor";
/// Label given to manual inserts that do not name one.
pub const DEFAULT_MANUAL_LABEL: &str = "Manual Sensor";

/// One physical quantity of the record schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Temperature,
    Ph,
    Orp,
    Conductivity,
    DissolvedSolids,
    Salinity,
}

impl Channel {
    /// Every schema channel, in record order.
    pub const ALL: [Channel; 6] = [
        Channel::Temperature,
        Channel::Ph,
        Channel::Orp,
        Channel::Conductivity,
        Channel::DissolvedSolids,
        Channel::Salinity,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Ph => "",
            Channel::Orp => "mV",
            Channel::Conductivity => "mS/cm",
            Channel::DissolvedSolids | Channel::Salinity => "ppm",
        }
    }
}

/// The six optional channel values of a reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissolved_solids: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salinity: Option<f64>,
}

impl ChannelValues {
    pub fn get(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Ph => self.ph,
            Channel::Orp => self.orp,
            Channel::Conductivity => self.conductivity,
            Channel::DissolvedSolids => self.dissolved_solids,
            Channel::Salinity => self.salinity,
        }
    }

    fn slot(&mut self, channel: Channel) -> &mut Option<f64> {
        match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Ph => &mut self.ph,
            Channel::Orp => &mut self.orp,
            Channel::Conductivity => &mut self.conductivity,
            Channel::DissolvedSolids => &mut self.dissolved_solids,
            Channel::Salinity => &mut self.salinity,
        }
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        *self.slot(channel) = Some(value);
    }

    /// Set the channel only if it is still empty. Returns `true` if written.
    pub fn fill(&mut self, channel: Channel, value: f64) -> bool {
        let slot = self.slot(channel);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    pub fn is_present(&self, channel: Channel) -> bool {
        self.get(channel).is_some()
    }

    /// Number of populated channels among `channels`.
    pub fn count_present(&self, channels: &[Channel]) -> usize {
        channels.iter().filter(|c| self.is_present(**c)).count()
    }

    /// Reject non-finite values and temperatures outside [`TEMPERATURE_RANGE`].
    pub fn validate(&self) -> Result<(), CoreError> {
        for channel in Channel::ALL {
            let Some(value) = self.get(channel) else {
                continue;
            };
            if !value.is_finite() {
                return Err(CoreError::Validation {
                    message: format!("{channel} must be a finite number, got {value}"),
                });
            }
        }
        if let Some(t) = self.temperature.filter(|t| !TEMPERATURE_RANGE.contains(t)) {
            return Err(CoreError::Validation {
                message: format!(
                    "temperature {t} is outside {}..={} °C",
                    TEMPERATURE_RANGE.start(),
                    TEMPERATURE_RANGE.end()
                ),
            });
        }
        Ok(())
    }
}

/// Output of the data-point mapper, before an id and timestamp are assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedReading {
    pub values: ChannelValues,
    /// Every vendor code seen, in report order.
    pub source_codes: Vec<String>,
}

/// A stored reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub label: String,
    #[serde(flatten)]
    pub values: ChannelValues,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source_codes: Vec<String>,
}

impl Reading {
    /// Stamp a mapped reading with a fresh id and the save-time timestamp.
    pub fn from_mapped(label: impl Into<String>, mapped: MappedReading, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            values: mapped.values,
            timestamp,
            source_codes: mapped.source_codes,
        }
    }
}

/// A manually supplied reading. Missing label and timestamp are defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingInput {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub values: ChannelValues,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReadingInput {
    /// Build a complete reading, filling `"Manual Sensor"` and `now` as needed.
    ///
    /// Fails if the values do not pass [`ChannelValues::validate`].
    pub fn into_reading(self, id: Uuid, now: DateTime<Utc>) -> Result<Reading, CoreError> {
        self.values.validate()?;
        Ok(Reading {
            id,
            label: self
                .label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MANUAL_LABEL.to_owned()),
            values: self.values,
            timestamp: self.timestamp.unwrap_or(now),
            source_codes: Vec::new(),
        })
    }
}
