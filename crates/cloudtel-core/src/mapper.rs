// ── Data-point mapping ──
//
// Translates vendor data-point codes into canonical channels. Only the
// temperature rule is enabled; the other schema channels have no rule and
// stay empty until a device model with known scaling is supported.

use std::ops::RangeInclusive;

use cloudtel_api::{DataPoint, DpValue};
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Channel, MappedReading};

/// Vendor code carrying the current temperature.
pub const TEMPERATURE_CODE: &str = "temp_current";

/// Plausible temperature range after scaling, in °C.
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = -40.0..=125.0;

struct Rule {
    code: &'static str,
    channel: Channel,
    scale: fn(f64) -> f64,
    range: RangeInclusive<f64>,
}

/// Magnitudes above 100 are reported in tenths of a degree.
fn tenths_above_hundred(raw: f64) -> f64 {
    if raw.abs() > 100.0 { raw / 10.0 } else { raw }
}

const RULES: &[Rule] = &[Rule {
    code: TEMPERATURE_CODE,
    channel: Channel::Temperature,
    scale: tenths_above_hundred,
    range: TEMPERATURE_RANGE,
}];

/// Coarse category of a vendor code, used by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParameterCategory {
    Temperature,
    Unknown,
}

/// Maps raw data points to canonical channels. Pure and total.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpMapper;

impl DpMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map one status snapshot. Unknown codes are kept in `source_codes`.
    pub fn map(&self, points: &[DataPoint]) -> MappedReading {
        let mut mapped = MappedReading::default();

        for point in points {
            mapped.source_codes.push(point.code.clone());

            if rule_for(&point.code).is_none() {
                warn!(code = %point.code, "no mapping rule for data point, skipping");
                continue;
            }
            if let Some((channel, value)) = self.map_value(&point.code, &point.value) {
                mapped.values.fill(channel, value);
            }
        }

        mapped
    }

    /// Scale and validate one value of a recognized code.
    ///
    /// Returns `None` for unknown codes, non-numeric values and values
    /// outside the plausible range.
    pub fn map_value(&self, code: &str, value: &DpValue) -> Option<(Channel, f64)> {
        let rule = rule_for(code)?;

        let Some(raw) = value.as_f64() else {
            warn!(code, kind = value.kind(), "non-numeric value for mapped code");
            return None;
        };

        let scaled = (rule.scale)(raw);
        if !rule.range.contains(&scaled) {
            warn!(code, raw, scaled, "value outside plausible range, dropped");
            return None;
        }

        debug!(code, raw, scaled, channel = %rule.channel, "mapped data point");
        Some((rule.channel, scaled))
    }

    /// Channels this mapper can populate.
    pub fn active_channels(&self) -> Vec<Channel> {
        RULES.iter().map(|r| r.channel).collect()
    }

    /// Vendor code feeding `channel`, if the channel is active.
    pub fn code_for(&self, channel: Channel) -> Option<&'static str> {
        RULES.iter().find(|r| r.channel == channel).map(|r| r.code)
    }

    pub fn categorize(&self, code: &str) -> ParameterCategory {
        if code.to_lowercase().contains("temp") {
            ParameterCategory::Temperature
        } else {
            ParameterCategory::Unknown
        }
    }
}

fn rule_for(code: &str) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.code == code)
}
