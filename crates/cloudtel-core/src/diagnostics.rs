// ── Device diagnostics ──
//
// Read-only views over the live status and declared specification of the
// device. Never on the write path.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudtel_api::{CloudClient, DataPoint, DeclaredValues, DeviceSpecificationResponse, DpValue};
use serde::Serialize;
use tracing::debug;

use crate::analytics::{percent, round2};
use crate::credential::TokenCache;
use crate::error::CoreError;
use crate::mapper::{DpMapper, ParameterCategory};

// ── Result types ─────────────────────────────────────────────────────

/// One currently reported code.
#[derive(Debug, Clone, Serialize)]
pub struct RawCode {
    pub code: String,
    pub value: DpValue,
    pub value_kind: &'static str,
    pub category: ParameterCategory,
}

/// The live status snapshot with per-code classification.
#[derive(Debug, Clone, Serialize)]
pub struct RawDataAnalysis {
    pub device_id: String,
    pub fetched_at: DateTime<Utc>,
    pub total_codes: usize,
    pub codes: Vec<RawCode>,
}

/// One declared status data point.
#[derive(Debug, Clone, Serialize)]
pub struct DeclaredPoint {
    pub code: String,
    pub name: Option<String>,
    pub dp_type: Option<String>,
    pub declared_range: Option<DeclaredValues>,
    /// The vendor's `values` string, unparsed.
    pub raw_values: Option<String>,
}

/// The declared capability schema of the device, in vendor order.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSpecification {
    pub device_id: String,
    pub category: String,
    pub data_points: Vec<DeclaredPoint>,
}

impl DeviceSpecification {
    pub fn from_response(device_id: impl Into<String>, resp: DeviceSpecificationResponse) -> Self {
        let data_points = resp
            .status
            .into_iter()
            .map(|entry| DeclaredPoint {
                declared_range: entry.declared_values(),
                code: entry.code,
                name: entry.name,
                dp_type: entry.dp_type,
                raw_values: entry.values,
            })
            .collect();
        Self {
            device_id: device_id.into(),
            category: resp.category,
            data_points,
        }
    }
}

/// Rating of how much of the declared schema the device actually reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EfficiencyRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl EfficiencyRating {
    pub fn from_utilization(percent: f64) -> Self {
        if percent >= 80.0 {
            Self::Excellent
        } else if percent >= 60.0 {
            Self::Good
        } else if percent >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Current status codes set against the declared specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub current_codes: Vec<String>,
    pub supported_codes: Vec<String>,
    /// Supported and currently reported.
    pub active_codes: Vec<String>,
    /// Supported but not currently reported.
    pub inactive_codes: Vec<String>,
    pub utilization_percent: f64,
    pub efficiency: EfficiencyRating,
}

/// Compare a status snapshot with a specification.
pub fn compare(current: &[DataPoint], spec: &DeviceSpecification) -> Comparison {
    let current_codes: Vec<String> = current.iter().map(|p| p.code.clone()).collect();
    let reported: HashSet<&str> = current_codes.iter().map(String::as_str).collect();

    let supported_codes: Vec<String> = spec.data_points.iter().map(|p| p.code.clone()).collect();
    let (active_codes, inactive_codes): (Vec<String>, Vec<String>) = supported_codes
        .iter()
        .cloned()
        .partition(|code| reported.contains(code.as_str()));

    let utilization_percent = if supported_codes.is_empty() {
        0.0
    } else {
        round2(percent(active_codes.len(), supported_codes.len()))
    };

    Comparison {
        efficiency: EfficiencyRating::from_utilization(utilization_percent),
        current_codes,
        supported_codes,
        active_codes,
        inactive_codes,
        utilization_percent,
    }
}

// ── Service ──────────────────────────────────────────────────────────

/// Runs diagnostics against the configured device.
pub struct Diagnostics {
    client: Arc<CloudClient>,
    tokens: Arc<TokenCache>,
    mapper: DpMapper,
    device_id: String,
}

impl Diagnostics {
    pub fn new(
        client: Arc<CloudClient>,
        tokens: Arc<TokenCache>,
        mapper: DpMapper,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            mapper,
            device_id: device_id.into(),
        }
    }

    async fn status(&self) -> Result<Vec<DataPoint>, CoreError> {
        let token = self.tokens.get_token().await?;
        match self.client.device_status(&self.device_id, &token).await {
            Ok(points) => Ok(points),
            Err(e) => {
                if e.is_token_rejected() {
                    self.tokens.invalidate().await;
                }
                Err(e.into())
            }
        }
    }

    /// Current status codes with value kind and category.
    pub async fn raw_data(&self) -> Result<RawDataAnalysis, CoreError> {
        let points = self.status().await?;
        debug!(codes = points.len(), "raw data fetched");

        let codes: Vec<RawCode> = points
            .into_iter()
            .map(|p| RawCode {
                value_kind: p.value.kind(),
                category: self.mapper.categorize(&p.code),
                code: p.code,
                value: p.value,
            })
            .collect();

        Ok(RawDataAnalysis {
            device_id: self.device_id.clone(),
            fetched_at: Utc::now(),
            total_codes: codes.len(),
            codes,
        })
    }

    /// Declared specification, refreshed on every call.
    pub async fn specification(&self) -> Result<DeviceSpecification, CoreError> {
        let token = self.tokens.get_token().await?;
        let resp = match self.client.device_specification(&self.device_id, &token).await {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_token_rejected() {
                    self.tokens.invalidate().await;
                }
                return Err(e.into());
            }
        };
        Ok(DeviceSpecification::from_response(&self.device_id, resp))
    }

    /// Current status compared with the declared specification.
    pub async fn compare(&self) -> Result<Comparison, CoreError> {
        let current = self.status().await?;
        let spec = self.specification().await?;
        Ok(compare(&current, &spec))
    }
}
