// Vendor open API response types
//
// Every response is wrapped in the `VendorResponse<T>` envelope. Fields use
// `#[serde(default)]` liberally because the vendor omits optional keys
// depending on device category and API version.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard vendor response envelope.
///
/// ```json
/// { "success": true, "result": ..., "t": 1700000000000 }
/// { "success": false, "code": 1010, "msg": "token invalid" }
/// ```
#[derive(Debug, Deserialize)]
pub struct VendorResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub t: Option<i64>,
}

// ── Token ────────────────────────────────────────────────────────────

/// Result of `GET /v1.0/token?grant_type=1`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expire_time: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

// ── Data points ──────────────────────────────────────────────────────

/// A data-point value as reported by the vendor.
///
/// Devices report numbers, booleans, enum strings and occasionally
/// structured JSON under the same `value` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DpValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl DpValue {
    /// Numeric view of the value; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::Other(_) => None,
        }
    }

    /// Short name of the JSON kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::Other(_) => "json",
        }
    }
}

/// One entry of the live status call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub code: String,
    pub value: DpValue,
}

// ── Specification ────────────────────────────────────────────────────

/// Result of `GET /v1.0/iot-03/devices/{id}/specification`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSpecificationResponse {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub functions: Vec<SpecEntry>,
    #[serde(default)]
    pub status: Vec<SpecEntry>,
}

/// A declared data point. `values` is a JSON document encoded as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecEntry {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub dp_type: Option<String>,
    #[serde(default)]
    pub values: Option<String>,
}

impl SpecEntry {
    /// Parse the `values` string leniently; malformed documents yield `None`.
    pub fn declared_values(&self) -> Option<DeclaredValues> {
        let raw = self.values.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        serde_json::from_str(raw).ok()
    }
}

/// The commonly present keys of a spec entry's `values` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredValues {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub scale: Option<i32>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub range: Option<Vec<String>>,
}

// ── Report logs ──────────────────────────────────────────────────────

/// One historical value from the report-log endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub code: String,
    pub value: DpValue,
    /// Report time, ms since epoch.
    pub time: i64,
}

/// The report-log result: a bare list, or a page object wrapping one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LogPage {
    List(Vec<LogEntry>),
    Paged {
        #[serde(default)]
        logs: Vec<LogEntry>,
        #[serde(default)]
        has_more: bool,
    },
}

impl LogPage {
    pub fn into_entries(self) -> Vec<LogEntry> {
        match self {
            Self::List(entries) | Self::Paged { logs: entries, .. } => entries,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dp_values_decode_by_json_kind() {
        let points: Vec<DataPoint> = serde_json::from_value(json!([
            { "code": "temp_current", "value": 235 },
            { "code": "ph_current", "value": 7.2 },
            { "code": "switch", "value": true },
            { "code": "mode", "value": "auto" },
            { "code": "cfg", "value": { "a": 1 } }
        ]))
        .unwrap();

        assert_eq!(points[0].value, DpValue::Integer(235));
        assert_eq!(points[1].value, DpValue::Float(7.2));
        assert_eq!(points[2].value.kind(), "boolean");
        assert_eq!(points[3].value.kind(), "string");
        assert_eq!(points[4].value.kind(), "json");
    }

    #[test]
    fn numeric_view_accepts_numeric_strings() {
        assert_eq!(DpValue::Text(" 235 ".into()).as_f64(), Some(235.0));
        assert_eq!(DpValue::Text("auto".into()).as_f64(), None);
        assert_eq!(DpValue::Bool(true).as_f64(), None);
        assert_eq!(DpValue::Integer(-12).as_f64(), Some(-12.0));
    }

    #[test]
    fn declared_values_parse_leniently() {
        let entry = SpecEntry {
            code: "temp_current".into(),
            name: Some("Temperature".into()),
            dp_type: Some("Integer".into()),
            values: Some(r#"{"unit":"℃","min":-200,"max":1200,"scale":1,"step":1}"#.into()),
        };
        let values = entry.declared_values().unwrap();
        assert_eq!(values.unit.as_deref(), Some("℃"));
        assert_eq!(values.min, Some(-200.0));
        assert_eq!(values.max, Some(1200.0));
        assert_eq!(values.scale, Some(1));

        let broken = SpecEntry {
            values: Some("not json".into()),
            ..entry
        };
        assert!(broken.declared_values().is_none());
    }

    #[test]
    fn log_page_accepts_both_shapes() {
        let bare: LogPage = serde_json::from_value(json!([
            { "code": "temp_current", "value": "231", "time": 1 }
        ]))
        .unwrap();
        assert_eq!(bare.into_entries().len(), 1);

        let paged: LogPage = serde_json::from_value(json!({
            "logs": [{ "code": "temp_current", "value": 231, "time": 2 }],
            "has_more": false
        }))
        .unwrap();
        assert_eq!(paged.into_entries()[0].time, 2);
    }

    fn envelope<T: serde::de::DeserializeOwned>(body: &str) -> VendorResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn failure_envelope_without_result_decodes() {
        let env: VendorResponse<Vec<DataPoint>> =
            envelope(r#"{"success":false,"code":1010,"msg":"token invalid"}"#);
        assert!(!env.success);
        assert!(env.result.is_none());
        assert_eq!(env.code, Some(1010));
    }
}
