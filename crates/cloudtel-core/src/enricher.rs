// ── Historical backfill ──
//
// When a status snapshot leaves active channels empty, the report-log
// endpoint is queried over a trailing window and the most recent logged
// value of each missing code fills the gap. Populated fields are never
// touched and failures only cost the backfill.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudtel_api::{CloudClient, LogEntry, LogQuery};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::{EnrichSettings, MAX_LOG_PAGE_SIZE};
use crate::mapper::DpMapper;
use crate::model::MappedReading;

/// Backfills missing channels from report logs.
pub struct HistoricalEnricher {
    client: Arc<CloudClient>,
    device_id: String,
    mapper: DpMapper,
    settings: EnrichSettings,
}

impl HistoricalEnricher {
    pub fn new(
        client: Arc<CloudClient>,
        device_id: impl Into<String>,
        mapper: DpMapper,
        mut settings: EnrichSettings,
    ) -> Self {
        if settings.page_size > MAX_LOG_PAGE_SIZE {
            warn!(
                requested = settings.page_size,
                cap = MAX_LOG_PAGE_SIZE,
                "log page size capped"
            );
            settings.page_size = MAX_LOG_PAGE_SIZE;
        }
        Self {
            client,
            device_id: device_id.into(),
            mapper,
            settings,
        }
    }

    /// Vendor codes of active channels still empty in `mapped`.
    pub fn missing_codes(&self, mapped: &MappedReading) -> Vec<&'static str> {
        self.mapper
            .active_channels()
            .into_iter()
            .filter(|c| !mapped.values.is_present(*c))
            .filter_map(|c| self.mapper.code_for(c))
            .collect()
    }

    /// Fill empty active channels from the report log ending at `now`.
    pub async fn enrich(
        &self,
        token: &SecretString,
        mut mapped: MappedReading,
        now: DateTime<Utc>,
    ) -> MappedReading {
        let missing = self.missing_codes(&mapped);
        if missing.is_empty() {
            return mapped;
        }

        let window_ms = i64::try_from(self.settings.window.as_millis()).unwrap_or(i64::MAX);
        let end_time = now.timestamp_millis();
        let query = LogQuery {
            codes: &missing,
            start_time: end_time.saturating_sub(window_ms),
            end_time,
            size: self.settings.page_size,
        };

        let entries = match self.client.report_logs(&self.device_id, &query, token).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, codes = ?missing, "historical backfill failed");
                return mapped;
            }
        };
        debug!(entries = entries.len(), "report log entries received");

        let filled = backfill(&self.mapper, &mut mapped, &missing, &entries);
        if filled > 0 {
            info!(filled, "backfilled channels from report log");
        }
        mapped
    }
}

/// Most recent entry per code. Equal timestamps keep the first seen.
pub fn latest_per_code(entries: &[LogEntry]) -> HashMap<&str, &LogEntry> {
    let mut latest: HashMap<&str, &LogEntry> = HashMap::new();
    for entry in entries {
        match latest.get(entry.code.as_str()) {
            Some(current) if current.time >= entry.time => {}
            _ => {
                latest.insert(entry.code.as_str(), entry);
            }
        }
    }
    latest
}

/// Apply the latest logged value of each `codes` entry to empty channels.
///
/// Returns the number of channels written.
pub fn backfill(
    mapper: &DpMapper,
    mapped: &mut MappedReading,
    codes: &[&str],
    entries: &[LogEntry],
) -> usize {
    let latest = latest_per_code(entries);
    let mut filled = 0;

    for code in codes {
        let Some(entry) = latest.get(code) else {
            continue;
        };
        let Some((channel, value)) = mapper.map_value(code, &entry.value) else {
            continue;
        };
        if mapped.values.fill(channel, value) {
            filled += 1;
            if !mapped.source_codes.iter().any(|c| c == code) {
                mapped.source_codes.push((*code).to_owned());
            }
        }
    }

    filled
}
