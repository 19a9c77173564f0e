// ── Acquisition pipeline ──
//
// One poll tick: token -> status -> map -> backfill -> stamp -> store.
// Every failure is folded into a `PollOutcome`; nothing escapes to the
// scheduler loop.

use std::sync::Arc;

use chrono::Utc;
use cloudtel_api::CloudClient;
use serde::Serialize;
use tracing::{info, warn};

use crate::credential::TokenCache;
use crate::enricher::HistoricalEnricher;
use crate::error::CoreError;
use crate::mapper::DpMapper;
use crate::model::{MappedReading, Reading};
use crate::store::ReadingStore;

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    Stored { reading: Reading },
    Failed { reason: String },
    /// A run was already in flight.
    Skipped,
}

impl PollOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Fetches, maps and stores one reading per run.
pub struct Acquisition {
    client: Arc<CloudClient>,
    tokens: Arc<TokenCache>,
    mapper: DpMapper,
    enricher: Option<HistoricalEnricher>,
    store: Arc<dyn ReadingStore>,
    device_id: String,
    label: String,
}

impl Acquisition {
    pub fn new(
        client: Arc<CloudClient>,
        tokens: Arc<TokenCache>,
        store: Arc<dyn ReadingStore>,
        device_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            mapper: DpMapper::new(),
            enricher: None,
            store,
            device_id: device_id.into(),
            label: label.into(),
        }
    }

    /// Enable historical backfill for incomplete snapshots.
    pub fn with_enricher(mut self, enricher: HistoricalEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        &self.store
    }

    /// Run the whole pipeline once.
    pub async fn run_once(&self) -> PollOutcome {
        let mapped = match self.fetch_mapped().await {
            Ok(mapped) => mapped,
            Err(e) => {
                warn!(device_id = %self.device_id, error = %e, "poll failed, nothing stored");
                return PollOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let reading = Reading::from_mapped(self.label.clone(), mapped, Utc::now());
        match self.store.save(reading).await {
            Ok(stored) => {
                info!(
                    id = %stored.id,
                    temperature = ?stored.values.temperature,
                    "reading stored"
                );
                PollOutcome::Stored { reading: stored }
            }
            Err(e) => {
                warn!(error = %e, "failed to persist reading, dropped for this cycle");
                PollOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_mapped(&self) -> Result<MappedReading, CoreError> {
        let token = self.tokens.get_token().await?;

        let points = match self.client.device_status(&self.device_id, &token).await {
            Ok(points) => points,
            Err(e) => {
                if e.is_token_rejected() {
                    self.tokens.invalidate().await;
                }
                return Err(e.into());
            }
        };

        let mapped = self.mapper.map(&points);
        match &self.enricher {
            Some(enricher) => Ok(enricher.enrich(&token, mapped, Utc::now()).await),
            None => Ok(mapped),
        }
    }
}
