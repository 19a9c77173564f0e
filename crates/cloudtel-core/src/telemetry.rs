// ── Service wiring ──
//
// Builds the client, token cache, pipeline, scheduler and diagnostics for
// one device from a `RuntimeConfig`, sharing the client and token cache
// between the write path and the diagnostics.

use std::sync::Arc;

use chrono::Utc;
use cloudtel_api::{CloudClient, RequestSigner, TransportConfig};
use tracing::debug;

use crate::analytics::{AnalyticsEngine, StatusReport};
use crate::config::RuntimeConfig;
use crate::credential::TokenCache;
use crate::diagnostics::Diagnostics;
use crate::enricher::HistoricalEnricher;
use crate::error::CoreError;
use crate::mapper::DpMapper;
use crate::pipeline::Acquisition;
use crate::scheduler::Poller;
use crate::store::ReadingStore;

/// Everything needed to acquire and inspect one device.
pub struct Telemetry {
    poller: Poller,
    diagnostics: Diagnostics,
    tokens: Arc<TokenCache>,
    store: Arc<dyn ReadingStore>,
    analytics: AnalyticsEngine,
}

impl Telemetry {
    pub fn new(config: &RuntimeConfig, store: Arc<dyn ReadingStore>) -> Result<Self, CoreError> {
        config.validate()?;

        let signer = RequestSigner::new(config.client_id.clone(), config.client_secret.clone());
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = Arc::new(CloudClient::new(config.base_url.clone(), signer, &transport)?);
        debug!(base_url = %config.base_url, device_id = %config.device_id, "cloud client ready");

        let tokens = Arc::new(TokenCache::new(Arc::clone(&client)));
        let mapper = DpMapper::new();

        let mut acquisition = Acquisition::new(
            Arc::clone(&client),
            Arc::clone(&tokens),
            Arc::clone(&store),
            config.device_id.clone(),
            config.label.clone(),
        );
        if let Some(settings) = &config.enrich {
            acquisition = acquisition.with_enricher(HistoricalEnricher::new(
                Arc::clone(&client),
                config.device_id.clone(),
                mapper,
                settings.clone(),
            ));
        }

        Ok(Self {
            poller: Poller::new(acquisition, config.poll_interval),
            diagnostics: Diagnostics::new(
                client,
                Arc::clone(&tokens),
                mapper,
                config.device_id.clone(),
            ),
            tokens,
            store,
            analytics: AnalyticsEngine::new(mapper.active_channels()),
        })
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        &self.store
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    /// Status report over the store plus the scheduler's current state.
    pub async fn status_report(&self) -> Result<StatusReport, CoreError> {
        let readings = self.store.list().await?;
        let state = *self.poller.state().borrow();
        let last = self.poller.last_outcome().borrow().clone();
        Ok(self
            .analytics
            .status_report(&readings, Utc::now(), Some(state), last))
    }
}
