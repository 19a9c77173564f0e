// cloudtel-core: Acquisition pipeline between cloudtel-api and the CLI.

pub mod analytics;
pub mod config;
pub mod credential;
pub mod diagnostics;
pub mod enricher;
pub mod error;
pub mod mapper;
pub mod model;
pub mod pipeline;
pub mod scheduler;
pub mod store;
pub mod telemetry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analytics::{AnalyticsEngine, QualityRating, StatusReport, Trend};
pub use config::{EnrichSettings, RuntimeConfig};
pub use credential::{Credential, TokenCache};
pub use diagnostics::{Comparison, DeviceSpecification, Diagnostics, RawDataAnalysis};
pub use enricher::HistoricalEnricher;
pub use error::{CoreError, DiagnosticCode, DiagnosticFailure};
pub use mapper::DpMapper;
pub use model::{Channel, ChannelValues, MappedReading, Reading, ReadingInput};
pub use pipeline::{Acquisition, PollOutcome};
pub use scheduler::{PollState, Poller};
pub use store::{JsonFileStore, MemoryStore, ReadingStore};
pub use telemetry::Telemetry;
