// ── Reading persistence ──
//
// The acquisition pipeline writes through the `ReadingStore` trait. Two
// stores ship with the crate: an in-memory map and a JSON file.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::Reading;

/// Durable storage for readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist a new reading and return it as stored.
    async fn save(&self, reading: Reading) -> Result<Reading, CoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Reading>, CoreError>;

    /// All readings, oldest first.
    async fn list(&self) -> Result<Vec<Reading>, CoreError>;

    /// Replace every field of an existing reading, keeping its id.
    ///
    /// Returns `None` if no reading has that id.
    async fn update(&self, id: Uuid, reading: Reading) -> Result<Option<Reading>, CoreError>;

    /// Returns `true` if a reading was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, CoreError>;
}

/// Chronological order, id as tie-breaker.
pub(crate) fn sort_chronologically(readings: &mut [Reading]) {
    readings.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
}
