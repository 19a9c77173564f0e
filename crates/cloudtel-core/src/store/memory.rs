// ── In-memory store ──

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{ReadingStore, sort_chronologically};
use crate::error::CoreError;
use crate::model::Reading;

/// Lock-free in-memory store keyed by reading id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: DashMap<Uuid, Reading>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn save(&self, reading: Reading) -> Result<Reading, CoreError> {
        self.readings.insert(reading.id, reading.clone());
        Ok(reading)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reading>, CoreError> {
        Ok(self.readings.get(&id).map(|r| r.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Reading>, CoreError> {
        let mut all: Vec<Reading> = self.readings.iter().map(|r| r.value().clone()).collect();
        sort_chronologically(&mut all);
        Ok(all)
    }

    async fn update(&self, id: Uuid, mut reading: Reading) -> Result<Option<Reading>, CoreError> {
        let Some(mut existing) = self.readings.get_mut(&id) else {
            return Ok(None);
        };
        reading.id = id;
        *existing = reading.clone();
        Ok(Some(reading))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        Ok(self.readings.remove(&id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ChannelValues, ReadingInput};
    use chrono::{DateTime, TimeDelta, Utc};

    fn reading_at(ts: DateTime<Utc>, temp: f64) -> Reading {
        ReadingInput {
            label: None,
            values: ChannelValues {
                temperature: Some(temp),
                ..ChannelValues::default()
            },
            timestamp: Some(ts),
        }
        .into_reading(Uuid::new_v4(), ts).unwrap()
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let saved = store.save(reading_at(now, 20.0)).await.unwrap();

        assert_eq!(store.get(saved.id).await.unwrap().unwrap().values.temperature, Some(20.0));

        let replacement = reading_at(now, 25.0);
        let updated = store.update(saved.id, replacement).await.unwrap().unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.values.temperature, Some(25.0));
        assert_eq!(store.len(), 1);

        assert!(store.delete(saved.id).await.unwrap());
        assert!(!store.delete(saved.id).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_id_is_none() {
        let store = MemoryStore::new();
        let r = reading_at(Utc::now(), 20.0);
        assert!(store.update(Uuid::new_v4(), r).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.save(reading_at(now, 2.0)).await.unwrap();
        store.save(reading_at(now - TimeDelta::minutes(5), 1.0)).await.unwrap();

        let temps: Vec<_> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.values.temperature)
            .collect();
        assert_eq!(temps, vec![Some(1.0), Some(2.0)]);
    }
}
