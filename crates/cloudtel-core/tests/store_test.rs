// JSON file store behaviour on a real filesystem.
#![allow(clippy::unwrap_used)]

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use cloudtel_core::{ChannelValues, JsonFileStore, Reading, ReadingInput, ReadingStore};

fn reading(ts: DateTime<Utc>, temperature: f64) -> Reading {
    ReadingInput {
        label: Some("Tank".into()),
        values: ChannelValues {
            temperature: Some(temperature),
            ..ChannelValues::default()
        },
        timestamp: Some(ts),
    }
    .into_reading(Uuid::new_v4(), ts).unwrap()
}

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("readings.json"));
    assert!(store.list().await.unwrap().is_empty());
    assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_readings_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested").join("readings.json");
    let now = Utc::now();

    let first = {
        let store = JsonFileStore::new(&file);
        let a = store.save(reading(now, 21.0)).await.unwrap();
        store.save(reading(now - TimeDelta::hours(1), 19.0)).await.unwrap();
        a
    };

    let reopened = JsonFileStore::new(&file);
    let all = reopened.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].values.temperature, Some(19.0));
    assert_eq!(all[1], first);
}

#[tokio::test]
async fn test_update_replaces_all_fields_and_keeps_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("readings.json"));
    let now = Utc::now();
    let saved = store.save(reading(now, 21.0)).await.unwrap();

    let mut replacement = reading(now - TimeDelta::minutes(3), 24.0);
    replacement.label = "Renamed".into();
    replacement.values.ph = Some(7.1);

    let updated = store.update(saved.id, replacement).await.unwrap().unwrap();
    assert_eq!(updated.id, saved.id);

    let fetched = store.get(saved.id).await.unwrap().unwrap();
    assert_eq!(fetched.label, "Renamed");
    assert_eq!(fetched.values.temperature, Some(24.0));
    assert_eq!(fetched.values.ph, Some(7.1));
    assert_eq!(fetched.timestamp, now - TimeDelta::minutes(3));

    assert!(store.update(Uuid::new_v4(), reading(now, 1.0)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_reports_presence() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("readings.json"));
    let saved = store.save(reading(Utc::now(), 21.0)).await.unwrap();

    assert!(store.delete(saved.id).await.unwrap());
    assert!(!store.delete(saved.id).await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_a_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("readings.json");
    std::fs::write(&file, "{ not json").unwrap();

    let store = JsonFileStore::new(&file);
    let err = store.list().await.unwrap_err();
    assert!(err.to_string().contains("Persistence error"));
}
