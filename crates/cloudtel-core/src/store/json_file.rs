// ── JSON file store ──
//
// Keeps every reading in one JSON array on disk. Each mutation reads the
// file, applies the change and rewrites it through a temporary sibling,
// all under one async mutex.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{ReadingStore, sort_chronologically};
use crate::error::CoreError;
use crate::model::Reading;

/// File-backed store used by the CLI.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Reading>, CoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CoreError::persistence(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::persistence(format!("corrupt store {}: {e}", self.path.display()))
        })
    }

    async fn write(&self, readings: &[Reading]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(CoreError::persistence)?;
        }
        let json = serde_json::to_vec_pretty(readings).map_err(CoreError::persistence)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| CoreError::persistence(format!("cannot write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CoreError::persistence(format!("cannot replace {}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), records = readings.len(), "store written");
        Ok(())
    }
}

#[async_trait]
impl ReadingStore for JsonFileStore {
    async fn save(&self, reading: Reading) -> Result<Reading, CoreError> {
        let _guard = self.lock.lock().await;
        let mut all = self.load().await?;
        all.push(reading.clone());
        self.write(&all).await?;
        Ok(reading)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reading>, CoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    async fn list(&self) -> Result<Vec<Reading>, CoreError> {
        let _guard = self.lock.lock().await;
        let mut all = self.load().await?;
        sort_chronologically(&mut all);
        Ok(all)
    }

    async fn update(&self, id: Uuid, mut reading: Reading) -> Result<Option<Reading>, CoreError> {
        let _guard = self.lock.lock().await;
        let mut all = self.load().await?;
        let Some(slot) = all.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        reading.id = id;
        *slot = reading.clone();
        self.write(&all).await?;
        Ok(Some(reading))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let _guard = self.lock.lock().await;
        let mut all = self.load().await?;
        let before = all.len();
        all.retain(|r| r.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.write(&all).await?;
        Ok(true)
    }
}
