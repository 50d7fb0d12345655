use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::fs;

use crate::error::AppError;

/// A durable mirror for one named entry holding the encoded rides document.
#[async_trait]
pub trait RideStorage: Send + Sync {
    /// Returns the stored document, or `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<String>, AppError>;

    /// Replaces the stored document.
    async fn save(&self, raw: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct JsonFileStorage {
    root: Arc<PathBuf>,
    key: Arc<str>,
}

impl JsonFileStorage {
    pub fn new(root: PathBuf, key: &str) -> Self {
        Self {
            root: Arc::new(root),
            key: Arc::from(key),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self) -> PathBuf {
        self.root().join(format!("{}.json", self.key))
    }

    pub async fn ensure_structure(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.root()).await?;
        Ok(())
    }
}

#[async_trait]
impl RideStorage for JsonFileStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        let path = self.entry_path();
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).await?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    async fn save(&self, raw: &str) -> Result<(), AppError> {
        self.ensure_structure().await?;
        let path = self.entry_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Keeps the entry in memory. Used by tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entry: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(raw: impl Into<String>) -> Self {
        Self {
            entry: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    pub fn entry(&self) -> Option<String> {
        self.entry.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RideStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.entry())
    }

    async fn save(&self, raw: &str) -> Result<(), AppError> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| AppError::Other(anyhow::anyhow!("memory storage lock poisoned")))?;
        *entry = Some(raw.to_string());
        Ok(())
    }
}
