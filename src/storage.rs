use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::session::SessionStorage;
use crate::snapshot::DataSnapshot;
use tracing::{debug, warn};

/// `save`, `load` and `clear` log and swallow failures; `try_*` return them.
pub struct SnapshotStore<S: SessionStorage> {
    storage: S,
    key_prefix: String,
}

impl<S: SessionStorage> SnapshotStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key_prefix: String::new(),
        }
    }

    pub fn with_config(storage: S, config: &SnapshotConfig) -> Self {
        Self::new(storage).with_key_prefix(config.key_prefix.clone())
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn save(&mut self, key: &str, snapshot: &DataSnapshot) {
        if let Err(e) = self.try_save(key, snapshot) {
            warn!(key = %key, error = %e, "Failed to persist report snapshot");
        }
    }

    pub fn load(&self, key: &str) -> Option<DataSnapshot> {
        match self.try_load(key) {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                debug!(key = %key, "No persisted report snapshot");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding unreadable report snapshot");
                None
            }
        }
    }

    pub fn clear(&mut self, key: &str) {
        if let Err(e) = self.try_clear(key) {
            warn!(key = %key, error = %e, "Failed to clear report snapshot");
        }
    }

    pub fn try_save(&mut self, key: &str, snapshot: &DataSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;

        let storage_key = self.storage_key(key);
        self.storage.set(&storage_key, json)
    }

    /// `Ok(None)` when nothing is stored under `key`.
    pub fn try_load(&self, key: &str) -> Result<Option<DataSnapshot>> {
        let storage_key = self.storage_key(key);

        let Some(json) = self.storage.get(&storage_key)? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn try_clear(&mut self, key: &str) -> Result<()> {
        let storage_key = self.storage_key(key);
        self.storage.remove(&storage_key)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}
