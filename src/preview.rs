use crate::presentation::SnapshotStatus;
use crate::session::SessionStorage;
use crate::snapshot::DataSnapshot;
use crate::storage::SnapshotStore;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ReportPreview {
    key: String,
    snapshot: DataSnapshot,
}

impl ReportPreview {
    pub fn open<S: SessionStorage>(
        key: impl Into<String>,
        store: &mut SnapshotStore<S>,
        dashboard: &Value,
    ) -> Self {
        let key = key.into();

        let snapshot = match store.load(&key) {
            Some(snapshot) => {
                debug!(key = %key, data_hash = snapshot.data_hash(), "Resumed report snapshot");
                snapshot
            }
            None => {
                let snapshot = DataSnapshot::build(dashboard);
                store.save(&key, &snapshot);
                debug!(key = %key, data_hash = snapshot.data_hash(), "Locked new report snapshot");
                snapshot
            }
        };

        Self { key, snapshot }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn snapshot(&self) -> &DataSnapshot {
        &self.snapshot
    }

    pub fn status(&self, current: &Value) -> SnapshotStatus {
        SnapshotStatus::of(&self.snapshot, current)
    }

    pub fn refresh<S: SessionStorage>(
        &mut self,
        store: &mut SnapshotStore<S>,
        dashboard: &Value,
    ) -> &DataSnapshot {
        store.clear(&self.key);

        self.snapshot = DataSnapshot::build(dashboard);
        store.save(&self.key, &self.snapshot);
        debug!(key = %self.key, data_hash = self.snapshot.data_hash(), "Refreshed report snapshot");

        &self.snapshot
    }

    pub fn discard<S: SessionStorage>(self, store: &mut SnapshotStore<S>) -> DataSnapshot {
        store.clear(&self.key);
        debug!(key = %self.key, "Discarded report snapshot");
        self.snapshot
    }
}
