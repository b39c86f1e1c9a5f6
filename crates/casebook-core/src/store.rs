//! Typed get/set over a `StorageAdapter`, publishing every write.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::bus::{EventBus, Snapshot};
use crate::error::Result;
use crate::models::{Appointment, Case, SlotIndex};
use crate::storage::{Collection, StorageAdapter};

/// A value stored as one whole collection.
pub trait CollectionData: Serialize + DeserializeOwned + Default + Send + Sync {
    const COLLECTION: Collection;

    fn snapshot(&self) -> Snapshot;
}

impl CollectionData for Vec<Case> {
    const COLLECTION: Collection = Collection::Cases;

    fn snapshot(&self) -> Snapshot {
        Snapshot::Cases(self.clone())
    }
}

impl CollectionData for Vec<Appointment> {
    const COLLECTION: Collection = Collection::Appointments;

    fn snapshot(&self) -> Snapshot {
        Snapshot::Appointments(self.clone())
    }
}

impl CollectionData for SlotIndex {
    const COLLECTION: Collection = Collection::BookedSlots;

    fn snapshot(&self) -> Snapshot {
        Snapshot::BookedSlots(self.clone())
    }
}

/// Cheap to clone; all clones share the adapter and the bus.
#[derive(Clone)]
pub struct CollectionStore {
    adapter: Arc<dyn StorageAdapter>,
    bus: Arc<EventBus>,
}

impl CollectionStore {
    pub fn new(adapter: Arc<dyn StorageAdapter>, bus: Arc<EventBus>) -> Self {
        Self { adapter, bus }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn kind(&self) -> &'static str {
        self.adapter.kind()
    }

    /// Whether the collection has ever been written.
    pub async fn exists(&self, collection: Collection) -> Result<bool> {
        Ok(self.adapter.read(collection).await?.is_some())
    }

    /// Load a collection. Absent collections read as `T::default()`.
    ///
    /// Records stored without an `id` get one here, and the collection is
    /// written back at once so the same id is seen on every later read.
    pub async fn read<T: CollectionData>(&self) -> Result<T> {
        match self.adapter.read(T::COLLECTION).await? {
            Some(raw) => {
                let records: serde_json::Value = serde_json::from_str(&raw)?;
                let missing_ids = lacks_ids(&records);
                let value: T = serde_json::from_value(records)?;
                if missing_ids {
                    self.persist_generated_ids(&value).await;
                }
                Ok(value)
            }
            None => {
                debug!(collection = %T::COLLECTION, "Collection absent, using empty default");
                Ok(T::default())
            }
        }
    }

    /// Persist a collection, then notify subscribers.
    ///
    /// Subscribers are notified with `value` even when persisting failed; the
    /// failure is logged and returned.
    pub async fn write<T: CollectionData>(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let persisted = self.adapter.write(T::COLLECTION, &raw).await;
        if let Err(ref e) = persisted {
            warn!(
                collection = %T::COLLECTION,
                backend = self.adapter.kind(),
                error = %e,
                "Failed to persist collection"
            );
        }

        self.bus.publish(&value.snapshot());
        persisted
    }

    // No publish: subscribers already hold equivalent records. A failed
    // write leaves the read usable; the ids are regenerated next time.
    async fn persist_generated_ids<T: CollectionData>(&self, value: &T) {
        let persisted = match serde_json::to_string(value) {
            Ok(raw) => self.adapter.write(T::COLLECTION, &raw).await,
            Err(e) => Err(e.into()),
        };
        match persisted {
            Ok(()) => debug!(collection = %T::COLLECTION, "Assigned ids to records stored without one"),
            Err(e) => warn!(collection = %T::COLLECTION, error = %e, "Failed to persist generated ids"),
        }
    }
}

fn lacks_ids(records: &serde_json::Value) -> bool {
    records
        .as_array()
        .map(|items| items.iter().any(|item| item.get("id").is_none()))
        .unwrap_or(false)
}
