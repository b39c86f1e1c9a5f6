use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Collection, StorageAdapter};
use crate::error::{DataError, Result};

/// In-process key-value storage keyed by `Collection::storage_key`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| DataError::BackendUnavailable("memory storage lock poisoned".to_string()))
    }

    /// Raw stored value, bypassing deserialization.
    pub fn raw(&self, collection: Collection) -> Option<String> {
        self.entries()
            .ok()
            .and_then(|entries| entries.get(collection.storage_key()).cloned())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn read(&self, collection: Collection) -> Result<Option<String>> {
        Ok(self.entries()?.get(collection.storage_key()).cloned())
    }

    async fn write(&self, collection: Collection, value: &str) -> Result<()> {
        self.entries()?
            .insert(collection.storage_key().to_string(), value.to_string());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
