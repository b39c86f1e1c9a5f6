use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{Collection, StorageAdapter};
use crate::error::{DataError, Result};

/// Local persistent storage: `<data_dir>/<storage key>.json` per collection.
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            DataError::BackendUnavailable(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir
            .join(format!("{}.json", collection.storage_key()))
    }
}

#[async_trait]
impl StorageAdapter for FileStorage {
    async fn read(&self, collection: Collection) -> Result<Option<String>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            DataError::BackendUnavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!(collection = %collection, bytes = contents.len(), "Loaded collection from disk");
        Ok(Some(contents))
    }

    async fn write(&self, collection: Collection, value: &str) -> Result<()> {
        let path = self.collection_path(collection);
        std::fs::write(&path, value).map_err(|e| {
            DataError::BackendUnavailable(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(storage.read(Collection::Appointments).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_uses_local_storage_key_as_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.write(Collection::Cases, "[]").await.unwrap();

        assert!(dir.path().join("caseDatabase.json").exists());
        assert_eq!(
            storage.read(Collection::Cases).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_new_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(nested.clone()).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.data_dir(), nested.as_path());
    }
}
