//! Shared helpers for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::bus::{Snapshot, Subscriber};
use crate::error::{DataError, Result};
use crate::storage::{Collection, MemoryStorage, StorageAdapter};

/// Memory storage whose reads and writes can be made to fail on demand.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, collection: Collection) -> Option<String> {
        self.inner.raw(collection)
    }
}

#[async_trait]
impl StorageAdapter for FlakyStorage {
    async fn read(&self, collection: Collection) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DataError::BackendUnavailable("read refused".to_string()));
        }
        self.inner.read(collection).await
    }

    async fn write(&self, collection: Collection, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DataError::BackendUnavailable("write refused".to_string()));
        }
        self.inner.write(collection, value).await
    }

    fn kind(&self) -> &'static str {
        "flaky"
    }
}

/// A subscriber that only counts deliveries.
pub fn counting_subscriber() -> (Subscriber, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let subscriber: Subscriber = Arc::new(move |_: &Snapshot| -> anyhow::Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (subscriber, count)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}
