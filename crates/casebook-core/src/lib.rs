//! Casebook core library.
//!
//! Case review and appointment booking over a pluggable storage backend.
//! A [`Casebook`] wires one [`EventBus`] and one [`CollectionStore`] into the
//! case and appointment registries; every collection write is published to
//! subscribers of that collection.
//!
//! ```no_run
//! # async fn demo() -> casebook_core::Result<()> {
//! use std::sync::Arc;
//! use casebook_core::{Casebook, Case, MemoryStorage};
//!
//! let casebook = Casebook::new(Arc::new(MemoryStorage::new()));
//! casebook.initialize().await?;
//! casebook.cases().add(Case::new("Zhang San", "13800138001")).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod bus;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod store;
pub mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tracing::{debug, info};

pub use api::{HttpError, HttpStorage};
pub use bus::{EventBus, Snapshot, Subscriber};
pub use config::{BackendKind, Config};
pub use error::{DataError, Result};
pub use models::{
    Appointment, AppointmentStatus, Case, CaseStatus, RecordId, SlotIndex, TimeRange,
};
pub use registry::{AppointmentRef, AppointmentRegistry, CaseRef, CaseRegistry};
pub use stats::DataStatistics;
pub use storage::{Collection, FileStorage, MemoryStorage, StorageAdapter};
pub use store::{CollectionData, CollectionStore};

/// Entry point: registries, statistics and change subscription over one
/// storage backend.
#[derive(Clone)]
pub struct Casebook {
    store: CollectionStore,
    cases: CaseRegistry,
    appointments: AppointmentRegistry,
    demo_data: bool,
}

impl Casebook {
    pub fn new(adapter: Arc<dyn StorageAdapter>) -> Self {
        let store = CollectionStore::new(adapter, Arc::new(EventBus::new()));
        let appointments = AppointmentRegistry::new(store.clone());
        let cases = CaseRegistry::new(store.clone(), appointments.clone());
        Self {
            store,
            cases,
            appointments,
            demo_data: false,
        }
    }

    /// Seed absent collections with demo records on `initialize`.
    pub fn with_demo_data(mut self, enabled: bool) -> Self {
        self.demo_data = enabled;
        self
    }

    /// Prepare the backend for use. Safe to call on every start.
    ///
    /// Absent collections are written with their defaults (or demo records),
    /// records stored without an id get one, and the slot index is rebuilt
    /// from confirmed appointments.
    pub async fn initialize(&self) -> Result<()> {
        if !self.store.exists(Collection::Cases).await? {
            let cases = if self.demo_data {
                seed::demo_cases()
            } else {
                Vec::new()
            };
            debug!(count = cases.len(), "Writing initial cases");
            self.store.write(&cases).await?;
        }

        if !self.store.exists(Collection::Appointments).await? {
            let appointments = if self.demo_data {
                seed::demo_appointments()
            } else {
                Vec::new()
            };
            debug!(count = appointments.len(), "Writing initial appointments");
            self.store.write(&appointments).await?;
        }

        // Reading assigns and stores ids for records saved without one
        let _: Vec<Case> = self.store.read().await?;
        let _: Vec<Appointment> = self.store.read().await?;

        let slots = self.appointments.rebuild_slot_index().await?;
        info!(
            backend = self.store.kind(),
            booked_slots = slots.len(),
            "Casebook initialized"
        );
        Ok(())
    }

    pub fn subscribe(&self, collection: Collection, callback: Subscriber) {
        self.store.bus().subscribe(collection, callback);
    }

    pub fn unsubscribe(&self, collection: Collection, callback: &Subscriber) {
        self.store.bus().unsubscribe(collection, callback);
    }

    pub fn cases(&self) -> &CaseRegistry {
        &self.cases
    }

    pub fn appointments(&self) -> &AppointmentRegistry {
        &self.appointments
    }

    pub fn statistics(&self) -> DataStatistics {
        DataStatistics::new(self.cases.clone(), self.appointments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::test_support::{counting_subscriber, date, FlakyStorage};

    #[tokio::test]
    async fn test_initialize_writes_empty_collections() {
        let storage = Arc::new(MemoryStorage::new());
        let casebook = Casebook::new(storage.clone());
        casebook.initialize().await.unwrap();

        assert_eq!(storage.raw(Collection::Cases).as_deref(), Some("[]"));
        assert_eq!(storage.raw(Collection::Appointments).as_deref(), Some("[]"));
        assert_eq!(storage.raw(Collection::BookedSlots).as_deref(), Some("{}"));
        assert!(casebook.cases().get_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_with_demo_data() {
        let casebook = Casebook::new(Arc::new(MemoryStorage::new())).with_demo_data(true);
        casebook.initialize().await.unwrap();

        assert_eq!(casebook.cases().get_all().await.len(), 3);
        let appointments = casebook.appointments().get_all().await;
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].display_date, "Oct 16 (Thu)");
        assert!(
            casebook
                .appointments()
                .is_slot_booked(date("2025-10-16"), &"10:00-11:00".into())
                .await
        );

        let stats = casebook.statistics();
        assert_eq!(stats.total_appointments().await, 1);
        assert_eq!(stats.approved_case_count().await, 1);
        assert_eq!(stats.pending_case_count().await, 1);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let casebook = Casebook::new(storage.clone()).with_demo_data(true);
        casebook.initialize().await.unwrap();
        let cases = storage.raw(Collection::Cases);
        let slots = storage.raw(Collection::BookedSlots);

        let (subscriber, count) = counting_subscriber();
        for collection in Collection::ALL {
            casebook.subscribe(collection, subscriber.clone());
        }
        casebook.initialize().await.unwrap();

        assert_eq!(storage.raw(Collection::Cases), cases);
        assert_eq!(storage.raw(Collection::BookedSlots), slots);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_data() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .write(
                Collection::Appointments,
                r#"[{"name":"A","phone":"111","date":"2025-09-18","time":"09:00-10:00","displayDate":"Sep 18 (Thu)","status":"confirmed"}]"#,
            )
            .await
            .unwrap();

        let casebook = Casebook::new(storage.clone()).with_demo_data(true);
        casebook.initialize().await.unwrap();

        // Existing appointments win over demo data; cases were absent
        let appointments = casebook.appointments().get_all().await;
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].name, "A");
        assert_eq!(casebook.cases().get_all().await.len(), 3);

        // The legacy record got a stable id and its slot is indexed
        assert!(storage.raw(Collection::Appointments).unwrap().contains("\"id\""));
        assert_eq!(casebook.appointments().get_all().await[0].id, appointments[0].id);
        assert!(
            casebook
                .appointments()
                .is_slot_booked(date("2025-09-18"), &"09:00-10:00".into())
                .await
        );
    }

    #[tokio::test]
    async fn test_initialize_reports_unavailable_backend() {
        let storage = Arc::new(FlakyStorage::new());
        storage.fail_reads(true);
        let casebook = Casebook::new(storage);
        assert!(matches!(
            casebook.initialize().await,
            Err(DataError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let casebook = Casebook::new(Arc::new(MemoryStorage::new()));
        let (subscriber, count) = counting_subscriber();
        casebook.subscribe(Collection::Cases, subscriber.clone());

        casebook.cases().add(Case::new("A", "1")).await.unwrap();
        casebook.unsubscribe(Collection::Cases, &subscriber);
        casebook.cases().add(Case::new("B", "2")).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
