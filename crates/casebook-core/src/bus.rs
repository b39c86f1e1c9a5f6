//! Change notification for the record collections.
//!
//! `EventBus` keeps one subscriber list per collection. Every write through
//! the collection store publishes the full new contents of the collection to
//! that list, synchronously and in registration order.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error};

use crate::models::{Appointment, Case, SlotIndex};
use crate::storage::Collection;

/// Full current contents of one collection, as delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Cases(Vec<Case>),
    Appointments(Vec<Appointment>),
    BookedSlots(SlotIndex),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Snapshot::Cases(_) => Collection::Cases,
            Snapshot::Appointments(_) => Collection::Appointments,
            Snapshot::BookedSlots(_) => Collection::BookedSlots,
        }
    }
}

/// A change callback. Removal matches on the `Arc` pointer, so keep a clone
/// of the handle you subscribed with.
pub type Subscriber = Arc<dyn Fn(&Snapshot) -> anyhow::Result<()> + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<HashMap<Collection, Vec<Subscriber>>>,
}

fn same_subscriber(a: &Subscriber, b: &Subscriber) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lists(&self) -> MutexGuard<'_, HashMap<Collection, Vec<Subscriber>>> {
        // Callbacks never run while this lock is held.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self, collection: Collection, callback: Subscriber) {
        self.lists().entry(collection).or_default().push(callback);
    }

    /// Remove the first registration of `callback`. No-op if absent.
    pub fn unsubscribe(&self, collection: Collection, callback: &Subscriber) {
        if let Some(list) = self.lists().get_mut(&collection) {
            if let Some(pos) = list.iter().position(|s| same_subscriber(s, callback)) {
                list.remove(pos);
            }
        }
    }

    pub fn subscriber_count(&self, collection: Collection) -> usize {
        self.lists().get(&collection).map(Vec::len).unwrap_or(0)
    }

    /// Deliver `snapshot` to every subscriber of its collection.
    ///
    /// The list is copied before delivery, so callbacks may subscribe or
    /// unsubscribe; that takes effect on the next publish. Failing or
    /// panicking callbacks are logged and skipped.
    pub fn publish(&self, snapshot: &Snapshot) {
        let collection = snapshot.collection();
        let targets: Vec<Subscriber> = self
            .lists()
            .get(&collection)
            .cloned()
            .unwrap_or_default();

        debug!(collection = %collection, subscribers = targets.len(), "Publishing change");

        for callback in targets {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(collection = %collection, error = %e, "Error in data change callback");
                }
                Err(_) => {
                    error!(collection = %collection, "Data change callback panicked");
                }
            }
        }
    }
}
