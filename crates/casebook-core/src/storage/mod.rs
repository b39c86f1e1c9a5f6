//! Storage backends for the three record collections.
//!
//! Every backend implements `StorageAdapter`: key-based get/set of a whole
//! collection serialized as JSON. The registries never know which backend
//! they run on.
//!
//! - `MemoryStorage`: process-local map, used for tests and throwaway sessions
//! - `FileStorage`: one JSON file per collection in a data directory
//! - `HttpStorage` (in `crate::api`): REST endpoints on a remote server

pub mod file;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// One of the three named record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Cases,
    Appointments,
    BookedSlots,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Cases,
        Collection::Appointments,
        Collection::BookedSlots,
    ];

    /// Key used by local key-value backends.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Cases => "caseDatabase",
            Collection::Appointments => "appointments",
            Collection::BookedSlots => "bookedSlots",
        }
    }

    /// Endpoint name used by the remote API.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Collection::Cases => "cases",
            Collection::Appointments => "appointments",
            Collection::BookedSlots => "bookedSlots",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Persistence capability injected into a `Casebook`.
///
/// `read` returns `Ok(None)` when the collection has never been written.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn read(&self, collection: Collection) -> Result<Option<String>>;

    async fn write(&self, collection: Collection, value: &str) -> Result<()>;

    /// Short backend name for log fields.
    fn kind(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_keys_and_endpoints_differ_for_cases() {
        assert_eq!(Collection::Cases.storage_key(), "caseDatabase");
        assert_eq!(Collection::Cases.endpoint(), "cases");
        assert_eq!(Collection::BookedSlots.storage_key(), "bookedSlots");
        assert_eq!(Collection::BookedSlots.endpoint(), "bookedSlots");
        assert_eq!(Collection::Appointments.to_string(), "appointments");
    }
}
