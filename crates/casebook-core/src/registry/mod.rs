//! Registries over the case and appointment collections.
//!
//! Both registries do read-modify-write cycles through the shared
//! `CollectionStore`; there is no locking, so a single logical writer is
//! assumed. Failures are logged here, at the operation boundary, and handed
//! back as `Err` without further detail leaking into callers' control flow.
//!
//! - `CaseRegistry`: CRUD + search, cascades deletes into appointments
//! - `AppointmentRegistry`: CRUD, owns the derived slot index

pub mod appointments;
pub mod cases;

use std::fmt;

use tracing::warn;

use crate::error::Result;
use crate::models::RecordId;

pub use appointments::AppointmentRegistry;
pub use cases::CaseRegistry;

/// Address of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRef {
    Id(RecordId),
    /// Position in the stored list. Shifts after deletions; prefer `Id`.
    Position(usize),
}

impl From<RecordId> for CaseRef {
    fn from(id: RecordId) -> Self {
        CaseRef::Id(id)
    }
}

impl From<usize> for CaseRef {
    fn from(pos: usize) -> Self {
        CaseRef::Position(pos)
    }
}

impl fmt::Display for CaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseRef::Id(id) => write!(f, "case {}", id),
            CaseRef::Position(pos) => write!(f, "case #{}", pos),
        }
    }
}

/// Address of an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentRef {
    Id(RecordId),
    /// Position in the stored list, history included.
    Position(usize),
    /// The active appointment booked under this name and phone.
    Identity { name: String, phone: String },
}

impl AppointmentRef {
    pub fn identity(name: impl Into<String>, phone: impl Into<String>) -> Self {
        AppointmentRef::Identity {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

impl From<RecordId> for AppointmentRef {
    fn from(id: RecordId) -> Self {
        AppointmentRef::Id(id)
    }
}

impl From<usize> for AppointmentRef {
    fn from(pos: usize) -> Self {
        AppointmentRef::Position(pos)
    }
}

impl fmt::Display for AppointmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentRef::Id(id) => write!(f, "appointment {}", id),
            AppointmentRef::Position(pos) => write!(f, "appointment #{}", pos),
            AppointmentRef::Identity { name, phone } => {
                write!(f, "active appointment for {} ({})", name, phone)
            }
        }
    }
}

/// Log a failed operation at the registry boundary.
fn logged<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(ref e) = result {
        warn!(operation = operation, error = %e, "Registry operation failed");
    }
    result
}

/// Collapse a failed list read into an empty result.
fn or_empty<T: Default>(operation: &'static str, result: Result<T>) -> T {
    logged(operation, result).unwrap_or_default()
}
