//! Data models for casebook records.
//!
//! This module contains the record types stored in the three collections:
//!
//! - `Case`: an application under review, keyed by (name, phone)
//! - `Appointment`: a booked visit, soft-deleted on cancellation
//! - `SlotIndex`: the derived date → booked time ranges mapping
//!
//! `RecordId` is the stable identifier shared by cases and appointments.

pub mod appointment;
pub mod case;
pub mod slot;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use appointment::{Appointment, AppointmentStatus};
pub use case::{Case, CaseStatus};
pub use slot::{SlotIndex, TimeRange};

/// Stable generated identifier for a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ParseError::RecordId(s.to_string()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid record id: {0}")]
    RecordId(String),

    #[error("Unknown case status: {0}")]
    CaseStatus(String),

    #[error("Unknown appointment status: {0}")]
    AppointmentStatus(String),
}
