//! Booked time slots.
//!
//! The `SlotIndex` is derived from the confirmed appointments: a time range is
//! listed for a date exactly when a confirmed appointment holds it. It is
//! persisted as its own collection so availability lookups don't need to scan
//! the appointment history.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Appointment, AppointmentStatus};

/// A time range label such as "10:00-11:00".
///
/// Labels are compared as exact strings; overlapping ranges with different
/// labels are not detected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct TimeRange(String);

impl TimeRange {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimeRange {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TimeRange {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from date to the time ranges booked on that date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct SlotIndex(BTreeMap<NaiveDate, Vec<TimeRange>>);

impl SlotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the confirmed appointments in `appointments`.
    pub fn from_appointments<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        let mut index = Self::new();
        for appt in appointments {
            if appt.status == AppointmentStatus::Confirmed {
                index.insert(appt.date, appt.time.clone());
            }
        }
        index
    }

    /// Returns `true` if the slot was not already present.
    pub fn insert(&mut self, date: NaiveDate, time: TimeRange) -> bool {
        let slots = self.0.entry(date).or_default();
        if slots.contains(&time) {
            false
        } else {
            slots.push(time);
            true
        }
    }

    /// Returns `true` if the slot was present. The date entry is kept even
    /// when its last slot is removed.
    pub fn remove(&mut self, date: NaiveDate, time: &TimeRange) -> bool {
        match self.0.get_mut(&date) {
            Some(slots) => match slots.iter().position(|t| t == time) {
                Some(pos) => {
                    slots.remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    pub fn booked_on(&self, date: NaiveDate) -> &[TimeRange] {
        self.0.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_booked(&self, date: NaiveDate, time: &TimeRange) -> bool {
        self.booked_on(date).contains(time)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<TimeRange>)> {
        self.0.iter()
    }

    /// Total number of booked slots across all dates.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare bookings ignoring slot order and dates with no slots.
    pub fn same_bookings(&self, other: &SlotIndex) -> bool {
        self.as_sets() == other.as_sets()
    }

    fn as_sets(&self) -> BTreeMap<NaiveDate, BTreeSet<&TimeRange>> {
        self.0
            .iter()
            .filter(|(_, slots)| !slots.is_empty())
            .map(|(date, slots)| (*date, slots.iter().collect()))
            .collect()
    }
}
