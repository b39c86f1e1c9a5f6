use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ParseError, RecordId};
use crate::utils::contains_ignore_case;

/// Review status of a case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Approved => "approved",
            CaseStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(CaseStatus::Pending),
            "approved" => Ok(CaseStatus::Approved),
            "rejected" => Ok(CaseStatus::Rejected),
            _ => Err(ParseError::CaseStatus(s.to_string())),
        }
    }
}

/// A case under review. `(name, phone)` links it to its appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Case {
    #[serde(default = "RecordId::generate")]
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub status: CaseStatus,
    /// Explanation shown to the applicant; expected when rejected.
    #[serde(default)]
    pub reason: String,
}

impl Case {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into(),
            phone: phone.into(),
            status: CaseStatus::Pending,
            reason: String::new(),
        }
    }

    pub fn with_status(mut self, status: CaseStatus, reason: impl Into<String>) -> Self {
        self.status = status;
        self.reason = reason.into();
        self
    }

    pub fn has_identity(&self, name: &str, phone: &str) -> bool {
        self.name == name && self.phone == phone
    }

    /// Case-insensitive substring match against name or phone.
    /// `term` is expected to be trimmed already.
    pub fn matches_term(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term) || contains_ignore_case(&self.phone, term)
    }
}
