use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::{ParseError, RecordId, TimeRange};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(ParseError::AppointmentStatus(s.to_string())),
        }
    }
}

/// Missing, null or unrecognized statuses normalize to `Confirmed`.
fn lenient_status<'de, D>(deserializer: D) -> Result<AppointmentStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default = "RecordId::generate")]
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: TimeRange,
    /// Human-readable label for `date`, e.g. "Oct 16 (Thu)".
    #[serde(default)]
    pub display_date: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        date: NaiveDate,
        time: impl Into<TimeRange>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            name: name.into(),
            phone: phone.into(),
            date,
            time: time.into(),
            display_date: String::new(),
            status: AppointmentStatus::Confirmed,
        }
    }

    pub fn with_display_date(mut self, label: impl Into<String>) -> Self {
        self.display_date = label.into();
        self
    }

    /// Active means anything other than cancelled.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn has_identity(&self, name: &str, phone: &str) -> bool {
        self.name == name && self.phone == phone
    }

    pub fn occupies(&self, date: NaiveDate, time: &TimeRange) -> bool {
        self.status == AppointmentStatus::Confirmed && self.date == date && &self.time == time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Appointment {
        serde_json::from_str(json).expect("Failed to parse appointment test JSON")
    }

    #[test]
    fn test_appointment_wire_format() {
        let appt = parse(
            r#"{"name":"Zhang San","phone":"13800138001","date":"2025-10-16","time":"10:00-11:00","displayDate":"Oct 16 (Thu)","status":"confirmed"}"#,
        );
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2025, 10, 16).unwrap());
        assert_eq!(appt.time.as_str(), "10:00-11:00");
        assert_eq!(appt.display_date, "Oct 16 (Thu)");
        assert!(appt.is_active());

        let value = serde_json::to_value(&appt).unwrap();
        assert_eq!(value["displayDate"], "Oct 16 (Thu)");
        assert_eq!(value["date"], "2025-10-16");
    }

    #[test]
    fn test_appointment_status_normalization() {
        let missing = parse(r#"{"name":"A","phone":"1","date":"2025-09-18","time":"09:00-10:00"}"#);
        assert_eq!(missing.status, AppointmentStatus::Confirmed);

        let null = parse(r#"{"name":"A","phone":"1","date":"2025-09-18","time":"09:00-10:00","status":null}"#);
        assert_eq!(null.status, AppointmentStatus::Confirmed);

        let bogus = parse(r#"{"name":"A","phone":"1","date":"2025-09-18","time":"09:00-10:00","status":"maybe"}"#);
        assert_eq!(bogus.status, AppointmentStatus::Confirmed);

        let cancelled = parse(r#"{"name":"A","phone":"1","date":"2025-09-18","time":"09:00-10:00","status":"cancelled"}"#);
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(!cancelled.is_active());
    }

    #[test]
    fn test_occupies_only_when_confirmed() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 18).unwrap();
        let slot = TimeRange::from("09:00-10:00");
        let mut appt = Appointment::new("A", "111", date, "09:00-10:00");
        assert!(appt.occupies(date, &slot));
        assert!(!appt.occupies(date, &TimeRange::from("10:00-11:00")));

        appt.status = AppointmentStatus::Cancelled;
        assert!(!appt.occupies(date, &slot));
    }
}
