//! Demo records written by `Casebook::initialize` when demo data is enabled.

use chrono::NaiveDate;

use crate::models::{Appointment, Case, CaseStatus};
use crate::utils::format_display_date;

pub fn demo_cases() -> Vec<Case> {
    vec![
        Case::new("Zhang San", "13800138001").with_status(CaseStatus::Approved, ""),
        Case::new("Li Si", "13900139002").with_status(
            CaseStatus::Rejected,
            "Submitted documents are incomplete, please provide proof of identity",
        ),
        Case::new("Wang Wu", "13700137003").with_status(
            CaseStatus::Pending,
            "Your application is under review, please wait",
        ),
    ]
}

pub fn demo_appointments() -> Vec<Appointment> {
    let Some(date) = NaiveDate::from_ymd_opt(2025, 10, 16) else {
        return Vec::new();
    };
    vec![Appointment::new("Zhang San", "13800138001", date, "10:00-11:00")
        .with_display_date(format_display_date(date))]
}
