//! Attendance record domain model.
//!
//! # Responsibility
//! - Define the five-field record persisted in the attendance table.
//!
//! # Invariants
//! - Field order is fixed: date, student name, subject, period, status.
//! - `date` is kept as stored text (`YYYY-MM-DD` when written by this crate).
//! - A record may reference a student that is no longer registered.

use crate::model::options::{Period, Status, Subject};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// In-memory handle for one record inside an open store.
///
/// Not persisted; see `CsvAttendanceStore` for its lifetime rules.
pub type RecordId = Uuid;

/// One attendance entry for a student, subject, period and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub student_name: String,
    pub subject: Subject,
    pub period: Period,
    pub status: Status,
}

impl AttendanceRecord {
    pub fn new(
        date: impl Into<String>,
        student_name: impl Into<String>,
        subject: Subject,
        period: Period,
        status: Status,
    ) -> Self {
        Self {
            date: date.into(),
            student_name: student_name.into(),
            subject,
            period,
            status,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status.is_present()
    }
}

/// Single-line summary, e.g. `Alice | Physics | Period 2 | 2024-03-01 | Present`.
impl Display for AttendanceRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | {} | {}",
            self.student_name, self.subject, self.period, self.date, self.status
        )
    }
}
