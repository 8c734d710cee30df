//! Attendance percentage query.
//!
//! # Invariants
//! - Only `student_name` and `subject` text participate in filtering.
//! - Only `Status::Present` counts as attended; unrecognized statuses count
//!   toward the total but never as present.
//! - An empty filtered set is an error, never a 0% report.

use crate::model::record::AttendanceRecord;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Subject filter value meaning "do not filter by subject".
pub const ALL_SUBJECTS: &str = "All";

/// Aggregated attendance for one student (and optionally one subject).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageReport {
    pub present: usize,
    pub total: usize,
    /// `100 * present / total`, unrounded.
    pub percentage: f64,
}

impl Display for PercentageReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Classes Attended: {}/{} | Attendance: {:.2}%",
            self.present, self.total, self.percentage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Filters matched no record. Unknown students land here too.
    NoMatchingRecords {
        student: String,
        subject: Option<String>,
    },
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatchingRecords {
                student,
                subject: Some(subject),
            } => write!(f, "no records found for `{student}` in `{subject}`"),
            Self::NoMatchingRecords {
                student,
                subject: None,
            } => write!(f, "no records found for `{student}`"),
        }
    }
}

impl Error for ReportError {}

/// Computes attendance for `student`, optionally restricted to `subject`.
///
/// `subject` of `None` or `Some("All")` aggregates across subjects.
pub fn attendance_percentage(
    records: &[AttendanceRecord],
    student: &str,
    subject: Option<&str>,
) -> Result<PercentageReport, ReportError> {
    let subject = subject.filter(|value| *value != ALL_SUBJECTS);
    let matched = records
        .iter()
        .filter(|record| record.student_name == student)
        .filter(|record| subject.map_or(true, |value| record.subject.as_str() == value));

    let (present, total) = matched.fold((0_usize, 0_usize), |(present, total), record| {
        (present + usize::from(record.is_present()), total + 1)
    });

    if total == 0 {
        return Err(ReportError::NoMatchingRecords {
            student: student.to_string(),
            subject: subject.map(str::to_string),
        });
    }

    Ok(PercentageReport {
        present,
        total,
        percentage: 100.0 * present as f64 / total as f64,
    })
}

/// Student names appearing in `records`, in first-appearance order.
pub fn distinct_students(records: &[AttendanceRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        if !names.iter().any(|name| *name == record.student_name) {
            names.push(record.student_name.clone());
        }
    }
    names
}

/// Per-subject reports for one student, in first-appearance order.
pub fn subject_breakdown(
    records: &[AttendanceRecord],
    student: &str,
) -> Vec<(String, PercentageReport)> {
    let mut subjects: Vec<&str> = Vec::new();
    for record in records.iter().filter(|record| record.student_name == student) {
        let subject = record.subject.as_str();
        if !subjects.contains(&subject) {
            subjects.push(subject);
        }
    }

    subjects
        .into_iter()
        .filter_map(|subject| {
            attendance_percentage(records, student, Some(subject))
                .ok()
                .map(|report| (subject.to_string(), report))
        })
        .collect()
}
