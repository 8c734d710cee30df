//! Domain model for students and attendance records.
//!
//! # Responsibility
//! - Define the canonical shapes shared by storage, services and reports.
//! - Model closed option sets (subject, period, status) as validated enums.
//!
//! # Invariants
//! - Records are addressed by position; `RecordId` is an in-memory handle.
//! - Unknown persisted option text is preserved, never rejected on load.

pub mod options;
pub mod record;
pub mod student;
