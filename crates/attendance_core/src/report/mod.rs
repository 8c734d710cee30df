//! Read-only aggregations over loaded attendance records.
//!
//! # Responsibility
//! - Compute attendance percentages without touching storage.
//!
//! # See also
//! - `repo::attendance_repo` for how records are loaded.

pub mod percentage;
