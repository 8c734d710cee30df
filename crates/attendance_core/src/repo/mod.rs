//! Repository layer contracts and CSV-backed implementations.
//!
//! # Responsibility
//! - Define the student registry and attendance store contracts.
//! - Keep table layout details inside the core persistence boundary.
//!
//! # Invariants
//! - Every mutation re-reads its table, validates, then rewrites it whole.
//! - Nothing is written when validation fails.
//! - Repository APIs return semantic errors (`AlreadyExists`,
//!   `IndexOutOfRange`) in addition to storage errors.

pub mod attendance_repo;
pub mod student_repo;
