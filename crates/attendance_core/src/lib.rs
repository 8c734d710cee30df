//! Core domain logic for the attendance tracker.
//! This crate is the single source of truth for registry and record invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::options::{Period, Status, Subject};
pub use model::record::{AttendanceRecord, RecordId};
pub use model::student::Student;
pub use report::percentage::{
    attendance_percentage, distinct_students, subject_breakdown, PercentageReport, ReportError,
    ALL_SUBJECTS,
};
pub use repo::attendance_repo::{
    AttendanceStore, CsvAttendanceStore, RecordEntry, StoreError, StoreResult,
};
pub use repo::student_repo::{CsvStudentRegistry, RegistryError, RegistryResult, StudentRegistry};
pub use service::attendance_service::{
    parse_date, AttendanceService, CsvAttendanceService, MarkAttendance, RecordDraft,
    ServiceError,
};
pub use storage::{StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
