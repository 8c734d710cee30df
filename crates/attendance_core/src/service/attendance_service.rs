//! Attendance use-case service.
//!
//! # Responsibility
//! - Provide register/mark/edit/delete/percentage entry points for callers.
//! - Map visible row numbers to record ids; edits and deletes go by id.
//! - Parse free-form input into validated subjects, periods, statuses and dates.
//! - Build pre-filled edit drafts from stored records.
//!
//! # Invariants
//! - Records created here only carry recognized option values.
//! - Validation failures never reach storage.
//! - The service remains storage-agnostic.

use crate::config::{ConfigError, TrackerConfig};
use crate::model::options::{Period, Status, Subject};
use crate::model::record::{AttendanceRecord, RecordId};
use crate::model::student::Student;
use crate::report::percentage::{attendance_percentage, PercentageReport, ReportError};
use crate::repo::attendance_repo::{AttendanceStore, CsvAttendanceStore, RecordEntry, StoreError};
use crate::repo::student_repo::{CsvStudentRegistry, RegistryError, StudentRegistry};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Service error for attendance use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Attendance was submitted for a name missing from the registry.
    UnknownStudent(String),
    InvalidDate(String),
    InvalidSubject(String),
    InvalidPeriod(String),
    InvalidStatus(String),
    Config(ConfigError),
    Registry(RegistryError),
    Store(StoreError),
    Report(ReportError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStudent(name) => write!(f, "student is not registered: `{name}`"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidSubject(value) => write!(f, "unknown subject `{value}`"),
            Self::InvalidPeriod(value) => {
                write!(f, "unknown period `{value}`; expected Period 1..Period 8")
            }
            Self::InvalidStatus(value) => {
                write!(f, "unknown status `{value}`; expected Present or Absent")
            }
            Self::Config(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Report(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Report(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RegistryError> for ServiceError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ReportError> for ServiceError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

/// Raw attendance submission as entered by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkAttendance {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub student_name: String,
    pub subject: String,
    pub period: String,
    pub status: String,
}

/// Edit form values, always within the closed option sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub date: NaiveDate,
    pub student_name: String,
    pub subject: Subject,
    pub period: Period,
    pub status: Status,
}

impl RecordDraft {
    /// Pre-fills a draft from a stored record.
    ///
    /// Fallbacks for values the form cannot represent:
    /// - unknown subject -> first subject,
    /// - unknown period -> `Period 1`,
    /// - any status other than `Present` -> `Absent`,
    /// - unparsable date -> `today`.
    pub fn from_record(record: &AttendanceRecord, today: NaiveDate) -> Self {
        let subject = if record.subject.is_recognized() {
            record.subject.clone()
        } else {
            Subject::ALL[0].clone()
        };
        let period = if record.period.is_recognized() {
            record.period.clone()
        } else {
            Period::ALL[0].clone()
        };
        let status = if record.status.is_present() {
            Status::Present
        } else {
            Status::Absent
        };

        Self {
            date: parse_date(&record.date).unwrap_or(today),
            student_name: record.student_name.clone(),
            subject,
            period,
            status,
        }
    }

    pub fn to_record(&self) -> AttendanceRecord {
        AttendanceRecord::new(
            self.date.format(DATE_FORMAT).to_string(),
            self.student_name.clone(),
            self.subject.clone(),
            self.period.clone(),
            self.status.clone(),
        )
    }
}

/// Use-case service over a student registry and an attendance store.
pub struct AttendanceService<S: StudentRegistry, A: AttendanceStore> {
    students: S,
    records: A,
}

/// Service wired to the CSV-backed repositories.
pub type CsvAttendanceService = AttendanceService<CsvStudentRegistry, CsvAttendanceStore>;

impl CsvAttendanceService {
    /// Validates `config` and opens both tables, creating them when absent.
    pub fn open(config: &TrackerConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let students = CsvStudentRegistry::open(config.students_path())?;
        let records = CsvAttendanceStore::open(config.attendance_path())?;
        info!(
            "event=service_open module=service status=ok data_dir={}",
            config.data_dir.display()
        );
        Ok(Self::new(students, records))
    }
}

impl<S: StudentRegistry, A: AttendanceStore> AttendanceService<S, A> {
    pub fn new(students: S, records: A) -> Self {
        Self { students, records }
    }

    pub fn students(&self) -> &S {
        &self.students
    }

    pub fn records(&self) -> &A {
        &self.records
    }

    pub fn register_student(&self, name: &str) -> Result<Student, ServiceError> {
        Ok(self.students.register(name)?)
    }

    pub fn list_students(&self) -> Result<Vec<Student>, ServiceError> {
        Ok(self.students.list()?)
    }

    /// Validates a submission and appends it.
    ///
    /// # Errors
    /// - `UnknownStudent` when the trimmed name is not registered.
    /// - `InvalidDate`/`InvalidSubject`/`InvalidPeriod`/`InvalidStatus` for
    ///   values outside their accepted forms.
    pub fn mark_attendance(&self, request: &MarkAttendance) -> Result<RecordId, ServiceError> {
        let student_name = request.student_name.trim();
        let date = parse_date(&request.date)
            .ok_or_else(|| ServiceError::InvalidDate(request.date.clone()))?;
        let subject = Subject::parse(&request.subject)
            .ok_or_else(|| ServiceError::InvalidSubject(request.subject.clone()))?;
        let period = Period::parse(&request.period)
            .ok_or_else(|| ServiceError::InvalidPeriod(request.period.clone()))?;
        let status = Status::parse(&request.status)
            .ok_or_else(|| ServiceError::InvalidStatus(request.status.clone()))?;

        if !self.students.contains(student_name)? {
            return Err(ServiceError::UnknownStudent(student_name.to_string()));
        }

        let record = AttendanceRecord::new(
            date.format(DATE_FORMAT).to_string(),
            student_name,
            subject,
            period,
            status,
        );
        Ok(self.records.append(&record)?)
    }

    pub fn list_records(&self) -> Result<Vec<RecordEntry>, ServiceError> {
        Ok(self.records.entries()?)
    }

    /// Resolves a visible row number to the record currently shown there.
    pub fn entry_at(&self, index: usize) -> Result<RecordEntry, ServiceError> {
        let entries = self.records.entries()?;
        let len = entries.len();
        entries
            .into_iter()
            .nth(index)
            .ok_or(ServiceError::Store(StoreError::IndexOutOfRange { index, len }))
    }

    /// Builds a pre-filled edit draft for the record bound to `id`.
    pub fn edit_draft(
        &self,
        id: RecordId,
        today: NaiveDate,
    ) -> Result<RecordDraft, ServiceError> {
        let entry = self
            .records
            .entries()?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(StoreError::RecordNotFound(id))?;
        Ok(RecordDraft::from_record(&entry.record, today))
    }

    /// Replaces the record bound to `id` with the draft values.
    pub fn save_draft(&self, id: RecordId, draft: &RecordDraft) -> Result<(), ServiceError> {
        Ok(self.records.update_by_id(id, &draft.to_record())?)
    }

    pub fn delete_record(&self, id: RecordId) -> Result<AttendanceRecord, ServiceError> {
        Ok(self.records.delete_by_id(id)?)
    }

    /// Attendance percentage for `student`; `None` or `"All"` spans subjects.
    ///
    /// Subject input is matched like `mark_attendance` input; text outside
    /// the option set is compared verbatim against stored subjects.
    pub fn percentage(
        &self,
        student: &str,
        subject: Option<&str>,
    ) -> Result<PercentageReport, ServiceError> {
        let subject = subject.map(|value| {
            Subject::parse(value).map_or_else(|| value.to_string(), String::from)
        });
        let records = self.records.load()?;
        Ok(attendance_percentage(&records, student, subject.as_deref())?)
    }
}

/// Parses a `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_date, RecordDraft};
    use crate::model::options::{Period, Status, Subject};
    use crate::model::record::AttendanceRecord;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn draft_keeps_recognized_values() {
        let record = AttendanceRecord::new(
            "2024-02-29",
            "Alice",
            Subject::Chemistry,
            Period::numbered(5).unwrap(),
            Status::Absent,
        );
        let draft = RecordDraft::from_record(&record, today());
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(draft.subject, Subject::Chemistry);
        assert_eq!(draft.to_record(), record);
    }

    #[test]
    fn draft_falls_back_for_unrepresentable_values() {
        let record = AttendanceRecord::new(
            "29/02/2024",
            "Alice",
            Subject::from_stored("Biology"),
            Period::from_stored("Lunch"),
            Status::from_stored(""),
        );
        let draft = RecordDraft::from_record(&record, today());
        assert_eq!(draft.date, today());
        assert_eq!(draft.subject, Subject::Mathematics);
        assert_eq!(draft.period, Period::numbered(1).unwrap());
        assert_eq!(draft.status, Status::Absent);
        assert_eq!(draft.to_record().date, "2024-06-30");
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert!(parse_date(" 2024-02-29 ").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024/02/01").is_none());
    }
}
