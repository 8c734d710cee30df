//! Student registry contract and CSV implementation.
//!
//! # Responsibility
//! - Maintain the durable set of registered student names.
//!
//! # Invariants
//! - Stored names are trimmed and non-empty.
//! - No two registered students share an identical name.
//! - Blank rows found on disk are skipped, not reported as students.
//! - A table whose header lacks `Student Name` but holds rows is never
//!   rewritten.
//! - Registration holds the table lock from re-read to rewrite.

use crate::model::student::Student;
use crate::storage::{StorageError, Table};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Column layout of the students table.
pub const STUDENT_COLUMNS: &[&str] = &["Student Name"];

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug)]
pub enum RegistryError {
    /// Name is empty after trimming.
    InvalidName,
    /// Trimmed name is already registered.
    AlreadyExists(String),
    /// Table holds rows but its header has no `Student Name` column.
    MissingNameColumn,
    Storage(StorageError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "student name must not be blank"),
            Self::AlreadyExists(name) => write!(f, "student already exists: `{name}`"),
            Self::MissingNameColumn => write!(
                f,
                "students table has rows but no `{}` column; refusing to rewrite it",
                STUDENT_COLUMNS[0]
            ),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::InvalidName | Self::AlreadyExists(_) | Self::MissingNameColumn => None,
        }
    }
}

impl From<StorageError> for RegistryError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for the student registry.
pub trait StudentRegistry {
    /// Lists registered students in storage order.
    fn list(&self) -> RegistryResult<Vec<Student>>;
    /// Registers a trimmed name and returns the stored student.
    fn register(&self, name: &str) -> RegistryResult<Student>;
    /// Returns whether `name` is registered (exact match).
    fn contains(&self, name: &str) -> RegistryResult<bool>;
}

/// Registry backed by a single-column CSV table.
pub struct CsvStudentRegistry {
    table: Table,
}

/// Names read from disk and whether the name column was found.
struct Roster {
    names: Vec<String>,
    /// Header lacks the name column while data rows exist.
    unreadable: bool,
}

impl CsvStudentRegistry {
    /// Opens the registry, creating a header-only table when absent.
    pub fn open(path: impl Into<PathBuf>) -> RegistryResult<Self> {
        let table = Table::new("students", path, STUDENT_COLUMNS);
        table.ensure_exists()?;
        Ok(Self { table })
    }

    pub fn path(&self) -> &Path {
        self.table.path()
    }

    fn read_roster(&self) -> RegistryResult<Roster> {
        let contents = self.table.read_contents()?;
        let total = contents.rows.len();
        if !contents.missing_columns.is_empty() && total > 0 {
            error!(
                "event=registry_read module=repo status=missing_name_column rows={} path={}",
                total,
                self.table.path().display()
            );
            return Ok(Roster {
                names: Vec::new(),
                unreadable: true,
            });
        }

        let names: Vec<String> = contents
            .rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter(|name| !name.trim().is_empty())
            .collect();

        if names.len() != total {
            warn!(
                "event=registry_read module=repo status=skipped_blank skipped={}",
                total - names.len()
            );
        }
        Ok(Roster {
            names,
            unreadable: false,
        })
    }
}

impl StudentRegistry for CsvStudentRegistry {
    fn list(&self) -> RegistryResult<Vec<Student>> {
        Ok(self
            .read_roster()?
            .names
            .into_iter()
            .map(Student::new)
            .collect())
    }

    fn register(&self, name: &str) -> RegistryResult<Student> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        let _table = self.table.lock();
        let Roster { mut names, unreadable } = self.read_roster()?;
        if unreadable {
            return Err(RegistryError::MissingNameColumn);
        }
        if names.iter().any(|existing| existing == trimmed) {
            return Err(RegistryError::AlreadyExists(trimmed.to_string()));
        }

        names.push(trimmed.to_string());
        let rows: Vec<Vec<String>> = names.iter().map(|name| vec![name.clone()]).collect();
        self.table.write_rows(&rows)?;

        info!(
            "event=student_register module=repo status=ok students={}",
            names.len()
        );
        Ok(Student::new(trimmed))
    }

    fn contains(&self, name: &str) -> RegistryResult<bool> {
        Ok(self
            .read_roster()?
            .names
            .iter()
            .any(|existing| existing == name))
    }
}
