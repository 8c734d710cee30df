//! Flat-file table storage for the tracker.
//!
//! # Responsibility
//! - Create header-only tables on first use.
//! - Read tables leniently and rewrite them in full.
//! - Serialize writers of one table file within the process.
//!
//! # Invariants
//! - Core code never writes a partial table; writes replace the file whole.
//! - Reading never fails on missing, extra or reordered columns.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod table;

pub use table::{Table, TableContents, TableGuard};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Csv { path, source } => {
                write!(f, "malformed table `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
        }
    }
}
