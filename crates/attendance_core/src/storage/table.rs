//! Header-addressed CSV table access.
//!
//! # Responsibility
//! - Map on-disk headers to a fixed column schema.
//! - Stage full rewrites in a sibling file and rename over the table.
//! - Share one write lock per table file across all handles in the process.
//!
//! # Invariants
//! - Every row returned by `read_rows` has exactly `columns.len()` fields.
//! - Tables resolving to the same file share the same lock.
//! - Each write stages into its own uniquely named sibling file.
//! - Headers are matched after trimming surrounding whitespace (and a BOM).
//! - Values are returned verbatim; only headers are trimmed.

use super::{StorageError, StorageResult};
use log::{debug, error, info, warn};
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

static TABLE_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = Lazy::new(Default::default);

/// Held while a caller reads, modifies and rewrites a table.
pub type TableGuard<'a> = MutexGuard<'a, ()>;

/// Rows read from a table plus the schema columns its header lacked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableContents {
    pub rows: Vec<Vec<String>>,
    pub missing_columns: Vec<&'static str>,
}

/// One CSV file with a fixed, ordered column schema.
#[derive(Debug, Clone)]
pub struct Table {
    label: &'static str,
    path: PathBuf,
    columns: &'static [&'static str],
    write_lock: OnceCell<Arc<Mutex<()>>>,
}

impl Table {
    pub fn new(
        label: &'static str,
        path: impl Into<PathBuf>,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            label,
            path: path.into(),
            columns,
            write_lock: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Creates a header-only table (and parent directories) when absent.
    ///
    /// Takes the table lock; do not call while holding `lock()`.
    /// Returns `true` when the file was created by this call.
    pub fn ensure_exists(&self) -> StorageResult<bool> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
        }

        let _guard = self.lock();
        let exists = self
            .path
            .try_exists()
            .map_err(|err| StorageError::io(&self.path, err))?;
        if exists {
            return Ok(false);
        }

        self.write_rows(&[])?;
        info!(
            "event=table_init module=storage status=ok table={} path={}",
            self.label,
            self.path.display()
        );
        Ok(true)
    }

    /// Acquires the process-wide write lock for this table file.
    ///
    /// Hold it across any read-modify-write sequence. The lock is not
    /// reentrant.
    pub fn lock(&self) -> TableGuard<'_> {
        self.shared_lock()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn shared_lock(&self) -> &Arc<Mutex<()>> {
        self.write_lock.get_or_init(|| {
            let key = lock_key(&self.path);
            let mut locks = TABLE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key).or_default())
        })
    }

    /// Reads all data rows, projecting them onto the schema columns.
    ///
    /// A missing file reads as an empty table. Columns absent from the file
    /// are backfilled with empty strings; unknown columns are ignored.
    pub fn read_rows(&self) -> StorageResult<Vec<Vec<String>>> {
        Ok(self.read_contents()?.rows)
    }

    /// Like `read_rows`, also reporting which schema columns were absent.
    pub fn read_contents(&self) -> StorageResult<TableContents> {
        let started_at = Instant::now();
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    "event=table_read module=storage status=missing table={} path={}",
                    self.label,
                    self.path.display()
                );
                return Ok(TableContents::default());
            }
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|err| StorageError::csv(&self.path, err))?
            .clone();
        let positions = self.column_positions(&headers);

        let missing: Vec<&'static str> = self
            .columns
            .iter()
            .zip(&positions)
            .filter(|(_, position)| position.is_none())
            .map(|(column, _)| *column)
            .collect();
        if !missing.is_empty() {
            warn!(
                "event=table_read module=storage status=backfill table={} missing_columns={}",
                self.label,
                missing.join("|")
            );
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| StorageError::csv(&self.path, err))?;
            let row = positions
                .iter()
                .map(|position| {
                    position
                        .and_then(|index| record.get(index))
                        .unwrap_or_default()
                        .to_string()
                })
                .collect();
            rows.push(row);
        }

        debug!(
            "event=table_read module=storage status=ok table={} rows={} duration_ms={}",
            self.label,
            rows.len(),
            started_at.elapsed().as_millis()
        );
        Ok(TableContents {
            rows,
            missing_columns: missing,
        })
    }

    /// Replaces the whole table with the header row followed by `rows`.
    ///
    /// The file on disk is either the previous table or the new one; a failed
    /// write leaves the previous content in place.
    pub fn write_rows(&self, rows: &[Vec<String>]) -> StorageResult<()> {
        let started_at = Instant::now();
        let staging = self.staging_path();

        let result = self.write_staged(&staging, rows).and_then(|()| {
            fs::rename(&staging, &self.path).map_err(|err| StorageError::io(&self.path, err))
        });

        match &result {
            Ok(()) => debug!(
                "event=table_write module=storage status=ok table={} rows={} duration_ms={}",
                self.label,
                rows.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => {
                let _ = fs::remove_file(&staging);
                error!(
                    "event=table_write module=storage status=error table={} duration_ms={} error={}",
                    self.label,
                    started_at.elapsed().as_millis(),
                    err
                );
            }
        }

        result
    }

    fn write_staged(&self, staging: &Path, rows: &[Vec<String>]) -> StorageResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(staging)
            .map_err(|err| StorageError::csv(staging, err))?;

        writer
            .write_record(self.columns)
            .map_err(|err| StorageError::csv(staging, err))?;
        for row in rows {
            writer
                .write_record(row)
                .map_err(|err| StorageError::csv(staging, err))?;
        }
        writer
            .flush()
            .map_err(|err| StorageError::io(staging, err))?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(self.label));
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn column_positions(&self, headers: &csv::StringRecord) -> Vec<Option<usize>> {
        self.columns
            .iter()
            .map(|column| {
                headers
                    .iter()
                    .position(|header| header.trim_start_matches('\u{feff}').trim() == *column)
            })
            .collect()
    }
}

/// Resolves the directory part so aliases of one file share a key.
fn lock_key(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}
