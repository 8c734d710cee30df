//! Attendance store contract and CSV implementation.
//!
//! # Responsibility
//! - Provide positional and id-keyed CRUD over the attendance table.
//! - Keep the table fully materialized; every write rewrites all rows.
//!
//! # Invariants
//! - Sequence order is insertion order; deletion compacts later indexes.
//! - `update`/`delete` with `index >= len` fail and leave storage unchanged.
//! - A `RecordId` stays bound to its record until the table is modified
//!   outside this handle; ids are then reassigned and stale ids miss.
//! - In-memory state only changes after the table write succeeded.
//! - Mutations hold the table lock from re-read to rewrite, so handles
//!   sharing a file never overwrite each other's changes.

use crate::model::options::{Period, Status, Subject};
use crate::model::record::{AttendanceRecord, RecordId};
use crate::storage::{StorageError, Table};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Column layout of the attendance table.
pub const ATTENDANCE_COLUMNS: &[&str] = &["Date", "Student Name", "Subject", "Period", "Status"];

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    IndexOutOfRange { index: usize, len: usize },
    RecordNotFound(RecordId),
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "record index {index} out of range (records: {len})")
            }
            Self::RecordNotFound(id) => write!(f, "record not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::IndexOutOfRange { .. } | Self::RecordNotFound(_) => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Record with its current position and in-memory id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub id: RecordId,
    pub index: usize,
    pub record: AttendanceRecord,
}

/// Repository interface for attendance records.
pub trait AttendanceStore {
    /// Reads all records in storage order.
    fn load(&self) -> StoreResult<Vec<AttendanceRecord>>;
    /// Reads all records paired with their ids and indexes.
    fn entries(&self) -> StoreResult<Vec<RecordEntry>>;
    /// Reads the record at `index`.
    fn get(&self, index: usize) -> StoreResult<AttendanceRecord>;
    fn len(&self) -> StoreResult<usize>;
    /// Appends one record and returns its id.
    fn append(&self, record: &AttendanceRecord) -> StoreResult<RecordId>;
    /// Replaces all fields of the record at `index`.
    fn update(&self, index: usize, record: &AttendanceRecord) -> StoreResult<()>;
    /// Removes the record at `index`, shifting later records down by one.
    fn delete(&self, index: usize) -> StoreResult<AttendanceRecord>;
    /// Replaces all fields of the record bound to `id`.
    fn update_by_id(&self, id: RecordId, record: &AttendanceRecord) -> StoreResult<()>;
    /// Removes the record bound to `id`.
    fn delete_by_id(&self, id: RecordId) -> StoreResult<AttendanceRecord>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    synced: bool,
    slots: Vec<(RecordId, AttendanceRecord)>,
}

/// Attendance store backed by a five-column CSV table.
pub struct CsvAttendanceStore {
    table: Table,
    state: Mutex<StoreState>,
}

impl CsvAttendanceStore {
    /// Opens the store, creating a header-only table when absent.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let table = Table::new("attendance", path, ATTENDANCE_COLUMNS);
        table.ensure_exists()?;
        let store = Self {
            table,
            state: Mutex::new(StoreState::default()),
        };
        {
            let mut state = store.lock_state();
            store.sync(&mut state)?;
            info!(
                "event=store_open module=repo status=ok records={}",
                state.slots.len()
            );
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        self.table.path()
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-reads the table and reconciles ids with the cached sequence.
    fn sync(&self, state: &mut StoreState) -> StoreResult<()> {
        let records: Vec<AttendanceRecord> = self
            .table
            .read_rows()?
            .into_iter()
            .map(record_from_row)
            .collect();

        let kept = state
            .slots
            .iter()
            .zip(&records)
            .take_while(|((_, cached), fresh)| cached == *fresh)
            .count();
        let unchanged_prefix = kept == state.slots.len();

        if state.synced && !unchanged_prefix {
            warn!(
                "event=store_sync module=repo status=external_change cached={} on_disk={}",
                state.slots.len(),
                records.len()
            );
        }

        let keep = if unchanged_prefix { kept } else { 0 };
        let mut slots = Vec::with_capacity(records.len());
        slots.extend(state.slots.drain(..keep));
        slots.extend(
            records
                .into_iter()
                .skip(keep)
                .map(|record| (Uuid::new_v4(), record)),
        );

        state.slots = slots;
        state.synced = true;
        Ok(())
    }

    /// Persists `slots` and commits them to memory only on success.
    fn commit(
        &self,
        state: &mut StoreState,
        slots: Vec<(RecordId, AttendanceRecord)>,
    ) -> StoreResult<()> {
        let rows: Vec<Vec<String>> = slots
            .iter()
            .map(|(_, record)| record_to_row(record))
            .collect();
        self.table.write_rows(&rows)?;
        state.slots = slots;
        Ok(())
    }

    fn check_index(state: &StoreState, index: usize) -> StoreResult<()> {
        if index >= state.slots.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: state.slots.len(),
            });
        }
        Ok(())
    }

    fn position_of(state: &StoreState, id: RecordId) -> StoreResult<usize> {
        state
            .slots
            .iter()
            .position(|(slot_id, _)| *slot_id == id)
            .ok_or(StoreError::RecordNotFound(id))
    }

    fn replace_at(
        &self,
        state: &mut StoreState,
        index: usize,
        record: &AttendanceRecord,
    ) -> StoreResult<()> {
        Self::check_index(state, index)?;
        let mut slots = state.slots.clone();
        slots[index].1 = record.clone();
        self.commit(state, slots)?;
        info!("event=record_update module=repo status=ok index={index}");
        Ok(())
    }

    fn remove_at(&self, state: &mut StoreState, index: usize) -> StoreResult<AttendanceRecord> {
        Self::check_index(state, index)?;
        let mut slots = state.slots.clone();
        let (_, removed) = slots.remove(index);
        self.commit(state, slots)?;
        info!(
            "event=record_delete module=repo status=ok index={index} records={}",
            state.slots.len()
        );
        Ok(removed)
    }
}

impl AttendanceStore for CsvAttendanceStore {
    fn load(&self) -> StoreResult<Vec<AttendanceRecord>> {
        let mut state = self.lock_state();
        self.sync(&mut state)?;
        Ok(state.slots.iter().map(|(_, record)| record.clone()).collect())
    }

    fn entries(&self) -> StoreResult<Vec<RecordEntry>> {
        let mut state = self.lock_state();
        self.sync(&mut state)?;
        Ok(state
            .slots
            .iter()
            .enumerate()
            .map(|(index, (id, record))| RecordEntry {
                id: *id,
                index,
                record: record.clone(),
            })
            .collect())
    }

    fn get(&self, index: usize) -> StoreResult<AttendanceRecord> {
        let mut state = self.lock_state();
        self.sync(&mut state)?;
        Self::check_index(&state, index)?;
        Ok(state.slots[index].1.clone())
    }

    fn len(&self) -> StoreResult<usize> {
        let mut state = self.lock_state();
        self.sync(&mut state)?;
        Ok(state.slots.len())
    }

    fn append(&self, record: &AttendanceRecord) -> StoreResult<RecordId> {
        let mut state = self.lock_state();
        let _table = self.table.lock();
        self.sync(&mut state)?;

        let id = Uuid::new_v4();
        let mut slots = state.slots.clone();
        slots.push((id, record.clone()));
        self.commit(&mut state, slots)?;

        info!(
            "event=record_append module=repo status=ok records={}",
            state.slots.len()
        );
        Ok(id)
    }

    fn update(&self, index: usize, record: &AttendanceRecord) -> StoreResult<()> {
        let mut state = self.lock_state();
        let _table = self.table.lock();
        self.sync(&mut state)?;
        self.replace_at(&mut state, index, record)
    }

    fn delete(&self, index: usize) -> StoreResult<AttendanceRecord> {
        let mut state = self.lock_state();
        let _table = self.table.lock();
        self.sync(&mut state)?;
        self.remove_at(&mut state, index)
    }

    fn update_by_id(&self, id: RecordId, record: &AttendanceRecord) -> StoreResult<()> {
        let mut state = self.lock_state();
        let _table = self.table.lock();
        self.sync(&mut state)?;
        let index = Self::position_of(&state, id)?;
        self.replace_at(&mut state, index, record)
    }

    fn delete_by_id(&self, id: RecordId) -> StoreResult<AttendanceRecord> {
        let mut state = self.lock_state();
        let _table = self.table.lock();
        self.sync(&mut state)?;
        let index = Self::position_of(&state, id)?;
        self.remove_at(&mut state, index)
    }
}

fn record_from_row(row: Vec<String>) -> AttendanceRecord {
    let mut fields = row.into_iter();
    let mut next = || fields.next().unwrap_or_default();
    let date = next();
    let student_name = next();
    let subject = Subject::from_stored(&next());
    let period = Period::from_stored(&next());
    let status = Status::from_stored(&next());
    AttendanceRecord {
        date,
        student_name,
        subject,
        period,
        status,
    }
}

fn record_to_row(record: &AttendanceRecord) -> Vec<String> {
    vec![
        record.date.clone(),
        record.student_name.clone(),
        record.subject.as_str().to_string(),
        record.period.as_str().to_string(),
        record.status.as_str().to_string(),
    ]
}
