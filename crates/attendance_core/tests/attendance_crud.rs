use attendance_core::{
    AttendanceRecord, AttendanceStore, CsvAttendanceStore, Period, Status, StoreError, Subject,
};

fn record(
    date: &str,
    student: &str,
    subject: Subject,
    period: u8,
    status: Status,
) -> AttendanceRecord {
    AttendanceRecord::new(
        date,
        student,
        subject,
        Period::numbered(period).unwrap(),
        status,
    )
}

fn seeded_store(dir: &tempfile::TempDir) -> (CsvAttendanceStore, Vec<AttendanceRecord>) {
    let store = CsvAttendanceStore::open(dir.path().join("attendance_data.csv")).unwrap();
    let records = vec![
        record("2024-03-01", "Alice", Subject::Mathematics, 1, Status::Present),
        record("2024-03-01", "Bob", Subject::Physics, 2, Status::Absent),
        record("2024-03-02", "Alice", Subject::English, 3, Status::Absent),
        record("2024-03-02", "Carol", Subject::Electronics, 4, Status::Present),
    ];
    for item in &records {
        store.append(item).unwrap();
    }
    (store, records)
}

#[test]
fn open_creates_header_only_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvAttendanceStore::open(dir.path().join("attendance_data.csv")).unwrap();

    let contents = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(
        contents.trim_end(),
        "Date,Student Name,Subject,Period,Status"
    );
    assert!(store.is_empty().unwrap());
}

#[test]
fn append_then_load_keeps_prior_order() {
    let dir = tempfile::tempdir().unwrap();
    let (store, mut expected) = seeded_store(&dir);

    let extra = record("2024-03-03", "Dana", Subject::Other, 8, Status::Present);
    store.append(&extra).unwrap();
    expected.push(extra);

    assert_eq!(store.load().unwrap(), expected);
}

#[test]
fn load_from_fresh_handle_matches_written_records() {
    let dir = tempfile::tempdir().unwrap();
    let (store, expected) = seeded_store(&dir);
    let path = store.path().to_path_buf();
    drop(store);

    let reopened = CsvAttendanceStore::open(path).unwrap();
    assert_eq!(reopened.load().unwrap(), expected);
}

#[test]
fn delete_compacts_indexes() {
    let dir = tempfile::tempdir().unwrap();
    let (store, before) = seeded_store(&dir);

    let removed = store.delete(1).unwrap();
    assert_eq!(removed, before[1]);

    let after = store.load().unwrap();
    assert_eq!(after.len(), before.len() - 1);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[2]);
    assert_eq!(after[2], before[3]);
}

#[test]
fn delete_last_index_removes_tail() {
    let dir = tempfile::tempdir().unwrap();
    let (store, before) = seeded_store(&dir);

    store.delete(before.len() - 1).unwrap();
    assert_eq!(store.load().unwrap(), before[..before.len() - 1].to_vec());
}

#[test]
fn update_replaces_only_target_index() {
    let dir = tempfile::tempdir().unwrap();
    let (store, before) = seeded_store(&dir);

    let replacement = record("2024-04-01", "Bob", Subject::Chemistry, 6, Status::Present);
    store.update(1, &replacement).unwrap();

    let after = store.load().unwrap();
    assert_eq!(after[1], replacement);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2..], before[2..]);
}

#[test]
fn out_of_range_index_fails_without_touching_storage() {
    let dir = tempfile::tempdir().unwrap();
    let (store, before) = seeded_store(&dir);
    let on_disk = std::fs::read_to_string(store.path()).unwrap();
    let len = before.len();

    let update_err = store.update(len, &before[0]).unwrap_err();
    assert!(matches!(
        update_err,
        StoreError::IndexOutOfRange { index, len: l } if index == len && l == len
    ));
    let delete_err = store.delete(len + 5).unwrap_err();
    assert!(matches!(delete_err, StoreError::IndexOutOfRange { .. }));
    assert!(matches!(
        store.get(len).unwrap_err(),
        StoreError::IndexOutOfRange { .. }
    ));

    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), on_disk);
    assert_eq!(store.load().unwrap(), before);
}

#[test]
fn missing_period_column_is_backfilled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance_data.csv");
    std::fs::write(
        &path,
        "Date,Student Name,Subject,Status\n2024-01-05,Alice,Physics,Present\n2024-01-06,Bob,English,Absent\n",
    )
    .unwrap();

    let store = CsvAttendanceStore::open(&path).unwrap();
    let records = store.load().unwrap();
    assert_eq!(records.len(), 2);
    for loaded in &records {
        assert_eq!(loaded.period.as_str(), "");
    }
    assert_eq!(records[0].student_name, "Alice");
    assert_eq!(records[0].status, Status::Present);
    assert_eq!(records[1].subject, Subject::English);
}

#[test]
fn padded_headers_and_extra_columns_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance_data.csv");
    std::fs::write(
        &path,
        "Status , Date,Notes,Student Name,Subject,Period\nAbsent,2024-01-05,late bus,Alice,Math,Period 2\n",
    )
    .unwrap();

    let store = CsvAttendanceStore::open(&path).unwrap();
    let records = store.load().unwrap();
    assert_eq!(
        records,
        vec![AttendanceRecord::new(
            "2024-01-05",
            "Alice",
            Subject::Unrecognized("Math".to_string()),
            Period::numbered(2).unwrap(),
            Status::Absent,
        )]
    );
}

#[test]
fn rewrite_normalizes_column_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance_data.csv");
    std::fs::write(&path, "Student Name,Date\nAlice,2024-01-05\n").unwrap();

    let store = CsvAttendanceStore::open(&path).unwrap();
    store
        .append(&record("2024-01-06", "Bob", Subject::Physics, 1, Status::Present))
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "Date,Student Name,Subject,Period,Status");
    assert_eq!(lines[1], "2024-01-05,Alice,,,");
    assert_eq!(lines[2], "2024-01-06,Bob,Physics,Period 1,Present");
}

#[test]
fn ids_survive_unrelated_mutations() {
    let dir = tempfile::tempdir().unwrap();
    let (store, before) = seeded_store(&dir);
    let entries = store.entries().unwrap();
    let carol_id = entries[3].id;

    store.delete(0).unwrap();
    store
        .append(&record("2024-03-05", "Dana", Subject::English, 1, Status::Present))
        .unwrap();

    let replacement = record("2024-03-02", "Carol", Subject::Electronics, 4, Status::Absent);
    store.update_by_id(carol_id, &replacement).unwrap();

    let after = store.entries().unwrap();
    let carol = after.iter().find(|entry| entry.id == carol_id).unwrap();
    assert_eq!(carol.index, 2);
    assert_eq!(carol.record, replacement);

    let removed = store.delete_by_id(carol_id).unwrap();
    assert_eq!(removed, replacement);
    assert_ne!(removed, before[3]);
    assert!(matches!(
        store.delete_by_id(carol_id).unwrap_err(),
        StoreError::RecordNotFound(id) if id == carol_id
    ));
}

#[test]
fn external_rewrite_invalidates_ids() {
    let dir = tempfile::tempdir().unwrap();
    let (store, before) = seeded_store(&dir);
    let stale_id = store.entries().unwrap()[0].id;

    std::fs::write(
        store.path(),
        "Date,Student Name,Subject,Period,Status\n2024-05-01,Eve,Physics,Period 1,Present\n",
    )
    .unwrap();

    let err = store.update_by_id(stale_id, &before[0]).unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound(_)));
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.get(0).unwrap().student_name, "Eve");
}

#[test]
fn external_append_keeps_existing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = seeded_store(&dir);
    let ids: Vec<_> = store.entries().unwrap().iter().map(|entry| entry.id).collect();

    let mut contents = std::fs::read_to_string(store.path()).unwrap();
    contents.push_str("2024-05-01,Eve,Physics,Period 1,Present\n");
    std::fs::write(store.path(), contents).unwrap();

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), ids.len() + 1);
    for (entry, id) in entries.iter().zip(&ids) {
        assert_eq!(entry.id, *id);
    }
}
