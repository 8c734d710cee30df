use attendance_core::{
    AttendanceRecord, AttendanceStore, CsvAttendanceService, CsvAttendanceStore,
    CsvStudentRegistry, Period, Status, StudentRegistry, Subject,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const WRITERS: usize = 4;
const PER_WRITER: usize = 25;

fn assert_send_sync<T: Send + Sync>() {}

fn record(student: &str) -> AttendanceRecord {
    AttendanceRecord::new(
        "2024-04-01",
        student,
        Subject::Physics,
        Period::numbered(1).unwrap(),
        Status::Present,
    )
}

#[test]
fn handles_are_send_and_sync() {
    assert_send_sync::<CsvAttendanceStore>();
    assert_send_sync::<CsvStudentRegistry>();
    assert_send_sync::<CsvAttendanceService>();
}

#[test]
fn shared_store_handle_keeps_every_append() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CsvAttendanceStore::open(dir.path().join("attendance.csv")).unwrap());

    let workers: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..PER_WRITER {
                    store.append(&record(&format!("writer-{writer}"))).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), WRITERS * PER_WRITER);
}

#[test]
fn separate_store_handles_on_one_file_keep_every_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.csv");
    let first = CsvAttendanceStore::open(&path).unwrap();
    let second = CsvAttendanceStore::open(dir.path().join("./attendance.csv")).unwrap();

    thread::scope(|scope| {
        for (name, store) in [("first", &first), ("second", &second)] {
            scope.spawn(move || {
                for _ in 0..PER_WRITER * 2 {
                    store.append(&record(name)).unwrap();
                }
            });
        }
    });

    let records = CsvAttendanceStore::open(&path).unwrap().load().unwrap();
    assert_eq!(records.len(), PER_WRITER * 4);
    for name in ["first", "second"] {
        let count = records
            .iter()
            .filter(|loaded| loaded.student_name == name)
            .count();
        assert_eq!(count, PER_WRITER * 2, "appends lost for {name}");
    }
    assert_eq!(first.len().unwrap(), second.len().unwrap());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|file| file != "attendance.csv")
        .collect();
    assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
}

#[test]
fn separate_registry_handles_keep_every_registration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.csv");
    let handles: Vec<CsvStudentRegistry> = (0..WRITERS)
        .map(|_| CsvStudentRegistry::open(&path).unwrap())
        .collect();

    thread::scope(|scope| {
        for (writer, registry) in handles.iter().enumerate() {
            scope.spawn(move || {
                for index in 0..PER_WRITER {
                    registry
                        .register(&format!("student-{writer}-{index}"))
                        .unwrap();
                }
            });
        }
    });

    let names: HashSet<String> = handles[0]
        .list()
        .unwrap()
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names.len(), WRITERS * PER_WRITER);
}

#[test]
fn concurrent_duplicate_registration_admits_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.csv");
    let handles: Vec<CsvStudentRegistry> = (0..WRITERS)
        .map(|_| CsvStudentRegistry::open(&path).unwrap())
        .collect();

    let accepted = thread::scope(|scope| {
        let attempts: Vec<_> = handles
            .iter()
            .map(|registry| scope.spawn(move || registry.register("Alice").is_ok()))
            .collect();
        attempts
            .into_iter()
            .map(|attempt| attempt.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(accepted, 1);
    assert_eq!(handles[1].list().unwrap().len(), 1);
}
