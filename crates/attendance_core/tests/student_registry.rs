use attendance_core::{CsvStudentRegistry, RegistryError, StudentRegistry};

fn open_registry(dir: &tempfile::TempDir) -> CsvStudentRegistry {
    CsvStudentRegistry::open(dir.path().join("students.csv")).unwrap()
}

#[test]
fn open_creates_header_only_table() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&dir);

    let contents = std::fs::read_to_string(registry.path()).unwrap();
    assert_eq!(contents.trim_end(), "Student Name");
    assert!(registry.list().unwrap().is_empty());
}

#[test]
fn register_trims_surrounding_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&dir);

    let student = registry.register("  Alice  ").unwrap();
    assert_eq!(student.name, "Alice");

    let listed = registry.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Alice");
}

#[test]
fn duplicate_registration_is_rejected_and_registry_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&dir);

    registry.register("Alice").unwrap();
    let err = registry.register(" Alice\t").unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists(ref name) if name == "Alice"));
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn names_are_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&dir);

    registry.register("Alice").unwrap();
    registry.register("alice").unwrap();
    assert!(registry.contains("Alice").unwrap());
    assert!(!registry.contains("ALICE").unwrap());
    assert_eq!(registry.list().unwrap().len(), 2);
}

#[test]
fn blank_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&dir);

    assert!(matches!(
        registry.register("").unwrap_err(),
        RegistryError::InvalidName
    ));
    assert!(matches!(
        registry.register("   ").unwrap_err(),
        RegistryError::InvalidName
    ));
    assert!(registry.list().unwrap().is_empty());
}

#[test]
fn registrations_persist_in_order_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    {
        let registry = open_registry(&dir);
        registry.register("Carol").unwrap();
        registry.register("Alice").unwrap();
        registry.register("Bob, Jr.").unwrap();
    }

    let reopened = open_registry(&dir);
    let names: Vec<String> = reopened
        .list()
        .unwrap()
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names, vec!["Carol", "Alice", "Bob, Jr."]);
}

#[test]
fn open_keeps_existing_table_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.csv");
    std::fs::write(&path, "Student Name\nDana\n").unwrap();

    let registry = CsvStudentRegistry::open(&path).unwrap();
    assert_eq!(registry.list().unwrap()[0].name, "Dana");
}
