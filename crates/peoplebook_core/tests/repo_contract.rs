use peoplebook_core::db::open_db_in_memory;
use peoplebook_core::{Entity, FieldValue, Person, RepoError, RepoResult, Repository, Scope};
use rusqlite::{Connection, Row};

/// Entity whose descriptor never declares a usable key binding.
#[derive(Debug, Default)]
struct KeylessRecord {
    value: Option<i64>,
}

impl Entity for KeylessRecord {
    type Key = i64;

    const TABLE: &'static str = "keyless_records";
    const KEY_COLUMN: &'static str = "id";
    // The key column is missing from the declared columns.
    const COLUMNS: &'static [&'static str] = &["value"];

    fn key(&self) -> Option<i64> {
        None
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![(
            "value",
            self.value.map_or(FieldValue::Absent, FieldValue::Integer),
        )]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            value: row.get("value")?,
        })
    }
}

#[derive(Debug, Default)]
struct TablelessRecord;

impl Entity for TablelessRecord {
    type Key = i64;

    const TABLE: &'static str = "";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Option<i64> {
        None
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("id", FieldValue::Absent)]
    }

    fn from_row(_row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self)
    }
}

#[test]
fn descriptor_without_key_column_fails_construction() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::new(&conn);

    let err = Repository::<KeylessRecord>::try_new(&scope).unwrap_err();
    assert!(matches!(err, RepoError::Configuration(_)));
}

#[test]
fn descriptor_with_empty_table_fails_construction() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::new(&conn);

    let err = Repository::<TablelessRecord>::try_new(&scope).unwrap_err();
    assert!(matches!(err, RepoError::Configuration(_)));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let scope = Scope::new(&conn);

    let err = Repository::<Person>::try_new(&scope).unwrap_err();
    assert!(matches!(err, RepoError::Configuration(_)));
}

#[test]
fn connection_missing_a_required_column_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            name TEXT
        );",
    )
    .unwrap();
    let scope = Scope::new(&conn);

    let err = Repository::<Person>::try_new(&scope).unwrap_err();
    match err {
        RepoError::Configuration(message) => assert!(message.contains("age")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn two_repositories_can_share_one_request_scope() {
    let conn = open_db_in_memory().unwrap();
    let scope = Scope::new(&conn);

    let first = Repository::<Person>::try_new(&scope).unwrap();
    let second = Repository::<Person>::try_new(&scope).unwrap();

    first.persist(&Person::new(1, "Ana", 30, 'F')).unwrap();

    // An example query on one repository derives its own scope; the shared
    // request scope stays untouched for the other repository.
    let template = Person {
        name: Some("ana".to_string()),
        ..Person::default()
    };
    let found = first.find_by_example(&template, true).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(scope.pending_writes(), 0);

    second.persist(&Person::new(2, "Beto", 41, 'M')).unwrap();
    assert_eq!(first.find_all().unwrap().len(), 2);
}
