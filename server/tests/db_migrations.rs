use todo_server::db::migrations::{current_version, latest_version};
use todo_server::db::{Database, DbError};

#[test]
fn open_applies_latest_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("todo.db")).unwrap();
    let conn = db.connect().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    let table: String = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'todos';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(table, "todos");
}

#[test]
fn reopening_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let db = Database::open(&path).unwrap();
    db.connect()
        .unwrap()
        .execute(
            "INSERT INTO todos (title, is_completed, created_at, updated_at)
             VALUES ('kept', 0, '2026-10-18T10:00:00.000000Z', '2026-10-18T10:00:00.000000Z');",
            [],
        )
        .unwrap();

    let reopened = Database::open(&path).unwrap();
    let count: i64 = reopened
        .connect()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let db = Database::open(&path).unwrap();
    let future = latest_version() + 1;
    db.connect()
        .unwrap()
        .execute_batch(&format!("PRAGMA user_version = {future};"))
        .unwrap();

    let err = Database::open(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version, .. } if db_version == future
    ));
}
