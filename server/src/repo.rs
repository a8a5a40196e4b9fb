//! Todo persistence gateway and its SQLite implementation.
//!
//! # Invariants
//! - Timestamps are written as fixed-width RFC 3339 UTC text, so ordering by
//!   the column text is chronological.
//! - Rows read back are validated; a corrupt row surfaces as
//!   `RepoError::InvalidData` instead of being skipped.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DbError;
use crate::model::{Title, Todo, TodoId, TodoPatch};

const TODO_SELECT_SQL: &str = "SELECT id, title, is_completed, created_at, updated_at FROM todos";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted todo data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD operations over stored todos.
pub trait TodoRepository {
    /// All todos, newest first (`created_at` then `id`, both descending).
    fn list_todos(&self) -> RepoResult<Vec<Todo>>;
    fn create_todo(&self, title: &Title) -> RepoResult<Todo>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    /// Applies the set fields of `patch` and refreshes `updated_at`.
    /// Returns `None` when no todo has this id.
    fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Option<Todo>>;
    /// Returns whether a row was removed.
    fn delete_todo(&self, id: TodoId) -> RepoResult<bool>;
}

/// SQLite-backed repository borrowing a connection or transaction.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn list_todos(&self) -> RepoResult<Vec<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }
        Ok(todos)
    }

    fn create_todo(&self, title: &Title) -> RepoResult<Todo> {
        let now = Utc::now();
        let stamp = format_timestamp(now);
        self.conn.execute(
            "INSERT INTO todos (title, is_completed, created_at, updated_at)
             VALUES (?1, 0, ?2, ?2);",
            params![title.as_str(), stamp],
        )?;
        let id = self.conn.last_insert_rowid();

        self.get_todo(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("todo {id} vanished right after insert"))
        })
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self.conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_todo_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Option<Todo>> {
        let created_at: Option<String> = self
            .conn
            .query_row("SELECT created_at FROM todos WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(created_at) = created_at else {
            return Ok(None);
        };

        // A clock stepping backwards must not put updated_at before created_at.
        let now = Utc::now().max(parse_timestamp(&created_at, "created_at")?);

        self.conn.execute(
            "UPDATE todos
             SET
                title = COALESCE(?1, title),
                is_completed = COALESCE(?2, is_completed),
                updated_at = ?3
             WHERE id = ?4;",
            params![
                patch.title.as_ref().map(Title::as_str),
                patch.is_completed,
                format_timestamp(now),
                id,
            ],
        )?;

        self.get_todo(id)
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id: TodoId = row.get("id")?;

    let raw_title: String = row.get("title")?;
    let title = Title::parse(&raw_title)
        .map_err(|err| RepoError::InvalidData(format!("todos.title for id {id}: {err}")))?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` for id {id}"
            )));
        }
    };

    let created_at = parse_timestamp(&row.get::<_, String>("created_at")?, "created_at")?;
    let updated_at = parse_timestamp(&row.get::<_, String>("updated_at")?, "updated_at")?;

    Ok(Todo {
        id,
        title: title.as_str().to_string(),
        is_completed,
        created_at,
        updated_at,
    })
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| RepoError::InvalidData(format!("invalid timestamp `{value}` in todos.{column}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_fixed_width() {
        let whole = DateTime::parse_from_rfc3339("2026-10-18T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let fractional = DateTime::parse_from_rfc3339("2026-10-18T10:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);

        let a = format_timestamp(whole);
        let b = format_timestamp(fractional);
        assert_eq!(a, "2026-10-18T10:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn timestamp_round_trips_at_microsecond_precision() {
        let stamp = "2026-10-18T10:00:00.123456Z";
        let parsed = parse_timestamp(stamp, "created_at").unwrap();
        assert_eq!(format_timestamp(parsed), stamp);
    }

    #[test]
    fn bad_timestamp_is_invalid_data() {
        let err = parse_timestamp("yesterday", "updated_at").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(msg) if msg.contains("todos.updated_at")));
    }
}
