//! Repository pattern implementations for database operations
//!
//! This module provides a clean separation between database access and business logic.
//! Repositories take a borrowed `Connection`; callers hold the tenant lock.

pub mod invoice_package_repo;
pub mod invoice_terms_repo;
pub mod itinerary_repo;
pub mod operations_repo;
pub mod submission_repo;
pub mod terms_question_repo;
pub mod terms_repo;
pub mod token_repo;
pub mod tour_repo;
pub mod user_repo;

pub use invoice_package_repo::*;
pub use invoice_terms_repo::*;
pub use itinerary_repo::*;
pub use operations_repo::*;
pub use submission_repo::*;
pub use terms_question_repo::*;
pub use terms_repo::*;
pub use token_repo::*;
pub use tour_repo::*;
pub use user_repo::*;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::db::models::Field;
use crate::error::{BackofficeError, Result};

/// Column/value pairs for an INSERT or a partial UPDATE
#[derive(Debug, Default)]
pub struct Columns(Vec<(&'static str, Value)>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always write `value`.
    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.0.push((column, value.into()));
        self
    }

    /// Write a present value, NULL for `Null`, skip `Missing`.
    pub fn field<T: Into<Value>>(mut self, column: &'static str, field: Field<T>) -> Self {
        match field {
            Field::Missing => {}
            Field::Null => self.0.push((column, Value::Null)),
            Field::Present(v) => self.0.push((column, v.into())),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(name, _)| *name).collect()
    }

    fn values(self) -> Vec<Value> {
        self.0.into_iter().map(|(_, value)| value).collect()
    }
}

/// Build an INSERT for the given columns
pub fn build_insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Build an UPDATE of the given columns by id; the id binds last
pub fn build_update_sql(table: &str, columns: &[&str]) -> String {
    let sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{c} = ?{}", i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE id = ?{}",
        sets.join(", "),
        columns.len() + 1
    )
}

/// Insert a row and return its rowid
pub fn insert_row(conn: &Connection, table: &str, columns: Columns) -> Result<i64> {
    let sql = build_insert_sql(table, &columns.names());
    conn.execute(&sql, params_from_iter(columns.values()))
        .map_err(BackofficeError::Database)?;
    Ok(conn.last_insert_rowid())
}

/// Update the given columns of one row. Returns whether the row exists.
pub fn update_row(conn: &Connection, table: &str, id: i64, columns: Columns) -> Result<bool> {
    if columns.is_empty() {
        return row_exists(conn, table, id);
    }
    let sql = build_update_sql(table, &columns.names());
    let mut values = columns.values();
    values.push(Value::Integer(id));
    let changed = conn
        .execute(&sql, params_from_iter(values))
        .map_err(BackofficeError::Database)?;
    Ok(changed > 0)
}

/// Delete one row by id. Returns whether a row was removed.
pub fn delete_row(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let changed = conn
        .execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])
        .map_err(BackofficeError::Database)?;
    Ok(changed > 0)
}

pub fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    conn.query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(BackofficeError::Database)
}

/// Next id for tables whose ids are assigned by the application
pub fn next_id(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(
        &format!("SELECT COALESCE(MAX(id), 0) + 1 FROM {table}"),
        [],
        |row| row.get(0),
    )
    .map_err(BackofficeError::Database)
}

/// Read a stored timestamp column
pub(crate) fn timestamp(raw: Option<String>) -> Option<chrono::DateTime<chrono::Utc>> {
    raw.as_deref().and_then(crate::db::models::parse_timestamp_opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE things (id INTEGER PRIMARY KEY, name TEXT, note TEXT, qty INTEGER);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_build_update_sql() {
        let sql = build_update_sql("things", &["name", "qty"]);
        assert_eq!(sql, "UPDATE things SET name = ?1, qty = ?2 WHERE id = ?3");
    }

    #[test]
    fn test_insert_update_delete() {
        let conn = scratch();
        let id = insert_row(
            &conn,
            "things",
            Columns::new()
                .set("name", "bolt".to_string())
                .field("note", Field::Present("m8".to_string()))
                .field::<i64>("qty", Field::Missing),
        )
        .unwrap();

        assert!(update_row(
            &conn,
            "things",
            id,
            Columns::new()
                .field::<String>("note", Field::Null)
                .field("qty", Field::Present(4_i64))
        )
        .unwrap());

        let (name, note, qty): (String, Option<String>, i64) = conn
            .query_row("SELECT name, note, qty FROM things WHERE id = ?1", [id], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!((name.as_str(), note, qty), ("bolt", None, 4));

        assert!(!update_row(&conn, "things", 999, Columns::new().set("qty", 1_i64)).unwrap());
        assert!(delete_row(&conn, "things", id).unwrap());
        assert!(!row_exists(&conn, "things", id).unwrap());
    }

    #[test]
    fn test_next_id() {
        let conn = scratch();
        assert_eq!(next_id(&conn, "things").unwrap(), 1);
        conn.execute("INSERT INTO things (id, name) VALUES (41, 'x')", [])
            .unwrap();
        assert_eq!(next_id(&conn, "things").unwrap(), 42);
    }
}
