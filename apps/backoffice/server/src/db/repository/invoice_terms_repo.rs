//! Repository for invoice terms blocks

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{now_timestamp, parse_timestamp, InvoiceTerm};
use crate::error::{BackofficeError, Result};

fn map_invoice_term(row: &Row<'_>) -> rusqlite::Result<InvoiceTerm> {
    Ok(InvoiceTerm {
        id: row.get(0)?,
        category: row.get(1)?,
        details: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?),
    })
}

pub fn list_invoice_terms(conn: &Connection) -> Result<Vec<InvoiceTerm>> {
    let mut stmt = conn
        .prepare("SELECT id, category, details, created_at FROM terms ORDER BY id ASC")
        .map_err(BackofficeError::Database)?;

    let terms = stmt
        .query_map([], map_invoice_term)
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(terms)
}

pub fn find_invoice_term(conn: &Connection, id: i64) -> Result<Option<InvoiceTerm>> {
    conn.query_row(
        "SELECT id, category, details, created_at FROM terms WHERE id = ?1",
        [id],
        map_invoice_term,
    )
    .optional()
    .map_err(BackofficeError::Database)
}

pub fn create_invoice_term(conn: &Connection, category: &str, details: &str) -> Result<InvoiceTerm> {
    conn.execute(
        "INSERT INTO terms (category, details, created_at) VALUES (?1, ?2, ?3)",
        params![category, details, now_timestamp()],
    )
    .map_err(BackofficeError::Database)?;

    let id = conn.last_insert_rowid();
    find_invoice_term(conn, id)?.ok_or_else(|| BackofficeError::not_found("Term", id))
}

pub fn update_invoice_term(
    conn: &Connection,
    id: i64,
    category: &str,
    details: &str,
) -> Result<Option<InvoiceTerm>> {
    let changed = conn
        .execute(
            "UPDATE terms SET category = ?1, details = ?2 WHERE id = ?3",
            params![category, details, id],
        )
        .map_err(BackofficeError::Database)?;
    if changed == 0 {
        return Ok(None);
    }
    find_invoice_term(conn, id)
}

/// Delete a term and hand back what was removed
pub fn delete_invoice_term(conn: &Connection, id: i64) -> Result<Option<InvoiceTerm>> {
    let Some(term) = find_invoice_term(conn, id)? else {
        return Ok(None);
    };
    super::delete_row(conn, "terms", id)?;
    Ok(Some(term))
}
