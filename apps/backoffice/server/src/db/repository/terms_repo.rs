//! Repository for terms and conditions documents

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{delete_row, insert_row, update_row, Columns};
use crate::db::models::{now_timestamp, parse_timestamp, Field, TermsAndCondition, TermsListParams};
use crate::db::queries::{build_terms_list_query, fetch_page, Page, PageRequest};
use crate::error::{BackofficeError, Result};

const TABLE: &str = "terms_and_conditions";

const TERMS_SELECT: &str = r#"
    SELECT id, title, content, pdf_file_path, pdf_file_name, is_active, created_at, updated_at
    FROM terms_and_conditions
"#;

/// Fields of a terms and conditions write
#[derive(Debug, Clone, Default)]
pub struct TermsChanges {
    pub title: Field<String>,
    pub content: Field<String>,
    pub pdf_file_path: Field<String>,
    pub pdf_file_name: Field<String>,
    pub is_active: Field<bool>,
}

impl TermsChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("title", self.title)
            .field("content", self.content)
            .field("pdf_file_path", self.pdf_file_path)
            .field("pdf_file_name", self.pdf_file_name)
            .field("is_active", self.is_active)
    }
}

fn map_terms(row: &Row<'_>) -> rusqlite::Result<TermsAndCondition> {
    Ok(TermsAndCondition {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        pdf_file_path: row.get(3)?,
        original_file_name: row.get(4)?,
        is_active: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

pub fn paginate_terms(
    conn: &Connection,
    params: &TermsListParams,
    request: PageRequest,
) -> Result<Page<TermsAndCondition>> {
    fetch_page(conn, &build_terms_list_query(params), request, map_terms)
}

pub fn find_terms(conn: &Connection, id: i64) -> Result<Option<TermsAndCondition>> {
    conn.query_row(&format!("{TERMS_SELECT} WHERE id = ?1"), [id], map_terms)
        .optional()
        .map_err(BackofficeError::Database)
}

/// Load the documents that exist among `ids`, each once, in id order
pub fn find_terms_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<TermsAndCondition>> {
    let unique: BTreeSet<i64> = ids.iter().copied().collect();
    let mut found = Vec::with_capacity(unique.len());
    for id in unique {
        if let Some(terms) = find_terms(conn, id)? {
            found.push(terms);
        }
    }
    Ok(found)
}

pub fn create_terms(conn: &Connection, changes: TermsChanges) -> Result<TermsAndCondition> {
    let now = now_timestamp();
    let id = insert_row(
        conn,
        TABLE,
        changes
            .columns()
            .set("created_at", now.clone())
            .set("updated_at", now),
    )?;
    find_terms(conn, id)?.ok_or_else(|| BackofficeError::not_found("Terms and conditions", id))
}

pub fn update_terms(
    conn: &Connection,
    id: i64,
    changes: TermsChanges,
) -> Result<Option<TermsAndCondition>> {
    if !update_row(conn, TABLE, id, changes.columns().set("updated_at", now_timestamp()))? {
        return Ok(None);
    }
    find_terms(conn, id)
}

pub fn set_terms_active(conn: &Connection, id: i64, active: bool) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE terms_and_conditions SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![active, now_timestamp(), id],
        )
        .map_err(BackofficeError::Database)?;
    Ok(changed > 0)
}

pub fn delete_terms(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, TABLE, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_connection, Tenant};

    fn terms(title: &str, active: bool) -> TermsChanges {
        TermsChanges {
            title: Field::Present(title.to_string()),
            content: Field::Present("Bookings are non-refundable.".to_string()),
            is_active: Field::Present(active),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_with_pdf_and_toggle() {
        let conn = create_test_connection(Tenant::Invoice);
        let created = create_terms(
            &conn,
            TermsChanges {
                pdf_file_path: Field::Present("terms_conditions/1_policy.pdf".to_string()),
                pdf_file_name: Field::Present("Policy 2025.pdf".to_string()),
                ..terms("Policy", true)
            },
        )
        .unwrap();

        assert_eq!(created.pdf_file_name().as_deref(), Some("Policy 2025.pdf"));
        assert!(set_terms_active(&conn, created.id, false).unwrap());
        assert!(!find_terms(&conn, created.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_find_by_ids_skips_repeats_and_unknown() {
        let conn = create_test_connection(Tenant::Invoice);
        let a = create_terms(&conn, terms("A", true)).unwrap();
        let b = create_terms(&conn, terms("B", true)).unwrap();

        let found = find_terms_by_ids(&conn, &[b.id, a.id, b.id, 999, a.id]).unwrap();
        let ids: Vec<i64> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, [a.id, b.id]);
    }

    #[test]
    fn test_paginate_by_status() {
        let conn = create_test_connection(Tenant::Invoice);
        create_terms(&conn, terms("Active one", true)).unwrap();
        create_terms(&conn, terms("Inactive one", false)).unwrap();
        create_terms(&conn, terms("Active two", true)).unwrap();

        let params = TermsListParams {
            status: Some("active".to_string()),
            ..Default::default()
        };
        let page = paginate_terms(&conn, &params, PageRequest::new(1, 15)).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.data.iter().all(|t| t.is_active));
    }

    #[test]
    fn test_update_clears_pdf_and_bulk_lookup() {
        let conn = create_test_connection(Tenant::Invoice);
        let first = create_terms(
            &conn,
            TermsChanges {
                pdf_file_path: Field::Present("terms_conditions/a.pdf".to_string()),
                ..terms("First", true)
            },
        )
        .unwrap();

        let updated = update_terms(
            &conn,
            first.id,
            TermsChanges {
                pdf_file_path: Field::Null,
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(updated.pdf_file_path.is_none());
        assert_eq!(updated.title, "First");

        let found = find_terms_by_ids(&conn, &[first.id, 77]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(delete_terms(&conn, first.id).unwrap());
    }
}
