//! Repository for itinerary categories and subcategories

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{delete_row, insert_row, row_exists, update_row, Columns};
use crate::db::models::{Category, CategoryOption, Field, Itinerary, Subcategory};
use crate::error::{BackofficeError, Result};

/// Fields of a subcategory write
#[derive(Debug, Clone, Default)]
pub struct SubcategoryChanges {
    pub category_id: Field<i64>,
    pub subcategory_name: Field<String>,
    pub details: Field<String>,
}

fn map_subcategory(row: &Row<'_>) -> rusqlite::Result<Subcategory> {
    Ok(Subcategory {
        id: row.get(0)?,
        category_id: row.get(1)?,
        subcategory_name: row.get(2)?,
        details: row.get(3)?,
    })
}

/// Subcategories with their category name, by category then subcategory name
pub fn list_itineraries(conn: &Connection) -> Result<Vec<Itinerary>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT s.id, s.category_id, c.category_name, s.subcategory_name, s.details
            FROM subcategories s
            JOIN categories c ON c.id = s.category_id
            ORDER BY c.category_name ASC, s.subcategory_name ASC
            "#,
        )
        .map_err(BackofficeError::Database)?;

    let itineraries = stmt
        .query_map([], |row| {
            Ok(Itinerary {
                id: row.get(0)?,
                category_id: row.get(1)?,
                category_name: row.get(2)?,
                subcategory_name: row.get(3)?,
                details: row.get(4)?,
            })
        })
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(itineraries)
}

pub fn list_category_options(conn: &Connection) -> Result<Vec<CategoryOption>> {
    let mut stmt = conn
        .prepare("SELECT id, category_name FROM categories ORDER BY category_name ASC")
        .map_err(BackofficeError::Database)?;

    let categories = stmt
        .query_map([], |row| {
            Ok(CategoryOption {
                id: row.get(0)?,
                category_name: row.get(1)?,
            })
        })
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(categories)
}

pub fn find_category(conn: &Connection, id: i64) -> Result<Option<Category>> {
    conn.query_row(
        "SELECT id, category_name, description FROM categories WHERE id = ?1",
        [id],
        |row| {
            Ok(Category {
                id: row.get(0)?,
                category_name: row.get(1)?,
                description: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(BackofficeError::Database)
}

pub fn category_exists(conn: &Connection, id: i64) -> Result<bool> {
    row_exists(conn, "categories", id)
}

pub fn create_category(
    conn: &Connection,
    category_name: &str,
    description: Option<&str>,
) -> Result<Category> {
    conn.execute(
        "INSERT INTO categories (category_name, description) VALUES (?1, ?2)",
        params![category_name, description],
    )
    .map_err(BackofficeError::Database)?;

    let id = conn.last_insert_rowid();
    find_category(conn, id)?.ok_or_else(|| BackofficeError::not_found("Category", id))
}

/// Delete a category; its subcategories go with it.
pub fn delete_category(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, "categories", id)
}

pub fn list_subcategories(conn: &Connection) -> Result<Vec<Subcategory>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, category_id, subcategory_name, details FROM subcategories ORDER BY id ASC",
        )
        .map_err(BackofficeError::Database)?;

    let subcategories = stmt
        .query_map([], map_subcategory)
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(subcategories)
}

pub fn find_subcategory(conn: &Connection, id: i64) -> Result<Option<Subcategory>> {
    conn.query_row(
        "SELECT id, category_id, subcategory_name, details FROM subcategories WHERE id = ?1",
        [id],
        map_subcategory,
    )
    .optional()
    .map_err(BackofficeError::Database)
}

pub fn create_subcategory(conn: &Connection, changes: SubcategoryChanges) -> Result<Subcategory> {
    let id = insert_row(
        conn,
        "subcategories",
        Columns::new()
            .field("category_id", changes.category_id)
            .field("subcategory_name", changes.subcategory_name)
            .field("details", changes.details),
    )?;
    find_subcategory(conn, id)?.ok_or_else(|| BackofficeError::not_found("Subcategory", id))
}

pub fn update_subcategory(
    conn: &Connection,
    id: i64,
    changes: SubcategoryChanges,
) -> Result<Option<Subcategory>> {
    let columns = Columns::new()
        .field("category_id", changes.category_id)
        .field("subcategory_name", changes.subcategory_name)
        .field("details", changes.details);
    if !update_row(conn, "subcategories", id, columns)? {
        return Ok(None);
    }
    find_subcategory(conn, id)
}

pub fn delete_subcategory(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, "subcategories", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_connection, Tenant};

    fn subcategory(category_id: i64, name: &str) -> SubcategoryChanges {
        SubcategoryChanges {
            category_id: Field::Present(category_id),
            subcategory_name: Field::Present(name.to_string()),
            details: Field::Present("Day 1: arrival".to_string()),
        }
    }

    #[test]
    fn test_itineraries_are_sorted_by_category_then_name() {
        let conn = create_test_connection(Tenant::Invoice);
        let palawan = create_category(&conn, "Palawan", None).unwrap();
        let bohol = create_category(&conn, "Bohol", Some("Central Visayas")).unwrap();
        create_subcategory(&conn, subcategory(palawan.id, "Coron 3D2N")).unwrap();
        create_subcategory(&conn, subcategory(bohol.id, "Loboc River")).unwrap();
        create_subcategory(&conn, subcategory(bohol.id, "Chocolate Hills")).unwrap();

        let names: Vec<String> = list_itineraries(&conn)
            .unwrap()
            .into_iter()
            .map(|i| format!("{}/{}", i.category_name, i.subcategory_name))
            .collect();
        assert_eq!(
            names,
            vec!["Bohol/Chocolate Hills", "Bohol/Loboc River", "Palawan/Coron 3D2N"]
        );
        assert_eq!(list_category_options(&conn).unwrap()[0].category_name, "Bohol");
    }

    #[test]
    fn test_delete_category_cascades() {
        let conn = create_test_connection(Tenant::Invoice);
        let cebu = create_category(&conn, "Cebu", None).unwrap();
        let sub = create_subcategory(&conn, subcategory(cebu.id, "Oslob")).unwrap();

        assert!(delete_category(&conn, cebu.id).unwrap());
        assert!(find_subcategory(&conn, sub.id).unwrap().is_none());
    }

    #[test]
    fn test_update_subcategory_partial() {
        let conn = create_test_connection(Tenant::Invoice);
        let cebu = create_category(&conn, "Cebu", None).unwrap();
        let sub = create_subcategory(&conn, subcategory(cebu.id, "Oslob")).unwrap();

        let updated = update_subcategory(
            &conn,
            sub.id,
            SubcategoryChanges {
                details: Field::Present(String::new()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.subcategory_name, "Oslob");
        assert_eq!(updated.details.as_deref(), Some(""));
        assert!(delete_subcategory(&conn, sub.id).unwrap());
        assert!(list_subcategories(&conn).unwrap().is_empty());
    }
}
