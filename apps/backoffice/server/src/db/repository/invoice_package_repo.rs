//! Repository for invoice line packages

use rusqlite::{Connection, OptionalExtension, Row};
use sea_query::SqliteQueryBuilder;

use super::{delete_row, insert_row, timestamp, update_row, Columns};
use crate::db::models::{
    now_timestamp, parse_timestamp, Field, InvoicePackage, InvoicePackageListParams,
};
use crate::db::queries::{
    build_all_invoice_packages_query, build_invoice_package_list_query, fetch_all, fetch_page,
    Page, PageRequest,
};
use crate::error::{BackofficeError, Result};

const TABLE: &str = "invoice_package";

/// Fields of an invoice package write
#[derive(Debug, Clone, Default)]
pub struct InvoicePackageChanges {
    pub sku: Field<String>,
    pub quantity: Field<i64>,
    pub category: Field<String>,
    pub items: Field<String>,
    pub items_full_details: Field<String>,
    pub price: Field<f64>,
}

impl InvoicePackageChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("sku", self.sku)
            .field("quantity", self.quantity)
            .field("category", self.category)
            .field("items", self.items)
            .field("items_full_details", self.items_full_details)
            .field("price", self.price)
    }
}

fn map_invoice_package(row: &Row<'_>) -> rusqlite::Result<InvoicePackage> {
    Ok(InvoicePackage {
        id: row.get(0)?,
        sku: row.get(1)?,
        quantity: row.get(2)?,
        category: row.get(3)?,
        items: row.get(4)?,
        items_full_details: row.get(5)?,
        price: row.get(6)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?),
        updated_at: timestamp(row.get(8)?),
    })
}

pub fn list_invoice_packages(conn: &Connection) -> Result<Vec<InvoicePackage>> {
    fetch_all(conn, &build_all_invoice_packages_query(), map_invoice_package)
}

pub fn paginate_invoice_packages(
    conn: &Connection,
    params: &InvoicePackageListParams,
    request: PageRequest,
) -> Result<Page<InvoicePackage>> {
    let query = build_invoice_package_list_query(params);
    tracing::trace!(sql = %query.to_string(SqliteQueryBuilder), "invoice package page");
    fetch_page(conn, &query, request, map_invoice_package)
}

pub fn find_invoice_package(conn: &Connection, id: i64) -> Result<Option<InvoicePackage>> {
    let sql = r#"
        SELECT id, sku, quantity, category, items, items_full_details, price, created_at, updated_at
        FROM invoice_package
        WHERE id = ?1
    "#;

    conn.query_row(sql, [id], map_invoice_package)
        .optional()
        .map_err(BackofficeError::Database)
}

pub fn create_invoice_package(
    conn: &Connection,
    changes: InvoicePackageChanges,
) -> Result<InvoicePackage> {
    let now = now_timestamp();
    let id = insert_row(
        conn,
        TABLE,
        changes
            .columns()
            .set("created_at", now.clone())
            .set("updated_at", now),
    )?;
    find_invoice_package(conn, id)?.ok_or_else(|| BackofficeError::not_found("Package", id))
}

/// Apply changes; `None` when the package does not exist
pub fn update_invoice_package(
    conn: &Connection,
    id: i64,
    changes: InvoicePackageChanges,
) -> Result<Option<InvoicePackage>> {
    if !update_row(conn, TABLE, id, changes.columns().set("updated_at", now_timestamp()))? {
        return Ok(None);
    }
    find_invoice_package(conn, id)
}

pub fn delete_invoice_package(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, TABLE, id)
}
