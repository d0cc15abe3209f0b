//! SQL query builders for invoice packages

use sea_query::{Order, Query, SelectStatement};

use super::{col, search_any, sort_column, sort_direction};
use crate::db::models::{param, InvoicePackageListParams};

pub const INVOICE_PACKAGE_COLUMNS: [&str; 9] = [
    "id",
    "sku",
    "quantity",
    "category",
    "items",
    "items_full_details",
    "price",
    "created_at",
    "updated_at",
];

const INVOICE_PACKAGE_SORTS: [&str; 7] =
    ["id", "sku", "category", "items", "price", "quantity", "created_at"];

const INVOICE_PACKAGE_SEARCH: [&str; 6] = ["sku", "category", "items", "price", "created_at", "id"];

/// Build the paginated invoice package listing
///
/// Search matches any of sku, category, items, price, created_at or id.
/// `sortBy` falls back to `created_at`, `sortDir` to descending.
pub fn build_invoice_package_list_query(params: &InvoicePackageListParams) -> SelectStatement {
    let mut query = Query::select();
    query
        .columns(INVOICE_PACKAGE_COLUMNS.map(col))
        .from(col("invoice_package"));

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(&INVOICE_PACKAGE_SEARCH, term));
    }

    let sort = sort_column(param(&params.sort_by), &INVOICE_PACKAGE_SORTS, "created_at");
    query
        .order_by(col(sort), sort_direction(param(&params.sort_dir), Order::Desc))
        .order_by(col("id"), Order::Desc);
    query
}

/// All invoice packages, newest first
pub fn build_all_invoice_packages_query() -> SelectStatement {
    Query::select()
        .columns(INVOICE_PACKAGE_COLUMNS.map(col))
        .from(col("invoice_package"))
        .order_by(col("created_at"), Order::Desc)
        .order_by(col("id"), Order::Desc)
        .to_owned()
}
