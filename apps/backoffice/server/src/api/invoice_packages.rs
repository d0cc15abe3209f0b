//! Invoice line packages
//!
//! `/invoice-packages/*` keeps the older `status` envelope and its ad hoc
//! checks; `/packages` is the validated resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::response::{created, done, legacy, missing, ok, LegacyResult};
use super::upload::FormInput;
use super::AppState;
use crate::db::models::{Field, InvoicePackageListParams};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_invoice_package, delete_invoice_package, find_invoice_package, list_invoice_packages,
    paginate_invoice_packages, update_invoice_package, InvoicePackageChanges,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

const LEGACY_PER_PAGE: u64 = 10;

fn bad_request(message: &str) -> LegacyResult {
    legacy(
        StatusCode::BAD_REQUEST,
        json!({ "status": "Null", "message": message }),
    )
}

fn full_details(input: &FormInput) -> Option<String> {
    input
        .text("items_full_details")
        .or_else(|| input.text("item_full_details"))
}

#[instrument(skip_all, level = "debug")]
pub async fn all(State(state): State<AppState>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    let packages = list_invoice_packages(&conn)?;
    legacy(
        StatusCode::OK,
        json!({ "status": "success", "packages": packages }),
    )
}

#[instrument(skip(state), level = "debug")]
pub async fn paginated(
    State(state): State<AppState>,
    Query(params): Query<InvoicePackageListParams>,
) -> LegacyResult {
    let request = PageRequest::from_params(&params.paging, LEGACY_PER_PAGE);
    let conn = state.dbs.invoice.lock()?;
    let page = paginate_invoice_packages(&conn, &params, request)?;
    legacy(
        StatusCode::OK,
        json!({
            "status": "success",
            "packages": page.data,
            "pagination": {
                "total": page.total,
                "per_page": page.per_page,
                "current_page": page.current_page,
                "last_page": page.last_page,
            }
        }),
    )
}

#[instrument(skip_all)]
pub async fn create(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let sku = input.text("sku");
    let items = input.text("items");
    let price = input.decimal("price");
    if sku.is_none() && items.is_none() && !price.is_some_and(|p| p > 0.0) {
        return bad_request("SKU or Items or Price is not provided");
    }

    let changes = InvoicePackageChanges {
        sku: sku.into(),
        quantity: Field::Present(input.integer("quantity").unwrap_or(1)),
        category: input.text("category").into(),
        items: items.into(),
        items_full_details: full_details(&input).into(),
        price: price.into(),
    };

    let conn = state.dbs.invoice.lock()?;
    let package = create_invoice_package(&conn, changes)?;
    tracing::info!(package_id = package.id, "invoice package created");
    legacy(
        StatusCode::CREATED,
        json!({
            "status": "success",
            "message": "Invoice Package created successfully",
            "invoice_package": package,
        }),
    )
}

#[instrument(skip_all)]
pub async fn edit(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let Some(id) = input.integer("id") else {
        return bad_request("No Id provided");
    };
    let Some(sku) = input.text("sku") else {
        return bad_request("Empty SKU not allowed");
    };
    let Some(items) = input.text("items") else {
        return bad_request("Empty Items not allowed");
    };
    let Some(category) = input.text("category") else {
        return bad_request("Empty Category not allowed");
    };
    let Some(price) = input.decimal("price").filter(|p| *p > 0.0) else {
        return bad_request("Price must be greater than zero");
    };

    let changes = InvoicePackageChanges {
        sku: Field::Present(sku),
        quantity: input.integer("quantity").into(),
        category: Field::Present(category),
        items: Field::Present(items),
        items_full_details: full_details(&input).into(),
        price: Field::Present(price),
    };

    let conn = state.dbs.invoice.lock()?;
    match update_invoice_package(&conn, id, changes)? {
        Some(package) => legacy(
            StatusCode::OK,
            json!({
                "status": "success",
                "message": "Invoice package updated successfully",
                "invoice_package": package,
            }),
        ),
        None => legacy(
            StatusCode::NOT_FOUND,
            json!({
                "status": "Null",
                "message": "No invoice package found with the provided Id",
            }),
        ),
    }
}

#[instrument(skip(state))]
pub async fn delete_legacy(State(state): State<AppState>, Path(id): Path<i64>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    if !delete_invoice_package(&conn, id)? {
        return legacy(
            StatusCode::NOT_FOUND,
            json!({ "status": "Not Found", "message": "No invoice package found" }),
        );
    }
    tracing::info!(package_id = id, "invoice package deleted");
    legacy(
        StatusCode::OK,
        json!({ "status": "success", "message": "Successfully deleted invoice package" }),
    )
}

fn validate(input: &FormInput, updating: bool) -> Result<InvoicePackageChanges> {
    let required = if updating {
        Presence::Sometimes
    } else {
        Presence::Required
    };
    let mut v = Validator::new(&input.fields);
    let changes = InvoicePackageChanges {
        sku: v.string("sku", required, 255),
        quantity: v.integer("quantity", required, Some(1)),
        category: v.string("category", required, 255),
        items: v.text("items", required),
        items_full_details: v.text("items_full_details", Presence::Nullable),
        price: v.decimal("price", required, Some(0.0)),
    };
    v.finish()?;
    Ok(changes)
}

#[instrument(skip_all, level = "debug")]
pub async fn index(State(state): State<AppState>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let packages = list_invoice_packages(&conn)?;
    if packages.is_empty() {
        return missing("No packages found");
    }
    ok("Packages retrieved successfully", packages)
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let changes = validate(&input, false)?;
    let conn = state.dbs.invoice.lock()?;
    let package = create_invoice_package(&conn, changes)?;
    tracing::info!(package_id = package.id, "package created");
    created("Package created successfully", package)
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let package =
        find_invoice_package(&conn, id)?.ok_or_else(|| BackofficeError::not_found("Package", id))?;
    ok("Package retrieved successfully", package)
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let changes = validate(&input, true)?;
    let conn = state.dbs.invoice.lock()?;
    let package = update_invoice_package(&conn, id, changes)?
        .ok_or_else(|| BackofficeError::not_found("Package", id))?;
    ok("Package updated successfully", package)
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if !delete_invoice_package(&conn, id)? {
        return Err(BackofficeError::not_found("Package", id));
    }
    tracing::info!(package_id = id, "package deleted");
    done("Package deleted successfully")
}
