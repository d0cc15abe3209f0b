//! Itinerary categories and their subcategories

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::response::{created, done, legacy, missing, ok, LegacyResult};
use super::upload::FormInput;
use super::AppState;
use crate::db::models::Field;
use crate::db::repository::{
    self as repo, category_exists, create_subcategory, delete_subcategory, find_subcategory,
    list_category_options, list_itineraries, list_subcategories, update_subcategory,
    SubcategoryChanges,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

fn status(code: StatusCode, label: &str, message: &str) -> LegacyResult {
    legacy(code, json!({ "status": label, "message": message }))
}

#[instrument(skip_all, level = "debug")]
pub async fn index(State(state): State<AppState>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    let itineraries = list_itineraries(&conn)?;
    if itineraries.is_empty() {
        return status(StatusCode::OK, "error", "Empty Itineraries");
    }
    legacy(
        StatusCode::OK,
        json!({ "status": "success", "itineraries": itineraries }),
    )
}

#[instrument(skip_all, level = "debug")]
pub async fn categories(State(state): State<AppState>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    let categories = list_category_options(&conn)?;
    if categories.is_empty() {
        return status(StatusCode::OK, "error", "No Categories Found");
    }
    legacy(
        StatusCode::OK,
        json!({ "status": "success", "categories": categories }),
    )
}

#[instrument(skip_all)]
pub async fn create_category(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let Some(name) = input.text("category_name") else {
        return status(StatusCode::BAD_REQUEST, "Null", "Empty category name not allowed");
    };
    let description = input.text("description");

    let conn = state.dbs.invoice.lock()?;
    let category = repo::create_category(&conn, &name, description.as_deref())?;
    tracing::info!(category_id = category.id, "itinerary category created");
    legacy(
        StatusCode::CREATED,
        json!({
            "status": "success",
            "messageType": "success",
            "message": "Category created successfully",
            "category": category,
        }),
    )
}

#[instrument(skip(state))]
pub async fn delete_category(State(state): State<AppState>, Path(id): Path<i64>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    if !repo::delete_category(&conn, id)? {
        return status(StatusCode::NOT_FOUND, "error", "Category not found");
    }
    tracing::info!(category_id = id, "itinerary category deleted");
    status(StatusCode::OK, "success", "Category deleted successfully")
}

#[instrument(skip_all)]
pub async fn create(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    let category_id = match input.integer("category_id") {
        Some(id) if category_exists(&conn, id)? => id,
        _ => return status(StatusCode::NOT_FOUND, "error", "Category not found"),
    };
    let Some(name) = input.text("subcategory_name") else {
        return status(StatusCode::BAD_REQUEST, "Null", "Empty subcategory name not allowed");
    };

    let subcategory = create_subcategory(
        &conn,
        SubcategoryChanges {
            category_id: Field::Present(category_id),
            subcategory_name: Field::Present(name),
            details: Field::Present(input.text("details").unwrap_or_default()),
        },
    )?;
    tracing::info!(subcategory_id = subcategory.id, "itinerary added");
    legacy(
        StatusCode::CREATED,
        json!({
            "status": "success",
            "message": "Subcategory added successfully!",
            "messageType": "success",
            "subcategory": subcategory,
        }),
    )
}

#[instrument(skip_all)]
pub async fn edit(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let Some(id) = input.integer("id") else {
        return status(StatusCode::BAD_REQUEST, "Null", "No Id provided");
    };

    let conn = state.dbs.invoice.lock()?;
    if let Some(category_id) = input.integer("category_id") {
        if !category_exists(&conn, category_id)? {
            return status(StatusCode::NOT_FOUND, "error", "Category not found");
        }
    }
    let changes = SubcategoryChanges {
        category_id: input.integer("category_id").into(),
        subcategory_name: input.text("subcategory_name").into(),
        details: Field::Present(input.text("details").unwrap_or_default()),
    };

    match update_subcategory(&conn, id, changes)? {
        Some(subcategory) => legacy(
            StatusCode::OK,
            json!({
                "status": "success",
                "messageType": "success",
                "message": "subcategory updated successfully",
                "subcategory": subcategory,
            }),
        ),
        None => legacy(
            StatusCode::NOT_FOUND,
            json!({
                "status": "error",
                "messageType": "danger",
                "message": "Subcategory not found",
            }),
        ),
    }
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    if !delete_subcategory(&conn, id)? {
        return status(StatusCode::NOT_FOUND, "Not Found", "No itinerary found");
    }
    legacy(
        StatusCode::OK,
        json!({
            "status": "success",
            "messageType": "success",
            "message": "Itinerary deleted successfully",
        }),
    )
}

fn validate_subcategory(
    conn: &rusqlite::Connection,
    input: &FormInput,
    updating: bool,
) -> Result<SubcategoryChanges> {
    let required = if updating {
        Presence::Sometimes
    } else {
        Presence::Required
    };
    let mut v = Validator::new(&input.fields);
    let category_id = v.integer("category_id", required, None);
    if let Field::Present(id) = category_id {
        if !category_exists(conn, id)? {
            v.invalid_selection("category_id");
        }
    }
    let changes = SubcategoryChanges {
        category_id,
        subcategory_name: v.string("subcategory_name", required, 255),
        details: v.text("details", Presence::Nullable),
    };
    v.finish()?;
    Ok(changes)
}

#[instrument(skip_all, level = "debug")]
pub async fn subcategory_index(State(state): State<AppState>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let subcategories = list_subcategories(&conn)?;
    if subcategories.is_empty() {
        return missing("No subcategories found");
    }
    ok("Subcategories retrieved successfully", subcategories)
}

#[instrument(skip_all)]
pub async fn subcategory_store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let changes = validate_subcategory(&conn, &input, false)?;
    let subcategory = create_subcategory(&conn, changes)?;
    created("Subcategory created successfully", subcategory)
}

#[instrument(skip(state), level = "debug")]
pub async fn subcategory_show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let subcategory = find_subcategory(&conn, id)?
        .ok_or_else(|| BackofficeError::not_found("Subcategory", id))?;
    ok("Subcategory retrieved successfully", subcategory)
}

#[instrument(skip(state, input))]
pub async fn subcategory_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_subcategory(&conn, id)?.is_none() {
        return Err(BackofficeError::not_found("Subcategory", id));
    }
    let changes = validate_subcategory(&conn, &input, true)?;
    let subcategory = update_subcategory(&conn, id, changes)?
        .ok_or_else(|| BackofficeError::not_found("Subcategory", id))?;
    ok("Subcategory updated successfully", subcategory)
}

#[instrument(skip(state))]
pub async fn subcategory_destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if !delete_subcategory(&conn, id)? {
        return Err(BackofficeError::not_found("Subcategory", id));
    }
    done("Subcategory deleted successfully")
}
