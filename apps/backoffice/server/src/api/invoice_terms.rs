//! Invoice terms blocks

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;
use tracing::instrument;

use super::response::{legacy, LegacyResult};
use super::upload::FormInput;
use super::AppState;
use crate::db::repository::{
    create_invoice_term, delete_invoice_term, list_invoice_terms, update_invoice_term,
};

fn status(code: StatusCode, label: &str, message: &str) -> LegacyResult {
    legacy(code, json!({ "status": label, "message": message }))
}

#[instrument(skip_all, level = "debug")]
pub async fn index(State(state): State<AppState>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    let terms = list_invoice_terms(&conn)?;
    legacy(StatusCode::OK, json!({ "status": "success", "terms": terms }))
}

#[instrument(skip_all)]
pub async fn create(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let (Some(category), Some(details)) = (input.text("category"), input.text("details")) else {
        return status(
            StatusCode::BAD_REQUEST,
            "Null",
            "Category and details are required.",
        );
    };

    let conn = state.dbs.invoice.lock()?;
    let term = create_invoice_term(&conn, &category, &details)?;
    tracing::info!(term_id = term.id, "invoice term created");
    legacy(
        StatusCode::CREATED,
        json!({ "status": "success", "message": "Term created successfully", "term": term }),
    )
}

#[instrument(skip_all)]
pub async fn edit(State(state): State<AppState>, input: FormInput) -> LegacyResult {
    let Some(id) = input.integer("id") else {
        return status(StatusCode::BAD_REQUEST, "Null", "No Id provided");
    };
    let Some(category) = input.text("category") else {
        return status(StatusCode::BAD_REQUEST, "Null", "Empty category not allowed");
    };
    let Some(details) = input.text("details") else {
        return status(StatusCode::BAD_REQUEST, "Null", "Empty details not allowed");
    };

    let conn = state.dbs.invoice.lock()?;
    match update_invoice_term(&conn, id, &category, &details)? {
        Some(term) => legacy(
            StatusCode::OK,
            json!({ "status": "success", "message": "Successfully updated term", "term": term }),
        ),
        None => status(StatusCode::NOT_FOUND, "Not Found", "Term not found"),
    }
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> LegacyResult {
    let conn = state.dbs.invoice.lock()?;
    match delete_invoice_term(&conn, id)? {
        Some(term) => {
            tracing::info!(term_id = id, "invoice term deleted");
            legacy(
                StatusCode::OK,
                json!({ "status": "success", "message": "Successfully deleted term", "term": term }),
            )
        }
        None => status(StatusCode::NOT_FOUND, "Not Found", "Term not found"),
    }
}
