//! Terms and conditions documents
//!
//! Create and update accept JSON or multipart with an optional `pdf_file`.
//! A replaced or deleted document takes its PDF with it.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::instrument;

use super::response::{created, done, missing, ok};
use super::upload::{check_file, FormInput, PDF_UPLOAD};
use super::AppState;
use crate::db::models::{Field, TermsListParams};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_terms, delete_terms, find_terms, find_terms_by_ids, paginate_terms, set_terms_active,
    update_terms, TermsChanges,
};
use crate::error::{BackofficeError, Result};
use crate::storage::{Storage, StoredFile};
use crate::utils::format::sanitize_file_name;
use crate::validation::{Presence, Validator};

const PER_PAGE: u64 = 15;
const PDF_DIR: &str = "terms_conditions";
const BULK_ACTIONS: [&str; 3] = ["activate", "deactivate", "delete"];

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Terms and conditions", id)
}

/// Validate the form and store the PDF, if any.
fn accept(
    input: &FormInput,
    storage: &Storage,
    updating: bool,
) -> Result<(TermsChanges, Option<StoredFile>)> {
    let required = if updating {
        Presence::Sometimes
    } else {
        Presence::Required
    };
    let mut v = Validator::new(&input.fields);
    let mut changes = TermsChanges {
        title: v.string("title", required, 255),
        content: v.text("content", required),
        is_active: v.boolean("is_active", Presence::Nullable),
        ..Default::default()
    };
    let pdf = input.file("pdf_file");
    check_file(&mut v, "pdf_file", pdf, &PDF_UPLOAD, false);
    v.finish()?;

    if !updating && !matches!(changes.is_active, Field::Present(_)) {
        changes.is_active = Field::Present(true);
    }
    if matches!(changes.is_active, Field::Null) {
        changes.is_active = Field::Missing;
    }

    let stored = match pdf {
        Some(file) => {
            let stored = storage.store_upload(PDF_DIR, &file.file_name, &file.bytes)?;
            changes.pdf_file_path = Field::Present(stored.path.clone());
            changes.pdf_file_name = Field::Present(file.file_name.clone());
            Some(stored)
        }
        None => None,
    };
    Ok((changes, stored))
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<TermsListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let page = {
        let conn = state.dbs.invoice.lock()?;
        paginate_terms(&conn, &params, request)?
    };
    ok(
        "Terms and conditions retrieved successfully",
        page.map(|terms| terms.view(&state.storage)),
    )
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let (changes, stored) = accept(&input, &state.storage, false)?;
    let result = {
        let conn = state.dbs.invoice.lock()?;
        create_terms(&conn, changes)
    };
    let terms = match result {
        Ok(terms) => terms,
        Err(e) => {
            if let Some(file) = stored {
                state.storage.delete_quietly(&file.path);
            }
            return Err(e);
        }
    };

    tracing::info!(terms_id = terms.id, has_pdf = terms.pdf_file_path.is_some(), "terms created");
    created(
        "Terms and conditions created successfully",
        terms.view(&state.storage),
    )
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let terms = {
        let conn = state.dbs.invoice.lock()?;
        find_terms(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    ok(
        "Terms and conditions retrieved successfully",
        terms.view(&state.storage),
    )
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let previous = {
        let conn = state.dbs.invoice.lock()?;
        find_terms(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    let (changes, stored) = accept(&input, &state.storage, true)?;

    let result = {
        let conn = state.dbs.invoice.lock()?;
        update_terms(&conn, id, changes)
    };
    let terms = match result {
        Ok(Some(terms)) => terms,
        other => {
            if let Some(file) = &stored {
                state.storage.delete_quietly(&file.path);
            }
            return Err(other.err().unwrap_or_else(|| not_found(id)));
        }
    };

    if stored.is_some() {
        if let Some(old) = previous.pdf_file_path.as_deref().filter(|p| !p.is_empty()) {
            state.storage.delete_quietly(old);
        }
    }

    tracing::info!(terms_id = id, "terms updated");
    ok(
        "Terms and conditions updated successfully",
        terms.view(&state.storage),
    )
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let terms = {
        let conn = state.dbs.invoice.lock()?;
        let terms = find_terms(&conn, id)?.ok_or_else(|| not_found(id))?;
        delete_terms(&conn, id)?;
        terms
    };
    if let Some(path) = terms.pdf_file_path.as_deref().filter(|p| !p.is_empty()) {
        state.storage.delete_quietly(path);
    }
    tracing::info!(terms_id = id, "terms deleted");
    done("Terms and conditions deleted successfully")
}

#[instrument(skip(state))]
pub async fn toggle_status(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let terms = find_terms(&conn, id)?.ok_or_else(|| not_found(id))?;
    let is_active = !terms.is_active;
    set_terms_active(&conn, id, is_active)?;
    ok(
        "Status updated successfully",
        json!({ "id": id, "is_active": is_active }),
    )
}

/// The attached PDF, shown inline.
#[instrument(skip(state), level = "debug")]
pub async fn pdf(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let terms = {
        let conn = state.dbs.invoice.lock()?;
        find_terms(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    let (Some(path), Some(name)) = (
        terms.pdf_file_path.clone().filter(|p| !p.is_empty()),
        terms.pdf_file_name(),
    ) else {
        return Err(BackofficeError::not_found("PDF file", id));
    };
    if !state.storage.exists(&path) {
        tracing::warn!(terms_id = id, path = %path, "PDF missing from storage");
        return missing("PDF file not found on server");
    }
    let bytes = state.storage.read(&path)?;

    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        sanitize_file_name(&name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("inline"));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[instrument(skip_all)]
pub async fn bulk_action(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let mut v = Validator::new(&input.fields);
    let action = v.one_of("action", Presence::Required, &BULK_ACTIONS);
    let ids = v.integer_list("ids", Presence::Required);
    if matches!(&ids, Field::Present(ids) if ids.is_empty()) {
        v.fail("ids", "The ids field must have at least 1 items.");
    }
    v.finish()?;
    let (Some(action), Some(ids)) = (action.present(), ids.present()) else {
        return Err(BackofficeError::bad_request("Invalid bulk action."));
    };

    let (processed, files) = {
        let _span = crate::operation_span!("terms_bulk_action", action = %action, count = ids.len())
            .entered();
        let conn = state.dbs.invoice.lock()?;
        let found = find_terms_by_ids(&conn, &ids)?;
        if found.is_empty() {
            return missing("No terms found with provided IDs");
        }
        let tx = conn.unchecked_transaction()?;
        let mut files = Vec::new();
        for terms in &found {
            match action.as_str() {
                "activate" => {
                    set_terms_active(&tx, terms.id, true)?;
                }
                "deactivate" => {
                    set_terms_active(&tx, terms.id, false)?;
                }
                _ => {
                    delete_terms(&tx, terms.id)?;
                    files.extend(terms.pdf_file_path.clone().filter(|p| !p.is_empty()));
                }
            }
        }
        tx.commit()?;
        (found.len(), files)
    };

    for path in &files {
        state.storage.delete_quietly(path);
    }
    tracing::info!(action = %action, processed, total = ids.len(), "terms bulk action");
    ok(
        &format!("Bulk {action} completed successfully"),
        json!({ "processed": processed, "total": ids.len() }),
    )
}
