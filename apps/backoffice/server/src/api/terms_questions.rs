//! Questions on the customer terms form

use axum::extract::{Path, Query, State};
use axum::response::Response;
use rusqlite::Connection;
use tracing::instrument;

use super::response::{created, done, ok};
use super::upload::FormInput;
use super::AppState;
use crate::db::models::{Field, TermsQuestionListParams};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_terms_question, delete_terms_question, find_terms_question, form_package_exists,
    list_form_packages, next_sort_order, paginate_terms_questions, update_terms_question,
    TermsQuestionChanges,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

const PER_PAGE: u64 = 50;

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Terms question", id)
}

fn validate(conn: &Connection, input: &FormInput, updating: bool) -> Result<TermsQuestionChanges> {
    let required = if updating {
        Presence::Sometimes
    } else {
        Presence::Required
    };
    let mut v = Validator::new(&input.fields);
    let package_id = v.integer("package_id", required, None);
    if let Field::Present(id) = package_id {
        if !form_package_exists(conn, id)? {
            v.invalid_selection("package_id");
        }
    }
    let mut changes = TermsQuestionChanges {
        package_id,
        question_text: v.text("question_text", required),
        yes_option: v.string("yes_option", required, 255),
        no_option: v.string("no_option", required, 255),
        sort_order: v.integer("sort_order", Presence::Nullable, Some(0)),
    };
    v.finish()?;

    // the column is not nullable
    if matches!(changes.sort_order, Field::Null) {
        changes.sort_order = Field::Missing;
    }
    Ok(changes)
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<TermsQuestionListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let conn = state.dbs.tnc.lock()?;
    let page = paginate_terms_questions(&conn, &params, request)?;
    ok("Terms questions retrieved successfully", page)
}

#[instrument(skip_all, level = "debug")]
pub async fn packages(State(state): State<AppState>) -> Result<Response> {
    let conn = state.dbs.tnc.lock()?;
    let packages = list_form_packages(&conn)?;
    ok("Packages retrieved successfully", packages)
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let conn = state.dbs.tnc.lock()?;
    let mut changes = validate(&conn, &input, false)?;
    if let (Field::Missing, Field::Present(package_id)) = (&changes.sort_order, &changes.package_id) {
        changes.sort_order = Field::Present(next_sort_order(&conn, *package_id)?);
    }
    let question = create_terms_question(&conn, changes)?;
    tracing::info!(
        question_id = question.id,
        package_id = question.package_id,
        "terms question created"
    );
    created("Terms question created successfully", question)
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.tnc.lock()?;
    let question = find_terms_question(&conn, id)?.ok_or_else(|| not_found(id))?;
    ok("Terms question retrieved successfully", question)
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.tnc.lock()?;
    if find_terms_question(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let changes = validate(&conn, &input, true)?;
    let question = update_terms_question(&conn, id, changes)?.ok_or_else(|| not_found(id))?;
    ok("Terms question updated successfully", question)
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.tnc.lock()?;
    if !delete_terms_question(&conn, id)? {
        return Err(not_found(id));
    }
    tracing::info!(question_id = id, "terms question deleted");
    done("Terms question deleted successfully")
}
