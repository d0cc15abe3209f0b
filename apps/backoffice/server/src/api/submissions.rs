//! Customer terms form submissions
//!
//! Creating a submission and attaching a receipt are public; the customer
//! form posts them without an account.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use tracing::instrument;

use super::response::{created, done, ok};
use super::upload::{check_file, FormInput, RECEIPT_UPLOAD};
use super::AppState;
use crate::db::models::{Field, Submission, SubmissionListParams};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    add_payment_receipt, create_submission, delete_submission, find_submission,
    find_submission_detail, paginate_submissions, set_submission_archived, update_submission,
    NewAnswer, NewReceipt, SubmissionChanges,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

const PER_PAGE: u64 = 15;
const RECEIPT_DIR: &str = "payment_receipts";

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Submission", id)
}

fn contact_fields(v: &mut Validator<'_>, required: Presence) -> SubmissionChanges {
    SubmissionChanges {
        package_type: v.string("package_type", required, 255),
        email: v.email("email", required, 255),
        lead_guest: v.string("lead_guest", required, 255),
        contact_number: v.string("contact_number", required, 20),
        fb_name: v.string("fb_name", Presence::Nullable, 255),
        payment_date: v.date("payment_date", Presence::Nullable),
        payment_amount: v.decimal("payment_amount", Presence::Nullable, Some(0.0)),
        has_payment_receipt: v.boolean("has_payment_receipt", Presence::Nullable),
        ..Default::default()
    }
}

/// Nullable flags keep their column value when sent as null.
fn drop_null_flags(changes: &mut SubmissionChanges) {
    if matches!(changes.has_payment_receipt, Field::Null) {
        changes.has_payment_receipt = Field::Missing;
    }
    if matches!(changes.archived, Field::Null) {
        changes.archived = Field::Missing;
    }
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SubmissionListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let page = {
        let conn = state.dbs.tnc.lock()?;
        paginate_submissions(&conn, &params, request)?
    };
    ok(
        "Submissions retrieved successfully",
        page.map(|detail| detail.view(&state.storage)),
    )
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let mut v = Validator::new(&input.fields);
    let mut changes = contact_fields(&mut v, Presence::Required);
    let companions = v
        .string_list("companions", Presence::Nullable, 255)
        .present()
        .unwrap_or_default();

    let mut answers = Vec::new();
    if let Field::Present(items) = v.objects("answers", Presence::Nullable) {
        for (i, item) in items.into_iter().enumerate() {
            let mut nested = Validator::scoped(item, format!("answers.{i}."));
            let question_id = nested.integer("question_id", Presence::Required, None);
            let answer = nested.text("answer", Presence::Required);
            if let (Field::Present(question_id), Field::Present(answer)) = (question_id, answer) {
                answers.push(NewAnswer {
                    question_id,
                    answer,
                });
            }
            v.absorb(nested);
        }
    }
    v.finish()?;
    drop_null_flags(&mut changes);

    let detail = {
        let conn = state.dbs.tnc.lock()?;
        create_submission(&conn, changes, &companions, &answers)?
    };
    tracing::info!(
        submission_id = detail.submission.id,
        package_type = %detail.submission.package_type,
        companions = companions.len(),
        answers = answers.len(),
        "submission received"
    );
    created(
        "Submission created successfully",
        detail.view(&state.storage),
    )
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let detail = {
        let conn = state.dbs.tnc.lock()?;
        find_submission_detail(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    ok(
        "Submission retrieved successfully",
        detail.view(&state.storage),
    )
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.tnc.lock()?;
    if find_submission(&conn, id)?.is_none() {
        return Err(not_found(id));
    }

    let mut v = Validator::new(&input.fields);
    let mut changes = contact_fields(&mut v, Presence::Sometimes);
    changes.archived = v.boolean("archived", Presence::Nullable);
    v.finish()?;
    drop_null_flags(&mut changes);

    let submission = update_submission(&conn, id, changes)?.ok_or_else(|| not_found(id))?;
    ok("Submission updated successfully", submission)
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let receipts = {
        let conn = state.dbs.tnc.lock()?;
        delete_submission(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    for receipt in &receipts {
        state.storage.delete_quietly(&receipt.file_path);
    }
    tracing::info!(submission_id = id, receipts = receipts.len(), "submission deleted");
    done("Submission deleted successfully")
}

fn set_archived(state: &AppState, id: i64, archived: bool) -> Result<Submission> {
    let conn = state.dbs.tnc.lock()?;
    if !set_submission_archived(&conn, id, archived)? {
        return Err(not_found(id));
    }
    find_submission(&conn, id)?.ok_or_else(|| not_found(id))
}

#[instrument(skip(state))]
pub async fn archive(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let submission = set_archived(&state, id, true)?;
    ok("Submission archived successfully", submission)
}

#[instrument(skip(state))]
pub async fn restore(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let submission = set_archived(&state, id, false)?;
    ok("Submission restored successfully", submission)
}

#[instrument(skip(state, input))]
pub async fn upload_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    {
        let conn = state.dbs.tnc.lock()?;
        if find_submission(&conn, id)?.is_none() {
            return Err(not_found(id));
        }
    }

    let mut v = Validator::new(&input.fields);
    let file = input.file("receipt");
    let kind = check_file(&mut v, "receipt", file, &RECEIPT_UPLOAD, true);
    v.finish()?;
    let (Some(file), Some(kind)) = (file, kind) else {
        return Err(BackofficeError::validation(
            "receipt",
            "The receipt field is required.",
        ));
    };

    let stored = state
        .storage
        .store_upload(RECEIPT_DIR, &file.file_name, &file.bytes)?;
    let result = {
        let conn = state.dbs.tnc.lock()?;
        add_payment_receipt(
            &conn,
            id,
            NewReceipt {
                file_name: file.file_name.clone(),
                file_path: stored.path.clone(),
                file_size: stored.size as i64,
                mime_type: Some(kind.mime().to_string()),
            },
        )
    };
    let receipt = match result {
        Ok(receipt) => receipt,
        Err(e) => {
            state.storage.delete_quietly(&stored.path);
            return Err(e);
        }
    };

    tracing::info!(
        submission_id = id,
        receipt_id = receipt.id,
        size = stored.size,
        "payment receipt uploaded"
    );
    created(
        "Payment receipt uploaded successfully",
        receipt.view(&state.storage),
    )
}
