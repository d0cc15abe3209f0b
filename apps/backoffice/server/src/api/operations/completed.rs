//! Completed tours and their after-tour follow-up

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::{keep_on_null, presence, PER_PAGE};
use crate::api::response::{created, done, ok};
use crate::api::upload::FormInput;
use crate::api::AppState;
use crate::db::models::{
    followup_status_display, tail_end_display, CompletedTourListParams, FOLLOWUP_STATUSES,
    TAIL_END_STATUSES,
};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_completed_tour, delete_completed_tour, find_completed_tour, paginate_completed_tours,
    set_followup_status, set_tail_end, update_completed_tour, CompletedTourChanges,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Completed tour", id)
}

fn validate(input: &FormInput, updating: bool) -> Result<CompletedTourChanges> {
    let required = presence(updating);
    let mut v = Validator::new(&input.fields);
    let mut changes = CompletedTourChanges {
        tour_id: v.integer("tour_id", Presence::Nullable, None),
        assigned_team: v.string("assigned_team", required, 255),
        travel_dates: v.string("travel_dates", required, 100),
        destination: v.string("destination", required, 255),
        tour_type: v.string("tour_type", required, 50),
        days: v.integer("days", required, Some(1)),
        pax: v.integer("pax", required, Some(1)),
        lead_guest: v.string("lead_guest", required, 100),
        followup_status: v.one_of("followup_status", Presence::Nullable, &FOLLOWUP_STATUSES),
        tail_end: v.one_of("tail_end", Presence::Nullable, &TAIL_END_STATUSES),
        completion_date: v.date("completion_date", Presence::Nullable),
        customer_assigned: v.boolean("customer_assigned", Presence::Nullable),
        notes: v.text("notes", Presence::Nullable),
        invoice_no: v.string("invoice_no", Presence::Nullable, 255),
    };
    v.finish()?;
    keep_on_null(&mut changes.customer_assigned);
    Ok(changes)
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<CompletedTourListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let conn = state.dbs.invoice.lock()?;
    let page = paginate_completed_tours(&conn, &params, request)?;
    ok("Completed tours retrieved successfully", page.map(|t| t.view()))
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let changes = validate(&input, false)?;
    let conn = state.dbs.invoice.lock()?;
    let tour = create_completed_tour(&conn, changes)?;
    tracing::info!(completed_tour_id = tour.id, "completed tour recorded");
    created("Completed tour created successfully", tour.view())
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let tour = find_completed_tour(&conn, id)?.ok_or_else(|| not_found(id))?;
    ok("Completed tour retrieved successfully", tour.view())
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_completed_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let changes = validate(&input, true)?;
    let tour = update_completed_tour(&conn, id, changes)?.ok_or_else(|| not_found(id))?;
    ok("Completed tour updated successfully", tour.view())
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if !delete_completed_tour(&conn, id)? {
        return Err(not_found(id));
    }
    tracing::info!(completed_tour_id = id, "completed tour deleted");
    done("Completed tour deleted successfully")
}

#[instrument(skip(state, input))]
pub async fn followup_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_completed_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let mut v = Validator::new(&input.fields);
    let status = v.one_of("followup_status", Presence::Required, &FOLLOWUP_STATUSES);
    v.finish()?;

    let tour = set_followup_status(&conn, id, status.present().as_deref())?
        .ok_or_else(|| not_found(id))?;
    ok(
        "Follow-up status updated successfully",
        json!({
            "id": tour.id,
            "followup_status": tour.followup_status,
            "followup_status_display": followup_status_display(tour.followup_status.as_deref()),
        }),
    )
}

#[instrument(skip(state, input))]
pub async fn tail_end(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_completed_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let mut v = Validator::new(&input.fields);
    let status = v.one_of("tail_end", Presence::Required, &TAIL_END_STATUSES);
    v.finish()?;

    let tour = set_tail_end(&conn, id, status.present().as_deref())?.ok_or_else(|| not_found(id))?;
    ok(
        "Tail-end status updated successfully",
        json!({
            "id": tour.id,
            "tail_end": tour.tail_end,
            "tail_end_display": tail_end_display(tour.tail_end.as_deref()),
        }),
    )
}
