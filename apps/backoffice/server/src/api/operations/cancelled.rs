//! Cancelled tours and their refunds

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::{presence, PER_PAGE};
use crate::api::response::{created, done, ok};
use crate::api::upload::FormInput;
use crate::api::AppState;
use crate::db::models::{
    CancelledTourListParams, COORDINATOR_OPTIONS, PAYMENT_STATUSES, REFUND_STATUSES,
};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_cancelled_tour, delete_cancelled_tour, find_cancelled_tour, paginate_cancelled_tours,
    set_refund_status, update_cancelled_tour, CancelledTourChanges,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Cancelled tour", id)
}

fn validate(input: &FormInput, updating: bool) -> Result<CancelledTourChanges> {
    let required = presence(updating);
    let mut v = Validator::new(&input.fields);
    let changes = CancelledTourChanges {
        tour_id: v.integer("tour_id", Presence::Nullable, None),
        cancellation_person: v.string("cancellation_person", Presence::Nullable, 255),
        cancellation_reason: v.text("cancellation_reason", Presence::Nullable),
        refund_status: v.one_of("refund_status", Presence::Nullable, &REFUND_STATUSES),
        cancellation_date: v.date("cancellation_date", required),
        days: v.integer("days", required, Some(1)),
        pax: v.integer("pax", required, Some(1)),
        with_coordinator: v.one_of("with_coordinator", required, &COORDINATOR_OPTIONS),
        pickup_point: v.string("pickup_point", required, 255),
        balance: v.decimal("balance", Presence::Nullable, Some(0.0)),
        payment_status: v.one_of("payment_status", required, &PAYMENT_STATUSES),
        accommodation: v.string("accommodation", Presence::Nullable, 255),
        room_setup: v.string("room_setup", Presence::Nullable, 255),
        booked_accommodation: v.boolean("booked_accommodation", Presence::Nullable),
        van_details_sent: v.boolean("van_details_sent", Presence::Nullable),
        assigned_team: v.string("assigned_team", Presence::Nullable, 255),
        status: v.string("status", required, 50),
        notes: v.text("notes", Presence::Nullable),
        lead_guest: v.string("lead_guest", required, 255),
        contact: v.string("contact", required, 100),
        destination: v.string("destination", required, 255),
    };
    v.finish()?;
    Ok(changes)
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<CancelledTourListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let conn = state.dbs.invoice.lock()?;
    let page = paginate_cancelled_tours(&conn, &params, request)?;
    ok("Cancelled tours retrieved successfully", page.map(|t| t.view()))
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let changes = validate(&input, false)?;
    let conn = state.dbs.invoice.lock()?;
    let tour = create_cancelled_tour(&conn, changes)?;
    tracing::info!(cancelled_tour_id = tour.id, "cancellation recorded");
    created("Cancelled tour created successfully", tour.view())
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let tour = find_cancelled_tour(&conn, id)?.ok_or_else(|| not_found(id))?;
    ok("Cancelled tour retrieved successfully", tour.view())
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_cancelled_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let changes = validate(&input, true)?;
    let tour = update_cancelled_tour(&conn, id, changes)?.ok_or_else(|| not_found(id))?;
    ok("Cancelled tour updated successfully", tour.view())
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if !delete_cancelled_tour(&conn, id)? {
        return Err(not_found(id));
    }
    tracing::info!(cancelled_tour_id = id, "cancelled tour deleted");
    done("Cancelled tour deleted successfully")
}

#[instrument(skip(state, input))]
pub async fn refund_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_cancelled_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let mut v = Validator::new(&input.fields);
    let status = v.one_of("refund_status", Presence::Required, &REFUND_STATUSES);
    v.finish()?;

    let tour =
        set_refund_status(&conn, id, status.present().as_deref())?.ok_or_else(|| not_found(id))?;
    ok(
        "Refund status updated successfully",
        json!({
            "id": tour.id,
            "refund_status": tour.refund_status,
            "refund_status_display": tour.refund_status,
        }),
    )
}
