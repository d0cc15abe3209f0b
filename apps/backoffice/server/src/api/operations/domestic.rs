//! Domestic tours
//!
//! Booking checklist flags are stored as `YES`/`NO` and exposed as booleans.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::{presence, PER_PAGE};
use crate::api::response::{created, done, ok};
use crate::api::upload::FormInput;
use crate::api::AppState;
use crate::db::models::{DomesticTourListParams, PAYMENT_STATUSES};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_domestic_tour, delete_domestic_tour, find_domestic_tour, paginate_domestic_tours,
    set_domestic_tour_status, update_domestic_tour, DomesticTourChanges,
};
use crate::error::{BackofficeError, Result};
use crate::utils::format::ucfirst;
use crate::validation::{Presence, Validator};

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Domestic tour", id)
}

fn validate(input: &FormInput, updating: bool) -> Result<DomesticTourChanges> {
    let required = presence(updating);
    let mut v = Validator::new(&input.fields);
    let changes = DomesticTourChanges {
        travel_dates: v.string("travel_dates", required, 100),
        destination: v.string("destination", required, 255),
        days: v.integer("days", required, Some(1)),
        pax: v.integer("pax", required, Some(1)),
        lead_guest: v.string("lead_guest", required, 255),
        contact: v.string("contact", required, 100),
        pickup_details: v.text("pickup_details", Presence::Nullable),
        balance: v.decimal("balance", Presence::Nullable, Some(0.0)),
        payment_status: v.one_of("payment_status", required, &PAYMENT_STATUSES),
        accommodation: v.string("accommodation", Presence::Nullable, 255),
        booked_accommodation: v.boolean("booked_accommodation", Presence::Nullable),
        coordinated_with_supplier: v.boolean("coordinated_with_supplier", Presence::Nullable),
        hotel_balance: v.decimal("hotel_balance", Presence::Nullable, Some(0.0)),
        transfer_details_sent: v.boolean("transfer_details_sent", Presence::Nullable),
        handled_by: v.string("handled_by", Presence::Nullable, 255),
        status: v.string("status", required, 50),
        notes: v.text("notes", Presence::Nullable),
    };
    v.finish()?;
    Ok(changes)
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<DomesticTourListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let conn = state.dbs.invoice.lock()?;
    let page = paginate_domestic_tours(&conn, &params, request)?;
    ok("Domestic tours retrieved successfully", page.map(|t| t.view()))
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let changes = validate(&input, false)?;
    let conn = state.dbs.invoice.lock()?;
    let tour = create_domestic_tour(&conn, changes)?;
    tracing::info!(domestic_tour_id = tour.id, "domestic tour booked");
    created("Domestic tour created successfully", tour.view())
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let tour = find_domestic_tour(&conn, id)?.ok_or_else(|| not_found(id))?;
    ok("Domestic tour retrieved successfully", tour.view())
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_domestic_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let changes = validate(&input, true)?;
    let tour = update_domestic_tour(&conn, id, changes)?.ok_or_else(|| not_found(id))?;
    ok("Domestic tour updated successfully", tour.view())
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if !delete_domestic_tour(&conn, id)? {
        return Err(not_found(id));
    }
    tracing::info!(domestic_tour_id = id, "domestic tour deleted");
    done("Domestic tour deleted successfully")
}

#[instrument(skip(state, input))]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_domestic_tour(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let mut v = Validator::new(&input.fields);
    let status = v.string("status", Presence::Required, 50);
    v.finish()?;
    let Some(status) = status.present() else {
        return Err(BackofficeError::validation("status", "The status field is required."));
    };

    let tour = set_domestic_tour_status(&conn, id, &status)?.ok_or_else(|| not_found(id))?;
    ok(
        "Tour status updated successfully",
        json!({
            "id": tour.id,
            "status": tour.status,
            "status_display": ucfirst(&tour.status),
        }),
    )
}
