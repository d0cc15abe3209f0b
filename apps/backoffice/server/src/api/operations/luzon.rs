//! Luzon joiner tours

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::{presence, PER_PAGE};
use crate::api::response::{created, done, ok};
use crate::api::upload::FormInput;
use crate::api::AppState;
use crate::db::models::{LuzonJoinerListParams, COORDINATOR_OPTIONS, PAYMENT_STATUSES};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_luzon_joiner, delete_luzon_joiner, find_luzon_joiner, paginate_luzon_joiners,
    set_luzon_joiner_status, update_luzon_joiner, LuzonJoinerChanges,
};
use crate::error::{BackofficeError, Result};
use crate::utils::format::ucfirst;
use crate::validation::{Presence, Validator};

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Luzon joiner tour", id)
}

fn validate(input: &FormInput, updating: bool) -> Result<LuzonJoinerChanges> {
    let required = presence(updating);
    let mut v = Validator::new(&input.fields);
    let changes = LuzonJoinerChanges {
        travel_dates: v.string("travel_dates", required, 100),
        destination: v.string("destination", required, 255),
        days: v.integer("days", required, Some(1)),
        pax: v.integer("pax", required, Some(1)),
        with_coordinator: v.one_of("with_coordinator", required, &COORDINATOR_OPTIONS),
        lead_guest: v.string("lead_guest", required, 255),
        contact: v.string("contact", required, 100),
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
    };
    v.finish()?;
    Ok(changes)
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<LuzonJoinerListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let conn = state.dbs.invoice.lock()?;
    let page = paginate_luzon_joiners(&conn, &params, request)?;
    ok("Luzon joiner tours retrieved successfully", page.map(|t| t.view()))
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let changes = validate(&input, false)?;
    let conn = state.dbs.invoice.lock()?;
    let joiner = create_luzon_joiner(&conn, changes)?;
    tracing::info!(luzon_joiner_id = joiner.id, "luzon joiner booked");
    created("Luzon joiner tour created successfully", joiner.view())
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    let joiner = find_luzon_joiner(&conn, id)?.ok_or_else(|| not_found(id))?;
    ok("Luzon joiner tour retrieved successfully", joiner.view())
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_luzon_joiner(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let changes = validate(&input, true)?;
    let joiner = update_luzon_joiner(&conn, id, changes)?.ok_or_else(|| not_found(id))?;
    ok("Luzon joiner tour updated successfully", joiner.view())
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if !delete_luzon_joiner(&conn, id)? {
        return Err(not_found(id));
    }
    tracing::info!(luzon_joiner_id = id, "luzon joiner deleted");
    done("Luzon joiner tour deleted successfully")
}

#[instrument(skip(state, input))]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.invoice.lock()?;
    if find_luzon_joiner(&conn, id)?.is_none() {
        return Err(not_found(id));
    }
    let mut v = Validator::new(&input.fields);
    let status = v.string("status", Presence::Required, 50);
    v.finish()?;
    let Some(status) = status.present() else {
        return Err(BackofficeError::validation("status", "The status field is required."));
    };

    let joiner = set_luzon_joiner_status(&conn, id, &status)?.ok_or_else(|| not_found(id))?;
    ok(
        "Tour status updated successfully",
        json!({
            "id": joiner.id,
            "status": joiner.status,
            "status_display": ucfirst(&joiner.status),
        }),
    )
}
