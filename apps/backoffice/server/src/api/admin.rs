//! Account approval, admin only

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde_json::json;
use tracing::instrument;

use super::response::ok;
use super::AppState;
use crate::db::models::{param, UserListParams};
use crate::db::repository::{approve_user, find_user_by_id, list_users, verify_user_email};
use crate::error::{BackofficeError, Result};

#[instrument(skip(state), level = "debug")]
pub async fn users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    let users = list_users(&conn, param(&params.status))?;
    ok("Users retrieved successfully", json!({ "users": users }))
}

#[instrument(skip(state))]
pub async fn approve(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    if !approve_user(&conn, id)? {
        return Err(BackofficeError::not_found("User", id));
    }
    let user = find_user_by_id(&conn, id)?.ok_or_else(|| BackofficeError::not_found("User", id))?;
    tracing::info!(user_id = id, "user approved");
    ok("User approved successfully", json!({ "user": user }))
}

#[instrument(skip(state))]
pub async fn verify(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    if !verify_user_email(&conn, id)? {
        return Err(BackofficeError::not_found("User", id));
    }
    let user = find_user_by_id(&conn, id)?.ok_or_else(|| BackofficeError::not_found("User", id))?;
    tracing::info!(user_id = id, "user email verified");
    ok("User email verified successfully", json!({ "user": user }))
}
