//! Account endpoints

use axum::extract::State;
use axum::response::Response;
use axum::Extension;
use serde_json::json;
use tracing::instrument;

use super::response::{created, done, ok};
use super::upload::FormInput;
use super::AppState;
use crate::auth::{self, issue_token, AuthUser, DEFAULT_DEVICE_NAME};
use crate::db::repository::{
    delete_token, delete_user_tokens, email_taken, find_token, find_user_credentials,
};
use crate::error::{BackofficeError, Result};
use crate::validation::{Presence, Validator};

#[instrument(skip_all)]
pub async fn register(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let mut v = Validator::new(&input.fields);
    let name = v.string("name", Presence::Required, 255);
    let email = v.email("email", Presence::Required, 255);
    let password = v.string("password", Presence::Required, 255);
    v.min_length("password", &password, 8);
    if !v.has_error("password") {
        v.confirmed("password");
    }

    if let Some(email) = email.as_ref().present() {
        let conn = state.dbs.main.lock()?;
        if email_taken(&conn, email)? {
            v.taken("email");
        }
    }
    v.finish()?;

    let (Some(name), Some(email), Some(password)) =
        (name.present(), email.present(), password.present())
    else {
        return Err(BackofficeError::bad_request("Incomplete registration."));
    };
    let password_hash = auth::hash_password_blocking(password).await?;

    let user = {
        let conn = state.dbs.main.lock()?;
        // another registration may have claimed the address while hashing
        if email_taken(&conn, &email)? {
            return Err(BackofficeError::validation(
                "email",
                "The email has already been taken.",
            ));
        }
        auth::register(&conn, &name, &email, password_hash)?
    };

    created(
        "Registration successful. Please verify your email and wait for admin approval.",
        json!({
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "email_verified_at": user.email_verified_at,
                "is_approved": user.is_approved,
            }
        }),
    )
}

#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let mut v = Validator::new(&input.fields);
    let email = v.email("email", Presence::Required, 255);
    let password = v.text("password", Presence::Required);
    let device_name = v.string("device_name", Presence::Nullable, 255);
    v.finish()?;

    let (Some(email), Some(password)) = (email.present(), password.present()) else {
        return Err(BackofficeError::InvalidCredentials);
    };
    let device_name = device_name
        .present()
        .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());

    let credentials = {
        let conn = state.dbs.main.lock()?;
        find_user_credentials(&conn, &email)?
    };
    let stored = credentials.as_ref().map(|c| c.password_hash.clone());
    let password_ok = auth::verify_password_blocking(password, stored).await?;
    let user = auth::accept_credentials(&email, credentials, password_ok)?;
    auth::ensure_can_log_in(&user)?;

    let outcome = {
        let conn = state.dbs.main.lock()?;
        auth::start_session(&conn, user, &device_name, state.config.token_ttl_days)?
    };
    let user = outcome.user;

    ok(
        "Login successful",
        json!({
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "is_admin": user.is_admin,
            },
            "token": outcome.token.plain_text,
            "token_type": "Bearer",
            "expires_in": state.config.token_ttl_label(),
        }),
    )
}

pub async fn profile(Extension(auth): Extension<AuthUser>) -> Result<Response> {
    let user = auth.user;
    ok(
        "Profile retrieved successfully",
        json!({
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "email_verified_at": user.email_verified_at,
                "created_at": user.created_at,
                "updated_at": user.updated_at,
            }
        }),
    )
}

/// The authenticated account as stored.
pub async fn user(Extension(auth): Extension<AuthUser>) -> axum::Json<crate::db::models::User> {
    axum::Json(auth.user)
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response> {
    {
        let conn = state.dbs.main.lock()?;
        delete_token(&conn, auth.token_id)?;
    }
    tracing::info!(user_id = auth.user.id, "user logged out");
    done("Logged out successfully")
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response> {
    let revoked = {
        let conn = state.dbs.main.lock()?;
        delete_user_tokens(&conn, auth.user.id)?
    };
    tracing::info!(user_id = auth.user.id, revoked, "user logged out from all devices");
    done("Logged out from all devices successfully")
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response> {
    let token = {
        let conn = state.dbs.main.lock()?;
        let name = find_token(&conn, auth.token_id)?
            .map(|t| t.name)
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());
        let token = issue_token(&conn, auth.user.id, &name, state.config.token_ttl_days)?;
        delete_token(&conn, auth.token_id)?;
        token
    };
    tracing::info!(user_id = auth.user.id, "token refreshed");

    ok(
        "Token refreshed successfully",
        json!({
            "token": token.plain_text,
            "token_type": "Bearer",
            "expires_in": state.config.token_ttl_label(),
        }),
    )
}
