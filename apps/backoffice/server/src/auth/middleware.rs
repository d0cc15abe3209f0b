//! Bearer token middleware

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use super::token::authenticate;
use crate::api::AppState;
use crate::db::models::User;
use crate::error::BackofficeError;

/// The authenticated account, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token_id: i64,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim().to_string()).filter(|t| !t.is_empty())
}

/// Reject requests without a valid, unexpired token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackofficeError> {
    let bearer = bearer_token(request.headers()).ok_or(BackofficeError::Unauthenticated)?;

    let resolved = {
        let conn = state.dbs.main.lock()?;
        authenticate(&conn, &bearer)?
    };
    let (user, token_id) = resolved.ok_or(BackofficeError::Unauthenticated)?;

    tracing::trace!(user_id = user.id, token_id, "authenticated request");
    request.extensions_mut().insert(AuthUser { user, token_id });
    Ok(next.run(request).await)
}

/// Layered inside [`require_auth`]; rejects non-admin accounts.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, BackofficeError> {
    let is_admin = request
        .extensions()
        .get::<AuthUser>()
        .map(|auth| auth.user.is_admin)
        .ok_or(BackofficeError::Unauthenticated)?;
    if !is_admin {
        return Err(BackofficeError::forbidden("Admin access required."));
    }
    Ok(next.run(request).await)
}
