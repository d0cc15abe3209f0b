//! Account authentication
//!
//! Accounts must have a verified e-mail and be approved by an admin before
//! they can log in. A login revokes every earlier token of the account.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{require_admin, require_auth, AuthUser};
pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
pub use token::{authenticate, issue_token, IssuedToken};

use rusqlite::Connection;

use crate::db::models::{NewUser, User, UserCredentials};
use crate::db::repository::{create_user, delete_user_tokens};
use crate::error::{BackofficeError, Result};

pub const DEFAULT_DEVICE_NAME: &str = "api-client";

pub const UNVERIFIED_MESSAGE: &str = "Please verify your email address before logging in.";
pub const UNAPPROVED_MESSAGE: &str = "Your account is pending admin approval.";

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: IssuedToken,
}

/// Create an unapproved, unverified account from an already hashed password.
pub fn register(conn: &Connection, name: &str, email: &str, password_hash: String) -> Result<User> {
    let user = create_user(
        conn,
        &NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            is_admin: false,
            is_approved: false,
            verified: false,
        },
    )?;
    tracing::info!(user_id = user.id, email = %user.email, "new user registration");
    Ok(user)
}

/// The account behind `credentials` when `password_ok`, else invalid credentials.
pub fn accept_credentials(
    email: &str,
    credentials: Option<UserCredentials>,
    password_ok: bool,
) -> Result<User> {
    match credentials {
        Some(c) if password_ok => Ok(c.user),
        _ => {
            tracing::warn!(email, "failed login attempt");
            Err(BackofficeError::InvalidCredentials)
        }
    }
}

/// Verified e-mail and admin approval gates.
pub fn ensure_can_log_in(user: &User) -> Result<()> {
    if !user.has_verified_email() {
        tracing::info!(user_id = user.id, email = %user.email, "login attempt with unverified email");
        return Err(BackofficeError::forbidden(UNVERIFIED_MESSAGE));
    }
    if !user.is_approved {
        tracing::info!(user_id = user.id, email = %user.email, "login attempt by unapproved user");
        return Err(BackofficeError::forbidden(UNAPPROVED_MESSAGE));
    }
    Ok(())
}

/// Replace every token of `user` with a new one.
pub fn start_session(
    conn: &Connection,
    user: User,
    device_name: &str,
    ttl_days: i64,
) -> Result<LoginOutcome> {
    let revoked = delete_user_tokens(conn, user.id)?;
    let token = issue_token(conn, user.id, device_name, ttl_days)?;
    tracing::info!(user_id = user.id, device_name, revoked, "successful login");
    Ok(LoginOutcome { user, token })
}
