//! Personal access tokens
//!
//! The plaintext token is `<id>|<secret>` and is shown to the client once.
//! Only the SHA-256 digest of the secret is stored.

use chrono::{Duration, Utc};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::db::models::User;
use crate::db::repository::{find_token, find_user_by_id, insert_token, touch_token};
use crate::error::Result;

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id: i64,
    pub plain_text: String,
}

fn digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

fn new_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub fn issue_token(
    conn: &Connection,
    user_id: i64,
    name: &str,
    ttl_days: i64,
) -> Result<IssuedToken> {
    let secret = new_secret();
    let expires_at = Utc::now() + Duration::days(ttl_days);
    let id = insert_token(conn, user_id, name, &digest(&secret), expires_at)?;
    Ok(IssuedToken {
        id,
        plain_text: format!("{id}|{secret}"),
    })
}

/// Resolve a bearer token to its user and token id.
///
/// Unknown, tampered and expired tokens all give `None`.
pub fn authenticate(conn: &Connection, bearer: &str) -> Result<Option<(User, i64)>> {
    let Some((id, secret)) = bearer.split_once('|') else {
        return Ok(None);
    };
    let Ok(id) = id.parse::<i64>() else {
        return Ok(None);
    };
    let Some(token) = find_token(conn, id)? else {
        return Ok(None);
    };

    let matches: bool = digest(secret).as_bytes().ct_eq(token.token.as_bytes()).into();
    if !matches || token.is_expired(Utc::now()) {
        return Ok(None);
    }

    touch_token(conn, token.id)?;
    Ok(find_user_by_id(conn, token.user_id)?.map(|user| (user, token.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewUser;
    use crate::db::repository::create_user;
    use crate::db::{create_test_connection, Tenant};

    fn user(conn: &Connection) -> User {
        create_user(
            conn,
            &NewUser {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password_hash: "x".to_string(),
                is_admin: false,
                is_approved: true,
                verified: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_authenticate() {
        let conn = create_test_connection(Tenant::Main);
        let user = user(&conn);
        let issued = issue_token(&conn, user.id, "api-client", 7).unwrap();
        assert!(issued.plain_text.starts_with(&format!("{}|", issued.id)));

        let (found, token_id) = authenticate(&conn, &issued.plain_text).unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(token_id, issued.id);
        assert!(find_token(&conn, token_id)
            .unwrap()
            .unwrap()
            .last_used_at
            .is_some());
    }

    #[test]
    fn test_rejects_tampered_and_malformed() {
        let conn = create_test_connection(Tenant::Main);
        let user = user(&conn);
        let issued = issue_token(&conn, user.id, "api-client", 7).unwrap();

        let tampered = format!("{}|{}", issued.id, new_secret());
        assert!(authenticate(&conn, &tampered).unwrap().is_none());
        assert!(authenticate(&conn, "garbage").unwrap().is_none());
        assert!(authenticate(&conn, "x|y").unwrap().is_none());
        assert!(authenticate(&conn, "999|y").unwrap().is_none());
    }

    #[test]
    fn test_rejects_expired() {
        let conn = create_test_connection(Tenant::Main);
        let user = user(&conn);
        let issued = issue_token(&conn, user.id, "api-client", 7).unwrap();
        conn.execute(
            "UPDATE personal_access_tokens SET expires_at = ?1 WHERE id = ?2",
            rusqlite::params![(Utc::now() - Duration::days(1)).to_rfc3339(), issued.id],
        )
        .unwrap();

        assert!(authenticate(&conn, &issued.plain_text).unwrap().is_none());
    }
}
