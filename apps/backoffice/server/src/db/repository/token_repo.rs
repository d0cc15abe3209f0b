//! Repository for personal access tokens

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::timestamp;
use crate::db::models::{now_timestamp, parse_timestamp, PersonalAccessToken};
use crate::error::{BackofficeError, Result};

/// Store a token digest and return the new token id
pub fn insert_token(
    conn: &Connection,
    user_id: i64,
    name: &str,
    digest: &str,
    expires_at: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO personal_access_tokens (user_id, name, token, expires_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![user_id, name, digest, expires_at.to_rfc3339(), now_timestamp()],
    )
    .map_err(BackofficeError::Database)?;
    Ok(conn.last_insert_rowid())
}

pub fn find_token(conn: &Connection, id: i64) -> Result<Option<PersonalAccessToken>> {
    let sql = r#"
        SELECT id, user_id, name, token, last_used_at, expires_at, created_at
        FROM personal_access_tokens
        WHERE id = ?1
    "#;

    conn.query_row(sql, [id], |row| {
        Ok(PersonalAccessToken {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            token: row.get(3)?,
            last_used_at: timestamp(row.get(4)?),
            expires_at: timestamp(row.get(5)?),
            created_at: parse_timestamp(&row.get::<_, String>(6)?),
        })
    })
    .optional()
    .map_err(BackofficeError::Database)
}

/// Record that a token was just used
pub fn touch_token(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE personal_access_tokens SET last_used_at = ?1 WHERE id = ?2",
        params![now_timestamp(), id],
    )
    .map_err(BackofficeError::Database)?;
    Ok(())
}

pub fn delete_token(conn: &Connection, id: i64) -> Result<bool> {
    super::delete_row(conn, "personal_access_tokens", id)
}

/// Revoke every token of a user. Returns how many were removed.
pub fn delete_user_tokens(conn: &Connection, user_id: i64) -> Result<usize> {
    conn.execute(
        "DELETE FROM personal_access_tokens WHERE user_id = ?1",
        [user_id],
    )
    .map_err(BackofficeError::Database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_connection;
    use crate::db::models::NewUser;
    use crate::db::repository::create_user;
    use crate::db::Tenant;
    use chrono::Duration;

    fn user(conn: &Connection) -> i64 {
        create_user(
            conn,
            &NewUser {
                name: "Token Owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
                is_admin: false,
                is_approved: true,
                verified: true,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_insert_find_touch() {
        let conn = create_test_connection(Tenant::Main);
        let user_id = user(&conn);
        let expires = Utc::now() + Duration::days(7);

        let id = insert_token(&conn, user_id, "api-client", "abc123", expires).unwrap();
        touch_token(&conn, id).unwrap();

        let token = find_token(&conn, id).unwrap().unwrap();
        assert_eq!(token.token, "abc123");
        assert_eq!(token.name, "api-client");
        assert!(token.last_used_at.is_some());
        assert!(!token.is_expired(Utc::now()));
    }

    #[test]
    fn test_revoke_tokens() {
        let conn = create_test_connection(Tenant::Main);
        let user_id = user(&conn);
        let expires = Utc::now() + Duration::days(1);
        let first = insert_token(&conn, user_id, "a", "d1", expires).unwrap();
        insert_token(&conn, user_id, "b", "d2", expires).unwrap();

        assert!(delete_token(&conn, first).unwrap());
        assert_eq!(delete_user_tokens(&conn, user_id).unwrap(), 1);
        assert!(find_token(&conn, first).unwrap().is_none());
    }
}
