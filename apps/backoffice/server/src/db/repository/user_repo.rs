//! Repository for back office accounts

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::timestamp;
use crate::db::models::{now_timestamp, NewUser, User, UserCredentials};
use crate::error::{BackofficeError, Result};

const USER_SELECT: &str = r#"
    SELECT id, name, email, email_verified_at, is_admin, is_approved, created_at, updated_at
    FROM users
"#;

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        email_verified_at: timestamp(row.get(3)?),
        is_admin: row.get(4)?,
        is_approved: row.get(5)?,
        created_at: timestamp(row.get(6)?),
        updated_at: timestamp(row.get(7)?),
    })
}

/// Find a user by ID
pub fn find_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(&format!("{USER_SELECT} WHERE id = ?1"), [id], map_user)
        .optional()
        .map_err(BackofficeError::Database)
}

/// Find a user and their password hash by e-mail, for login
pub fn find_user_credentials(conn: &Connection, email: &str) -> Result<Option<UserCredentials>> {
    let sql = r#"
        SELECT id, name, email, email_verified_at, is_admin, is_approved, created_at, updated_at,
               password
        FROM users
        WHERE email = ?1 COLLATE NOCASE
    "#;

    conn.query_row(sql, [email], |row| {
        Ok(UserCredentials {
            user: map_user(row)?,
            password_hash: row.get(8)?,
        })
    })
    .optional()
    .map_err(BackofficeError::Database)
}

pub fn email_taken(conn: &Connection, email: &str) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE",
        [email],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(BackofficeError::Database)
}

/// Create an account
pub fn create_user(conn: &Connection, new_user: &NewUser) -> Result<User> {
    let now = now_timestamp();
    let verified_at = new_user.verified.then(|| now.clone());

    conn.execute(
        r#"
        INSERT INTO users (name, email, email_verified_at, password, is_admin, is_approved, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
        params![
            new_user.name,
            new_user.email,
            verified_at,
            new_user.password_hash,
            new_user.is_admin,
            new_user.is_approved,
            now,
        ],
    )
    .map_err(BackofficeError::Database)?;

    let id = conn.last_insert_rowid();
    find_user_by_id(conn, id)?.ok_or_else(|| BackofficeError::not_found("User", id))
}

/// List users, optionally only `pending` or `approved` ones, newest first
pub fn list_users(conn: &Connection, status: Option<&str>) -> Result<Vec<User>> {
    let filter = match status {
        Some("pending") => " WHERE is_approved = 0",
        Some("approved") => " WHERE is_approved = 1",
        _ => "",
    };
    let mut stmt = conn
        .prepare(&format!("{USER_SELECT}{filter} ORDER BY created_at DESC, id DESC"))
        .map_err(BackofficeError::Database)?;

    let users = stmt
        .query_map([], map_user)
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(users)
}

/// Mark a user approved. Returns false when the user does not exist.
pub fn approve_user(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE users SET is_approved = 1, updated_at = ?1 WHERE id = ?2",
            params![now_timestamp(), id],
        )
        .map_err(BackofficeError::Database)?;
    Ok(changed > 0)
}

/// Mark a user's e-mail verified, keeping an earlier verification time.
pub fn verify_user_email(conn: &Connection, id: i64) -> Result<bool> {
    let now = now_timestamp();
    let changed = conn
        .execute(
            r#"
            UPDATE users
            SET email_verified_at = COALESCE(email_verified_at, ?1), updated_at = ?1
            WHERE id = ?2
            "#,
            params![now, id],
        )
        .map_err(BackofficeError::Database)?;
    Ok(changed > 0)
}

/// Create the configured admin account, or promote it if it already exists.
pub fn ensure_admin(conn: &Connection, email: &str, password_hash: &str) -> Result<User> {
    if let Some(existing) = find_user_credentials(conn, email)? {
        let now = now_timestamp();
        conn.execute(
            r#"
            UPDATE users
            SET is_admin = 1, is_approved = 1,
                email_verified_at = COALESCE(email_verified_at, ?1), updated_at = ?1
            WHERE id = ?2
            "#,
            params![now, existing.user.id],
        )
        .map_err(BackofficeError::Database)?;
        return find_user_by_id(conn, existing.user.id)?
            .ok_or_else(|| BackofficeError::not_found("User", existing.user.id));
    }

    create_user(
        conn,
        &NewUser {
            name: "Administrator".to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_admin: true,
            is_approved: true,
            verified: true,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_connection, Tenant};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana Cruz".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
            is_approved: false,
            verified: false,
        }
    }

    #[test]
    fn test_create_and_find_user() {
        let conn = create_test_connection(Tenant::Main);
        let user = create_user(&conn, &new_user("ana@example.com")).unwrap();

        assert_eq!(user.name.as_deref(), Some("Ana Cruz"));
        assert!(!user.is_approved);
        assert!(!user.has_verified_email());

        let creds = find_user_credentials(&conn, "ANA@example.com").unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "hash");
        assert!(email_taken(&conn, "ana@example.com").unwrap());
    }

    #[test]
    fn test_approve_verify_and_list() {
        let conn = create_test_connection(Tenant::Main);
        let pending = create_user(&conn, &new_user("a@example.com")).unwrap();
        let other = create_user(&conn, &new_user("b@example.com")).unwrap();

        assert!(approve_user(&conn, other.id).unwrap());
        assert!(verify_user_email(&conn, other.id).unwrap());
        assert!(!approve_user(&conn, 999).unwrap());

        let pending_list = list_users(&conn, Some("pending")).unwrap();
        assert_eq!(pending_list.len(), 1);
        assert_eq!(pending_list[0].id, pending.id);

        let approved = find_user_by_id(&conn, other.id).unwrap().unwrap();
        assert!(approved.is_approved && approved.has_verified_email());
        assert_eq!(list_users(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn test_ensure_admin_promotes_existing_user() {
        let conn = create_test_connection(Tenant::Main);
        let user = create_user(&conn, &new_user("boss@example.com")).unwrap();

        let admin = ensure_admin(&conn, "boss@example.com", "other-hash").unwrap();
        assert_eq!(admin.id, user.id);
        assert!(admin.is_admin && admin.is_approved && admin.has_verified_email());

        let fresh = ensure_admin(&conn, "root@example.com", "hash").unwrap();
        assert!(fresh.is_admin);
    }
}
