use rusqlite::{Connection, Result};

use super::Tenant;

/// Run all pending migrations for one tenant database
pub fn run_migrations(conn: &Connection, tenant: Tenant) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    let current_version = get_current_version(conn)?;

    match tenant {
        Tenant::Main => {
            if current_version < 1 {
                migrate_main_v1(conn)?;
                set_version(conn, 1)?;
            }
        }
        Tenant::Invoice => {
            if current_version < 1 {
                migrate_invoice_v1(conn)?;
                set_version(conn, 1)?;
            }
        }
        Tenant::Tnc => {
            if current_version < 1 {
                migrate_tnc_v1(conn)?;
                set_version(conn, 1)?;
            }
        }
    }

    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<i32> {
    let result: Result<i32, _> = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    );
    Ok(result.unwrap_or(0))
}

/// Set the schema version after a successful migration
fn set_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    conn.prepare(&format!("PRAGMA table_info({table})"))?
        .query_map([], |row| row.get::<_, String>(1))?
        .collect()
}

/// Migration v1 (main): approval and admin flags on users.
/// Accounts that predate the flags are approved and verified.
fn migrate_main_v1(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "users")?;

    if !columns.contains(&"is_admin".to_string()) {
        conn.execute_batch("ALTER TABLE users ADD COLUMN is_admin INTEGER NOT NULL DEFAULT 0;")?;
    }

    if !columns.contains(&"is_approved".to_string()) {
        conn.execute_batch(
            "ALTER TABLE users ADD COLUMN is_approved INTEGER NOT NULL DEFAULT 0;",
        )?;
        conn.execute_batch(
            r#"
            UPDATE users SET
                is_approved = 1,
                email_verified_at = COALESCE(email_verified_at, datetime('now')),
                name = COALESCE(NULLIF(name, ''), email)
            "#,
        )?;
    }

    Ok(())
}

/// Migration v1 (invoice): keep the uploaded PDF's original file name.
fn migrate_invoice_v1(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "terms_and_conditions")?;

    if !columns.contains(&"pdf_file_name".to_string()) {
        conn.execute_batch("ALTER TABLE terms_and_conditions ADD COLUMN pdf_file_name TEXT;")?;
    }

    Ok(())
}

/// Migration v1 (tnc): soft archive for submissions.
fn migrate_tnc_v1(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "submissions")?;

    if !columns.contains(&"archived".to_string()) {
        conn.execute_batch(
            r#"
            ALTER TABLE submissions ADD COLUMN archived INTEGER NOT NULL DEFAULT 0;
            CREATE INDEX IF NOT EXISTS idx_submissions_archived ON submissions(archived);
            "#,
        )?;
    }

    Ok(())
}
