pub mod migrations;
pub mod models;
pub mod queries;
pub mod repository;
pub mod schema;

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::error::Result;

/// The three databases the back office spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenant {
    /// Accounts, tokens and the tour catalogue
    Main,
    /// Invoicing, legal documents and tour operations
    Invoice,
    /// Customer terms form
    Tnc,
}

impl Tenant {
    pub fn name(self) -> &'static str {
        match self {
            Tenant::Main => "main",
            Tenant::Invoice => "invoice",
            Tenant::Tnc => "tnc",
        }
    }

    fn init_schema(self, conn: &Connection) -> rusqlite::Result<()> {
        match self {
            Tenant::Main => schema::init_database_main(conn),
            Tenant::Invoice => schema::init_database_invoice(conn),
            Tenant::Tnc => schema::init_database_tnc(conn),
        }
    }
}

pub struct Database {
    tenant: Tenant,
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path, tenant: Tenant) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        tracing::info!(tenant = tenant.name(), path = %path.display(), "opened database");
        Self::prepare(conn, tenant)
    }

    /// Fully initialized in-memory database, used by tests.
    pub fn in_memory(tenant: Tenant) -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?, tenant)
    }

    fn prepare(conn: Connection, tenant: Tenant) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // Initialize schema (creates tables if they don't exist)
        tenant.init_schema(&conn)?;

        // Run migrations for schema updates
        migrations::run_migrations(&conn, tenant)?;

        Ok(Self {
            tenant,
            conn: Mutex::new(conn),
        })
    }

    pub fn tenant(&self) -> Tenant {
        self.tenant
    }

    /// Lock the connection. Never hold the guard across an `.await`.
    ///
    /// A panic in another request poisons the mutex; the connection itself is
    /// still usable, so the guard is recovered instead of failing forever.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(tenant = self.tenant.name(), "recovering poisoned database lock");
            poisoned.into_inner()
        }))
    }
}

pub struct Databases {
    pub main: Database,
    pub invoice: Database,
    pub tnc: Database,
}

impl Databases {
    pub fn open(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            main: Database::open(&config.main_db, Tenant::Main)?,
            invoice: Database::open(&config.invoice_db, Tenant::Invoice)?,
            tnc: Database::open(&config.tnc_db, Tenant::Tnc)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            main: Database::in_memory(Tenant::Main)?,
            invoice: Database::in_memory(Tenant::Invoice)?,
            tnc: Database::in_memory(Tenant::Tnc)?,
        })
    }
}

/// Create an in-memory connection for one tenant with schema and migrations
/// applied, for repository unit tests.
#[cfg(test)]
pub fn create_test_connection(tenant: Tenant) -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .expect("Failed to enable foreign keys");
    tenant.init_schema(&conn).expect("Failed to initialize schema");
    migrations::run_migrations(&conn, tenant).expect("Failed to run migrations");
    conn
}
