//! Vantripper back office: a REST API over the main, invoice and terms form
//! databases.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod storage;
pub mod utils;
pub mod validation;

pub use api::{build_router, AppState};
pub use config::AppConfig;
pub use error::{BackofficeError, Result};
