//! HTTP surface
//!
//! Handlers are grouped per resource. Each one locks exactly the database it
//! needs for a synchronous block and never holds the guard across `.await`.

pub mod admin;
pub mod auth;
pub mod invoice_packages;
pub mod invoice_terms;
pub mod itineraries;
pub mod operations;
pub mod response;
pub mod submissions;
pub mod terms;
pub mod terms_questions;
pub mod tours;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_admin, require_auth};
use crate::config::AppConfig;
use crate::db::Databases;
use crate::error::BackofficeError;
use crate::storage::Storage;

/// Largest upload is 10 MiB; the rest is form overhead.
pub const BODY_LIMIT: usize = 12 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub dbs: Arc<Databases>,
    pub storage: Arc<Storage>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(dbs: Databases, storage: Storage, config: AppConfig) -> Self {
        Self {
            dbs: Arc::new(dbs),
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn fallback() -> BackofficeError {
    BackofficeError::not_found("Route", "")
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/up", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/terms-questions", get(terms_questions::index))
        .route("/api/terms-questions/packages", get(terms_questions::packages))
        .route("/api/submissions", post(submissions::store))
        .route(
            "/api/submissions/{id}/payment-receipt",
            post(submissions::upload_receipt),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(admin::users))
        .route("/api/admin/users/{id}/approve", post(admin::approve))
        .route("/api/admin/users/{id}/verify", post(admin::verify))
        .route_layer(from_fn(require_admin))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // accounts
        .route("/api/user", get(auth::user))
        .route("/api/logout", post(auth::logout_all))
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/logout-all", post(auth::logout_all))
        .route("/api/auth/refresh", post(auth::refresh))
        // invoice terms
        .route("/api/terms/get", get(invoice_terms::index))
        .route("/api/terms/create", post(invoice_terms::create))
        .route("/api/terms/edit", post(invoice_terms::edit))
        .route("/api/terms/delete/{id}", delete(invoice_terms::destroy))
        // invoice packages
        .route("/api/invoice-packages/get", get(invoice_packages::all))
        .route("/api/invoice-packages/paginated", get(invoice_packages::paginated))
        .route("/api/invoice-packages/create", post(invoice_packages::create))
        .route("/api/invoice-packages/edit", post(invoice_packages::edit))
        .route(
            "/api/invoice-packages/delete/{id}",
            delete(invoice_packages::delete_legacy),
        )
        .route(
            "/api/packages",
            get(invoice_packages::index).post(invoice_packages::store),
        )
        .route(
            "/api/packages/{id}",
            get(invoice_packages::show)
                .put(invoice_packages::update)
                .delete(invoice_packages::destroy),
        )
        // itineraries
        .route(
            "/api/itineraries",
            get(itineraries::index).post(itineraries::create),
        )
        .route("/api/itineraries/edit", post(itineraries::edit))
        .route(
            "/api/itineraries/categories",
            get(itineraries::categories).post(itineraries::create_category),
        )
        .route(
            "/api/itineraries/categories/{id}",
            delete(itineraries::delete_category),
        )
        .route("/api/itineraries/{id}", delete(itineraries::destroy))
        .route(
            "/api/subcategories",
            get(itineraries::subcategory_index).post(itineraries::subcategory_store),
        )
        .route(
            "/api/subcategories/{id}",
            get(itineraries::subcategory_show)
                .put(itineraries::subcategory_update)
                .delete(itineraries::subcategory_destroy),
        )
        // terms and conditions
        .route(
            "/api/terms-and-conditions",
            get(terms::index).post(terms::store),
        )
        .route("/api/terms-and-conditions/bulk-action", post(terms::bulk_action))
        .route(
            "/api/terms-and-conditions/{id}",
            get(terms::show)
                .put(terms::update)
                .post(terms::update)
                .delete(terms::destroy),
        )
        .route(
            "/api/terms-and-conditions/{id}/toggle-status",
            patch(terms::toggle_status),
        )
        .route("/api/terms-and-conditions/{id}/pdf", get(terms::pdf))
        // terms questions
        .route("/api/terms-questions", post(terms_questions::store))
        .route(
            "/api/terms-questions/{id}",
            get(terms_questions::show)
                .put(terms_questions::update)
                .delete(terms_questions::destroy),
        )
        // submissions
        .route("/api/submissions", get(submissions::index))
        .route(
            "/api/submissions/{id}",
            get(submissions::show)
                .put(submissions::update)
                .delete(submissions::destroy),
        )
        .route("/api/submissions/{id}/archive", post(submissions::archive))
        .route("/api/submissions/{id}/restore", post(submissions::restore))
        // tours
        .route("/api/tours", get(tours::index).post(tours::store))
        .route("/api/tours/destinations", get(tours::destinations))
        .route(
            "/api/tours/{id}",
            get(tours::show)
                .put(tours::update)
                .post(tours::update)
                .delete(tours::destroy),
        )
        .route("/api/tours/{id}/toggle-active", patch(tours::toggle_active))
        .route("/api/tours/{id}/toggle-featured", patch(tours::toggle_featured))
        // tour operations
        .nest("/api/tour-operations", operations::routes())
        .merge(admin_routes())
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// The complete application router.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.storage.root());

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .nest_service("/storage", static_files)
        .fallback(fallback)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
