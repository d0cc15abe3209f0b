//! Tour operations trackers under `/api/tour-operations`

mod cancelled;
mod completed;
mod domestic;
mod luzon;

use axum::routing::{get, patch};
use axum::Router;

use super::AppState;
use crate::db::models::Field;
use crate::validation::Presence;

const PER_PAGE: u64 = 15;

fn presence(updating: bool) -> Presence {
    if updating {
        Presence::Sometimes
    } else {
        Presence::Required
    }
}

/// A null sent for a NOT NULL column leaves it unchanged.
fn keep_on_null<T>(field: &mut Field<T>) {
    if matches!(field, Field::Null) {
        *field = Field::Missing;
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/completed", get(completed::index).post(completed::store))
        .route(
            "/completed/{id}",
            get(completed::show)
                .put(completed::update)
                .delete(completed::destroy),
        )
        .route(
            "/completed/{id}/followup-status",
            patch(completed::followup_status),
        )
        .route("/completed/{id}/tail-end", patch(completed::tail_end))
        .route("/cancelled", get(cancelled::index).post(cancelled::store))
        .route(
            "/cancelled/{id}",
            get(cancelled::show)
                .put(cancelled::update)
                .delete(cancelled::destroy),
        )
        .route(
            "/cancelled/{id}/refund-status",
            patch(cancelled::refund_status),
        )
        .route("/domestic", get(domestic::index).post(domestic::store))
        .route(
            "/domestic/{id}",
            get(domestic::show)
                .put(domestic::update)
                .delete(domestic::destroy),
        )
        .route("/domestic/{id}/status", patch(domestic::status))
        .route("/luzon-joiners", get(luzon::index).post(luzon::store))
        .route(
            "/luzon-joiners/{id}",
            get(luzon::show).put(luzon::update).delete(luzon::destroy),
        )
        .route("/luzon-joiners/{id}/status", patch(luzon::status))
}
