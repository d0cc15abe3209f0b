//! Tour packages and destinations
//!
//! Create and update take JSON or multipart with an optional `image`.
//! Slugs are generated from the title when not supplied.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;
use tracing::instrument;

use super::response::{created, done, ok};
use super::upload::{check_file, FormInput, IMAGE_UPLOAD};
use super::AppState;
use crate::db::models::{Field, PackageType, Tour, TourListParams};
use crate::db::queries::PageRequest;
use crate::db::repository::{
    create_tour, delete_tour, destination_exists, find_tour, list_active_destinations,
    paginate_tours, slug_exists, toggle_tour_flag, unique_slug, update_tour, TourChanges,
    TourFlag,
};
use crate::error::{BackofficeError, Result};
use crate::storage::{Storage, StoredFile};
use crate::utils::format::slugify;
use crate::validation::{Presence, Validator};

const PER_PAGE: u64 = 15;
const IMAGE_DIR: &str = "tours";

fn not_found(id: i64) -> BackofficeError {
    BackofficeError::not_found("Tour", id)
}

/// A validated tour form
struct TourForm {
    changes: TourChanges,
    combined: Option<Vec<i64>>,
    image: Option<StoredFile>,
}

/// Validate the form against `current` (None when creating) and store the
/// image, if any.
fn accept(
    conn: &Connection,
    storage: &Storage,
    input: &FormInput,
    current: Option<&Tour>,
) -> Result<TourForm> {
    let required = if current.is_some() {
        Presence::Sometimes
    } else {
        Presence::Required
    };
    let except_id = current.map(|t| t.id);

    let mut v = Validator::new(&input.fields);
    let title = v.string("title", required, 255);
    let slug = v.string(
        "slug",
        if current.is_some() {
            Presence::Sometimes
        } else {
            Presence::Nullable
        },
        255,
    );
    if let Field::Present(slug) = &slug {
        if slug_exists(conn, slug, except_id)? {
            v.taken("slug");
        }
    }

    let destination_id = v.integer("destination_id", Presence::Nullable, None);
    if let Field::Present(id) = destination_id {
        if !destination_exists(conn, id)? {
            v.invalid_selection("destination_id");
        }
    }

    let package_type = v
        .one_of("package_type", required, &PackageType::ALL)
        .present()
        .and_then(|t| PackageType::parse(&t));

    let combined = v.integer_list("combined_destinations", Presence::Nullable);
    if let Field::Present(ids) = &combined {
        for (i, id) in ids.iter().enumerate() {
            if !destination_exists(conn, *id)? {
                v.invalid_selection(&format!("combined_destinations.{i}"));
            }
        }
    }
    let combined_given = matches!(&combined, Field::Present(ids) if !ids.is_empty());
    if current.is_none() && package_type == Some(PackageType::Combined) && !combined_given {
        v.fail(
            "combined_destinations",
            "The combined destinations field is required when package type is combined.",
        );
    }

    let mut changes = TourChanges {
        title,
        duration: v.string("duration", Presence::Nullable, 50),
        subtitle: v.string("subtitle", Presence::Nullable, 255),
        description: v.text("description", Presence::Nullable),
        inclusions: v.text("inclusions", Presence::Nullable),
        exclusions: v.text("exclusions", Presence::Nullable),
        destination_id,
        package_type: package_type.into(),
        tour_type: v.string("tour_type", Presence::Nullable, 100),
        frontend_category: v.string("frontend_category", Presence::Nullable, 100),
        image_alt: v.string("image_alt", Presence::Nullable, 255),
        active: v.boolean("active", Presence::Nullable),
        featured: v.boolean("featured", Presence::Nullable),
        display_order: v.integer("display_order", Presence::Nullable, Some(0)),
        ..Default::default()
    };
    let image = input.file("image");
    let kind = check_file(&mut v, "image", image, &IMAGE_UPLOAD, false);
    v.finish()?;

    // flags and ordering are NOT NULL columns
    for flag in [&mut changes.active, &mut changes.featured] {
        if matches!(flag, Field::Null) {
            *flag = Field::Missing;
        }
    }
    if matches!(changes.display_order, Field::Null) {
        changes.display_order = Field::Missing;
    }

    let title = changes
        .title
        .as_ref()
        .present()
        .cloned()
        .or_else(|| current.map(|t| t.title.clone()))
        .unwrap_or_default();

    changes.slug = match (slug, current) {
        (Field::Present(slug), _) => Field::Present(slug),
        (_, None) => Field::Present(unique_slug(conn, &slugify(&title), None)?),
        _ => Field::Missing,
    };
    if current.is_none() && !matches!(changes.image_alt, Field::Present(_)) {
        changes.image_alt = Field::Present(format!("{title} - Tour Package Image"));
    }

    let combined = match package_type {
        Some(PackageType::Combined) => combined.present(),
        _ => None,
    };

    let stored = match (image, kind) {
        (Some(file), Some(_)) => {
            let ext = file.extension().unwrap_or("jpg");
            let name = format!("{}_{}.{ext}", Utc::now().timestamp(), slugify(&title));
            let stored = storage.store_as(IMAGE_DIR, &name, &file.bytes)?;
            changes.image = Field::Present(stored.path.clone());
            Some(stored)
        }
        _ => None,
    };

    Ok(TourForm {
        changes,
        combined,
        image: stored,
    })
}

#[instrument(skip(state), level = "debug")]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<TourListParams>,
) -> Result<Response> {
    let request = PageRequest::from_params(&params.paging, PER_PAGE);
    let page = {
        let conn = state.dbs.main.lock()?;
        paginate_tours(&conn, &params, request)?
    };
    ok(
        "Tours retrieved successfully",
        page.map(|tour| tour.view(&state.storage)),
    )
}

#[instrument(skip_all, level = "debug")]
pub async fn destinations(State(state): State<AppState>) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    let destinations = list_active_destinations(&conn)?;
    ok("Destinations retrieved successfully", destinations)
}

#[instrument(skip_all)]
pub async fn store(State(state): State<AppState>, input: FormInput) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    let form = accept(&conn, &state.storage, &input, None)?;
    let tour = match create_tour(&conn, form.changes, form.combined.as_deref()) {
        Ok(tour) => tour,
        Err(e) => {
            if let Some(file) = &form.image {
                state.storage.delete_quietly(&file.path);
            }
            return Err(e);
        }
    };
    tracing::info!(
        tour_id = tour.tour.id,
        slug = %tour.tour.slug,
        combined = tour.combined.len(),
        "tour created"
    );
    created("Tour created successfully", tour.view(&state.storage))
}

#[instrument(skip(state), level = "debug")]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let tour = {
        let conn = state.dbs.main.lock()?;
        find_tour(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    ok("Tour retrieved successfully", tour.view(&state.storage))
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: FormInput,
) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    let previous = find_tour(&conn, id)?.ok_or_else(|| not_found(id))?.tour;
    let form = accept(&conn, &state.storage, &input, Some(&previous))?;

    let tour = match update_tour(&conn, id, form.changes, form.combined.as_deref()) {
        Ok(Some(tour)) => tour,
        other => {
            if let Some(file) = &form.image {
                state.storage.delete_quietly(&file.path);
            }
            return Err(other.err().unwrap_or_else(|| not_found(id)));
        }
    };
    if form.image.is_some() {
        if let Some(old) = previous.image.as_deref().filter(|p| !p.is_empty()) {
            state.storage.delete_quietly(old);
        }
    }

    tracing::info!(tour_id = id, "tour updated");
    ok("Tour updated successfully", tour.view(&state.storage))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let tour = {
        let conn = state.dbs.main.lock()?;
        delete_tour(&conn, id)?.ok_or_else(|| not_found(id))?
    };
    if let Some(image) = tour.image.as_deref().filter(|p| !p.is_empty()) {
        state.storage.delete_quietly(image);
    }
    tracing::info!(tour_id = id, "tour deleted");
    done("Tour deleted successfully")
}

#[instrument(skip(state))]
pub async fn toggle_active(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    let active = toggle_tour_flag(&conn, id, TourFlag::Active)?.ok_or_else(|| not_found(id))?;
    ok(
        "Tour status updated successfully",
        json!({ "id": id, "active": active }),
    )
}

#[instrument(skip(state))]
pub async fn toggle_featured(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let conn = state.dbs.main.lock()?;
    let featured =
        toggle_tour_flag(&conn, id, TourFlag::Featured)?.ok_or_else(|| not_found(id))?;
    ok(
        "Tour featured status updated successfully",
        json!({ "id": id, "featured": featured }),
    )
}
