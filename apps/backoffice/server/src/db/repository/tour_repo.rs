//! Repository for tours and destinations

use rusqlite::{params, Connection, OptionalExtension, Row};
use sea_query::Expr;

use super::{insert_row, row_exists, update_row, Columns};
use crate::db::models::{
    now_timestamp, parse_timestamp, CombinedDestination, Destination, Field, PackageType, Tour,
    TourDetail, TourListParams,
};
use crate::db::queries::{
    base_tour_query, build_tour_list_query, fetch_all, fetch_page, tcol, Page, PageRequest,
};
use crate::error::{BackofficeError, Result};

const TABLE: &str = "packages";

/// Fields of a tour write
#[derive(Debug, Clone, Default)]
pub struct TourChanges {
    pub title: Field<String>,
    pub slug: Field<String>,
    pub duration: Field<String>,
    pub subtitle: Field<String>,
    pub description: Field<String>,
    pub inclusions: Field<String>,
    pub exclusions: Field<String>,
    pub destination_id: Field<i64>,
    pub package_type: Field<PackageType>,
    pub tour_type: Field<String>,
    pub frontend_category: Field<String>,
    pub image: Field<String>,
    pub image_alt: Field<String>,
    pub active: Field<bool>,
    pub featured: Field<bool>,
    pub display_order: Field<i64>,
}

impl TourChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("title", self.title)
            .field("slug", self.slug)
            .field("duration", self.duration)
            .field("subtitle", self.subtitle)
            .field("description", self.description)
            .field("inclusions", self.inclusions)
            .field("exclusions", self.exclusions)
            .field("destination_id", self.destination_id)
            .field("package_type", self.package_type.map(|t| t.as_str().to_string()))
            .field("tour_type", self.tour_type)
            .field("frontend_category", self.frontend_category)
            .field("image", self.image)
            .field("image_alt", self.image_alt)
            .field("active", self.active)
            .field("featured", self.featured)
            .field("display_order", self.display_order)
    }
}

/// Boolean columns that can be flipped in place
#[derive(Debug, Clone, Copy)]
pub enum TourFlag {
    Active,
    Featured,
}

impl TourFlag {
    fn column(self) -> &'static str {
        match self {
            TourFlag::Active => "active",
            TourFlag::Featured => "featured",
        }
    }
}

fn map_tour(row: &Row<'_>) -> rusqlite::Result<TourDetail> {
    let package_type: String = row.get(9)?;
    Ok(TourDetail {
        tour: Tour {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            duration: row.get(3)?,
            subtitle: row.get(4)?,
            description: row.get(5)?,
            inclusions: row.get(6)?,
            exclusions: row.get(7)?,
            destination_id: row.get(8)?,
            package_type: PackageType::parse(&package_type).unwrap_or(PackageType::Single),
            tour_type: row.get(10)?,
            frontend_category: row.get(11)?,
            image: row.get(12)?,
            image_alt: row.get(13)?,
            active: row.get(14)?,
            featured: row.get(15)?,
            display_order: row.get(16)?,
            created_at: parse_timestamp(&row.get::<_, String>(17)?),
            updated_at: parse_timestamp(&row.get::<_, String>(18)?),
        },
        destination_name: row.get(19)?,
        destination_slug: row.get(20)?,
        combined: Vec::new(),
    })
}

/// Destinations of a combined package, in display order
fn list_combined_destinations(conn: &Connection, tour_id: i64) -> Result<Vec<CombinedDestination>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT pd.destination_id, d.name, pd.display_order
            FROM package_destinations pd
            JOIN destinations d ON d.id = pd.destination_id
            WHERE pd.package_id = ?1
            ORDER BY pd.display_order ASC, pd.id ASC
            "#,
        )
        .map_err(BackofficeError::Database)?;

    let combined = stmt
        .query_map([tour_id], |row| {
            Ok(CombinedDestination {
                destination_id: row.get(0)?,
                name: row.get(1)?,
                display_order: row.get(2)?,
            })
        })
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(combined)
}

fn with_combined(conn: &Connection, mut detail: TourDetail) -> Result<TourDetail> {
    detail.combined = list_combined_destinations(conn, detail.tour.id)?;
    Ok(detail)
}

pub fn paginate_tours(
    conn: &Connection,
    params: &TourListParams,
    request: PageRequest,
) -> Result<Page<TourDetail>> {
    fetch_page(conn, &build_tour_list_query(params), request, map_tour)?
        .try_map(|detail| with_combined(conn, detail))
}

pub fn find_tour(conn: &Connection, id: i64) -> Result<Option<TourDetail>> {
    let mut query = base_tour_query();
    query.and_where(Expr::col(tcol("p", "id")).eq(id));
    match fetch_all(conn, &query, map_tour)?.into_iter().next() {
        Some(detail) => Ok(Some(with_combined(conn, detail)?)),
        None => Ok(None),
    }
}

pub fn slug_exists(conn: &Connection, slug: &str, except_id: Option<i64>) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM packages WHERE slug = ?1 AND id != ?2",
        params![slug, except_id.unwrap_or(0)],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(BackofficeError::Database)
}

/// `base`, or `base-1`, `base-2`... whichever is free first
pub fn unique_slug(conn: &Connection, base: &str, except_id: Option<i64>) -> Result<String> {
    let mut candidate = base.to_string();
    let mut counter = 1;
    while slug_exists(conn, &candidate, except_id)? {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(candidate)
}

fn replace_combined_destinations(
    conn: &Connection,
    tour_id: i64,
    destination_ids: &[i64],
) -> Result<()> {
    conn.execute(
        "DELETE FROM package_destinations WHERE package_id = ?1",
        [tour_id],
    )
    .map_err(BackofficeError::Database)?;

    for (index, destination_id) in destination_ids.iter().enumerate() {
        conn.execute(
            r#"
            INSERT INTO package_destinations (package_id, destination_id, display_order)
            VALUES (?1, ?2, ?3)
            "#,
            params![tour_id, destination_id, index as i64 + 1],
        )
        .map_err(BackofficeError::Database)?;
    }
    Ok(())
}

/// Create a tour. `combined` lists the destinations of a combined package.
pub fn create_tour(
    conn: &Connection,
    changes: TourChanges,
    combined: Option<&[i64]>,
) -> Result<TourDetail> {
    let tx = conn.unchecked_transaction().map_err(BackofficeError::Database)?;
    let now = now_timestamp();
    let id = insert_row(
        &tx,
        TABLE,
        changes
            .columns()
            .set("created_at", now.clone())
            .set("updated_at", now),
    )?;
    if let Some(destination_ids) = combined {
        replace_combined_destinations(&tx, id, destination_ids)?;
    }
    tx.commit().map_err(BackofficeError::Database)?;

    find_tour(conn, id)?.ok_or_else(|| BackofficeError::not_found("Tour", id))
}

/// Update a tour; `combined` replaces the combined destinations when given.
pub fn update_tour(
    conn: &Connection,
    id: i64,
    changes: TourChanges,
    combined: Option<&[i64]>,
) -> Result<Option<TourDetail>> {
    let tx = conn.unchecked_transaction().map_err(BackofficeError::Database)?;
    if !update_row(&tx, TABLE, id, changes.columns().set("updated_at", now_timestamp()))? {
        return Ok(None);
    }
    if let Some(destination_ids) = combined {
        replace_combined_destinations(&tx, id, destination_ids)?;
    }
    tx.commit().map_err(BackofficeError::Database)?;

    find_tour(conn, id)
}

/// Delete a tour and return it so its image can be removed
pub fn delete_tour(conn: &Connection, id: i64) -> Result<Option<Tour>> {
    let Some(detail) = find_tour(conn, id)? else {
        return Ok(None);
    };
    super::delete_row(conn, TABLE, id)?;
    Ok(Some(detail.tour))
}

/// Flip a flag and return its new value
pub fn toggle_tour_flag(conn: &Connection, id: i64, flag: TourFlag) -> Result<Option<bool>> {
    let column = flag.column();
    conn.query_row(
        &format!(
            "UPDATE packages SET {column} = NOT {column}, updated_at = ?1 WHERE id = ?2 RETURNING {column}"
        ),
        params![now_timestamp(), id],
        |row| row.get(0),
    )
    .optional()
    .map_err(BackofficeError::Database)
}

fn map_destination(row: &Row<'_>) -> rusqlite::Result<Destination> {
    Ok(Destination {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        active: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?),
        updated_at: parse_timestamp(&row.get::<_, String>(7)?),
    })
}

/// Active destinations by name, for the tour editor
pub fn list_active_destinations(conn: &Connection) -> Result<Vec<Destination>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, name, slug, category, description, active, created_at, updated_at
            FROM destinations
            WHERE active = 1
            ORDER BY name ASC
            "#,
        )
        .map_err(BackofficeError::Database)?;

    let destinations = stmt
        .query_map([], map_destination)
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(BackofficeError::Database)?;

    Ok(destinations)
}

pub fn destination_exists(conn: &Connection, id: i64) -> Result<bool> {
    row_exists(conn, "destinations", id)
}

/// Add a destination
pub fn create_destination(
    conn: &Connection,
    name: &str,
    slug: &str,
    category: Option<&str>,
    active: bool,
) -> Result<Destination> {
    let now = now_timestamp();
    conn.execute(
        r#"
        INSERT INTO destinations (name, slug, category, active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        "#,
        params![name, slug, category, active, now],
    )
    .map_err(BackofficeError::Database)?;

    let id = conn.last_insert_rowid();
    conn.query_row(
        r#"
        SELECT id, name, slug, category, description, active, created_at, updated_at
        FROM destinations WHERE id = ?1
        "#,
        [id],
        map_destination,
    )
    .map_err(BackofficeError::Database)
}
