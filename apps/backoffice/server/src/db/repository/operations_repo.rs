//! Repository for the tour operations trackers
//!
//! Completed and cancelled tours use autoincrement ids. Domestic tours and
//! Luzon joiners get `max(id) + 1`, and store their flags as `YES`/`NO`.

use rusqlite::{params, Connection, OptionalExtension, Row};
use sea_query::{Expr, Query, SelectStatement};

use super::{delete_row, insert_row, next_id, timestamp, update_row, Columns};
use crate::db::models::{
    now_timestamp, CancelledTour, CancelledTourListParams, CompletedTour,
    CompletedTourListParams, DomesticTour, DomesticTourListParams, Field, LinkedCustomer,
    LinkedInvoice, LuzonJoiner, LuzonJoinerListParams,
};
use crate::db::queries::{
    build_cancelled_tour_list_query, build_completed_tour_list_query,
    build_domestic_tour_list_query, build_luzon_joiner_list_query, col, fetch_all, fetch_page,
    Page, PageRequest, CANCELLED_TOUR_COLUMNS, COMPLETED_TOUR_COLUMNS, DOMESTIC_TOUR_COLUMNS,
    LUZON_JOINER_COLUMNS,
};
use crate::error::{BackofficeError, Result};

const COMPLETED: &str = "completed_tours";
const CANCELLED: &str = "cancelled_tours";
const DOMESTIC: &str = "domestic_tours";
const LUZON: &str = "luzon_exclusive";

fn by_id(table: &str, columns: &[&str], id: i64) -> SelectStatement {
    Query::select()
        .columns(columns.iter().map(|c| col(c)))
        .from(col(table))
        .and_where(Expr::col(col("id")).eq(id))
        .to_owned()
}

fn yes_no_column(field: Field<bool>) -> Field<String> {
    field.map(|flag| if flag { "YES" } else { "NO" }.to_string())
}

fn read_yes_no(raw: Option<String>) -> Option<bool> {
    raw.map(|v| v.eq_ignore_ascii_case("YES"))
}

/// Set one text column and bump `updated_at`. Returns whether the row exists.
fn set_text_column(
    conn: &Connection,
    table: &str,
    column: &str,
    id: i64,
    value: Option<&str>,
) -> Result<bool> {
    let changed = conn
        .execute(
            &format!("UPDATE {table} SET {column} = ?1, updated_at = ?2 WHERE id = ?3"),
            params![value, now_timestamp(), id],
        )
        .map_err(BackofficeError::Database)?;
    Ok(changed > 0)
}

fn stamped_insert(columns: Columns) -> Columns {
    let now = now_timestamp();
    columns.set("created_at", now.clone()).set("updated_at", now)
}

// ---------------------------------------------------------------------------
// Completed tours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CompletedTourChanges {
    pub tour_id: Field<i64>,
    pub assigned_team: Field<String>,
    pub followup_status: Field<String>,
    pub tail_end: Field<String>,
    pub completion_date: Field<String>,
    pub notes: Field<String>,
    pub customer_assigned: Field<bool>,
    pub invoice_no: Field<String>,
    pub travel_dates: Field<String>,
    pub destination: Field<String>,
    pub tour_type: Field<String>,
    pub days: Field<i64>,
    pub pax: Field<i64>,
    pub lead_guest: Field<String>,
}

impl CompletedTourChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("tour_id", self.tour_id)
            .field("assigned_team", self.assigned_team)
            .field("followup_status", self.followup_status)
            .field("tail_end", self.tail_end)
            .field("completion_date", self.completion_date)
            .field("notes", self.notes)
            .field("customer_assigned", self.customer_assigned)
            .field("invoice_no", self.invoice_no)
            .field("travel_dates", self.travel_dates)
            .field("destination", self.destination)
            .field("tour_type", self.tour_type)
            .field("days", self.days)
            .field("pax", self.pax)
            .field("lead_guest", self.lead_guest)
    }
}

fn map_completed_tour(row: &Row<'_>) -> rusqlite::Result<CompletedTour> {
    Ok(CompletedTour {
        id: row.get(0)?,
        tour_id: row.get(1)?,
        assigned_team: row.get(2)?,
        followup_status: row.get(3)?,
        tail_end: row.get(4)?,
        completion_date: row.get(5)?,
        notes: row.get(6)?,
        customer_assigned: row.get(7)?,
        invoice_no: row.get(8)?,
        travel_dates: row.get(9)?,
        destination: row.get(10)?,
        tour_type: row.get(11)?,
        days: row.get(12)?,
        pax: row.get(13)?,
        lead_guest: row.get(14)?,
        created_at: timestamp(row.get(15)?),
        updated_at: timestamp(row.get(16)?),
        customer: None,
        invoice: None,
    })
}

/// Load the customer and invoice sharing the tour's invoice number
fn attach_links(conn: &Connection, mut tour: CompletedTour) -> Result<CompletedTour> {
    let Some(invoice_no) = tour.invoice_no.as_deref().filter(|n| !n.is_empty()) else {
        return Ok(tour);
    };

    tour.customer = conn
        .query_row(
            "SELECT name, email FROM customers WHERE invoice_no = ?1 ORDER BY id LIMIT 1",
            [invoice_no],
            |row| {
                Ok(LinkedCustomer {
                    name: row.get(0)?,
                    email: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(BackofficeError::Database)?;

    tour.invoice = conn
        .query_row(
            r#"
            SELECT invoice_status, total_price, amount_due, payment_received
            FROM invoices WHERE invoice_no = ?1
            "#,
            [invoice_no],
            |row| {
                Ok(LinkedInvoice {
                    invoice_status: row.get(0)?,
                    total_price: row.get(1)?,
                    amount_due: row.get(2)?,
                    payment_received: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(BackofficeError::Database)?;

    Ok(tour)
}

pub fn paginate_completed_tours(
    conn: &Connection,
    params: &CompletedTourListParams,
    request: PageRequest,
) -> Result<Page<CompletedTour>> {
    fetch_page(
        conn,
        &build_completed_tour_list_query(params),
        request,
        map_completed_tour,
    )?
    .try_map(|tour| attach_links(conn, tour))
}

pub fn find_completed_tour(conn: &Connection, id: i64) -> Result<Option<CompletedTour>> {
    let query = by_id(COMPLETED, &COMPLETED_TOUR_COLUMNS, id);
    match fetch_all(conn, &query, map_completed_tour)?.into_iter().next() {
        Some(tour) => Ok(Some(attach_links(conn, tour)?)),
        None => Ok(None),
    }
}

pub fn create_completed_tour(
    conn: &Connection,
    changes: CompletedTourChanges,
) -> Result<CompletedTour> {
    let id = insert_row(conn, COMPLETED, stamped_insert(changes.columns()))?;
    find_completed_tour(conn, id)?.ok_or_else(|| BackofficeError::not_found("Completed tour", id))
}

pub fn update_completed_tour(
    conn: &Connection,
    id: i64,
    changes: CompletedTourChanges,
) -> Result<Option<CompletedTour>> {
    let columns = changes.columns().set("updated_at", now_timestamp());
    if !update_row(conn, COMPLETED, id, columns)? {
        return Ok(None);
    }
    find_completed_tour(conn, id)
}

pub fn delete_completed_tour(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, COMPLETED, id)
}

pub fn set_followup_status(
    conn: &Connection,
    id: i64,
    status: Option<&str>,
) -> Result<Option<CompletedTour>> {
    if !set_text_column(conn, COMPLETED, "followup_status", id, status)? {
        return Ok(None);
    }
    find_completed_tour(conn, id)
}

pub fn set_tail_end(
    conn: &Connection,
    id: i64,
    tail_end: Option<&str>,
) -> Result<Option<CompletedTour>> {
    if !set_text_column(conn, COMPLETED, "tail_end", id, tail_end)? {
        return Ok(None);
    }
    find_completed_tour(conn, id)
}

// ---------------------------------------------------------------------------
// Cancelled tours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CancelledTourChanges {
    pub tour_id: Field<i64>,
    pub cancellation_person: Field<String>,
    pub cancellation_reason: Field<String>,
    pub refund_status: Field<String>,
    pub cancellation_date: Field<String>,
    pub days: Field<i64>,
    pub pax: Field<i64>,
    pub with_coordinator: Field<String>,
    pub pickup_point: Field<String>,
    pub balance: Field<f64>,
    pub payment_status: Field<String>,
    pub accommodation: Field<String>,
    pub room_setup: Field<String>,
    pub booked_accommodation: Field<bool>,
    pub van_details_sent: Field<bool>,
    pub assigned_team: Field<String>,
    pub status: Field<String>,
    pub notes: Field<String>,
    pub lead_guest: Field<String>,
    pub contact: Field<String>,
    pub destination: Field<String>,
}

impl CancelledTourChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("tour_id", self.tour_id)
            .field("cancellation_person", self.cancellation_person)
            .field("cancellation_reason", self.cancellation_reason)
            .field("refund_status", self.refund_status)
            .field("cancellation_date", self.cancellation_date)
            .field("days", self.days)
            .field("pax", self.pax)
            .field("with_coordinator", self.with_coordinator)
            .field("pickup_point", self.pickup_point)
            .field("balance", self.balance)
            .field("payment_status", self.payment_status)
            .field("accommodation", self.accommodation)
            .field("room_setup", self.room_setup)
            .field("booked_accommodation", self.booked_accommodation)
            .field("van_details_sent", self.van_details_sent)
            .field("assigned_team", self.assigned_team)
            .field("status", self.status)
            .field("notes", self.notes)
            .field("lead_guest", self.lead_guest)
            .field("contact", self.contact)
            .field("destination", self.destination)
    }
}

fn map_cancelled_tour(row: &Row<'_>) -> rusqlite::Result<CancelledTour> {
    Ok(CancelledTour {
        id: row.get(0)?,
        tour_id: row.get(1)?,
        cancellation_person: row.get(2)?,
        cancellation_reason: row.get(3)?,
        refund_status: row.get(4)?,
        cancellation_date: row.get(5)?,
        days: row.get(6)?,
        pax: row.get(7)?,
        with_coordinator: row.get(8)?,
        pickup_point: row.get(9)?,
        balance: row.get(10)?,
        payment_status: row.get(11)?,
        accommodation: row.get(12)?,
        room_setup: row.get(13)?,
        booked_accommodation: row.get(14)?,
        van_details_sent: row.get(15)?,
        assigned_team: row.get(16)?,
        status: row.get(17)?,
        notes: row.get(18)?,
        lead_guest: row.get(19)?,
        contact: row.get(20)?,
        destination: row.get(21)?,
        created_at: timestamp(row.get(22)?),
        updated_at: timestamp(row.get(23)?),
    })
}

pub fn paginate_cancelled_tours(
    conn: &Connection,
    params: &CancelledTourListParams,
    request: PageRequest,
) -> Result<Page<CancelledTour>> {
    fetch_page(
        conn,
        &build_cancelled_tour_list_query(params),
        request,
        map_cancelled_tour,
    )
}

pub fn find_cancelled_tour(conn: &Connection, id: i64) -> Result<Option<CancelledTour>> {
    let query = by_id(CANCELLED, &CANCELLED_TOUR_COLUMNS, id);
    Ok(fetch_all(conn, &query, map_cancelled_tour)?.into_iter().next())
}

pub fn create_cancelled_tour(
    conn: &Connection,
    changes: CancelledTourChanges,
) -> Result<CancelledTour> {
    let id = insert_row(conn, CANCELLED, stamped_insert(changes.columns()))?;
    find_cancelled_tour(conn, id)?.ok_or_else(|| BackofficeError::not_found("Cancelled tour", id))
}

pub fn update_cancelled_tour(
    conn: &Connection,
    id: i64,
    changes: CancelledTourChanges,
) -> Result<Option<CancelledTour>> {
    let columns = changes.columns().set("updated_at", now_timestamp());
    if !update_row(conn, CANCELLED, id, columns)? {
        return Ok(None);
    }
    find_cancelled_tour(conn, id)
}

pub fn delete_cancelled_tour(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, CANCELLED, id)
}

pub fn set_refund_status(
    conn: &Connection,
    id: i64,
    refund_status: Option<&str>,
) -> Result<Option<CancelledTour>> {
    if !set_text_column(conn, CANCELLED, "refund_status", id, refund_status)? {
        return Ok(None);
    }
    find_cancelled_tour(conn, id)
}

// ---------------------------------------------------------------------------
// Domestic tours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct DomesticTourChanges {
    pub travel_dates: Field<String>,
    pub destination: Field<String>,
    pub days: Field<i64>,
    pub pax: Field<i64>,
    pub lead_guest: Field<String>,
    pub contact: Field<String>,
    pub pickup_details: Field<String>,
    pub balance: Field<f64>,
    pub payment_status: Field<String>,
    pub accommodation: Field<String>,
    pub booked_accommodation: Field<bool>,
    pub coordinated_with_supplier: Field<bool>,
    pub hotel_balance: Field<f64>,
    pub transfer_details_sent: Field<bool>,
    pub handled_by: Field<String>,
    pub status: Field<String>,
    pub notes: Field<String>,
}

impl DomesticTourChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("travel_dates", self.travel_dates)
            .field("destination", self.destination)
            .field("days", self.days)
            .field("pax", self.pax)
            .field("lead_guest", self.lead_guest)
            .field("contact", self.contact)
            .field("pickup_details", self.pickup_details)
            .field("balance", self.balance)
            .field("payment_status", self.payment_status)
            .field("accommodation", self.accommodation)
            .field("booked_accommodation", yes_no_column(self.booked_accommodation))
            .field(
                "coordinated_with_supplier",
                yes_no_column(self.coordinated_with_supplier),
            )
            .field("hotel_balance", self.hotel_balance)
            .field("transfer_details_sent", yes_no_column(self.transfer_details_sent))
            .field("handled_by", self.handled_by)
            .field("status", self.status)
            .field("notes", self.notes)
    }
}

fn map_domestic_tour(row: &Row<'_>) -> rusqlite::Result<DomesticTour> {
    Ok(DomesticTour {
        id: row.get(0)?,
        travel_dates: row.get(1)?,
        destination: row.get(2)?,
        days: row.get(3)?,
        pax: row.get(4)?,
        lead_guest: row.get(5)?,
        contact: row.get(6)?,
        pickup_details: row.get(7)?,
        balance: row.get(8)?,
        payment_status: row.get(9)?,
        accommodation: row.get(10)?,
        booked_accommodation: read_yes_no(row.get(11)?),
        coordinated_with_supplier: read_yes_no(row.get(12)?),
        hotel_balance: row.get(13)?,
        transfer_details_sent: read_yes_no(row.get(14)?),
        handled_by: row.get(15)?,
        status: row.get(16)?,
        notes: row.get(17)?,
        created_at: timestamp(row.get(18)?),
        updated_at: timestamp(row.get(19)?),
    })
}

pub fn paginate_domestic_tours(
    conn: &Connection,
    params: &DomesticTourListParams,
    request: PageRequest,
) -> Result<Page<DomesticTour>> {
    fetch_page(
        conn,
        &build_domestic_tour_list_query(params),
        request,
        map_domestic_tour,
    )
}

pub fn find_domestic_tour(conn: &Connection, id: i64) -> Result<Option<DomesticTour>> {
    let query = by_id(DOMESTIC, &DOMESTIC_TOUR_COLUMNS, id);
    Ok(fetch_all(conn, &query, map_domestic_tour)?.into_iter().next())
}

pub fn create_domestic_tour(
    conn: &Connection,
    changes: DomesticTourChanges,
) -> Result<DomesticTour> {
    let tx = conn.unchecked_transaction().map_err(BackofficeError::Database)?;
    let id = next_id(&tx, DOMESTIC)?;
    insert_row(&tx, DOMESTIC, stamped_insert(changes.columns().set("id", id)))?;
    tx.commit().map_err(BackofficeError::Database)?;

    find_domestic_tour(conn, id)?.ok_or_else(|| BackofficeError::not_found("Domestic tour", id))
}

pub fn update_domestic_tour(
    conn: &Connection,
    id: i64,
    changes: DomesticTourChanges,
) -> Result<Option<DomesticTour>> {
    let columns = changes.columns().set("updated_at", now_timestamp());
    if !update_row(conn, DOMESTIC, id, columns)? {
        return Ok(None);
    }
    find_domestic_tour(conn, id)
}

pub fn delete_domestic_tour(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, DOMESTIC, id)
}

pub fn set_domestic_tour_status(
    conn: &Connection,
    id: i64,
    status: &str,
) -> Result<Option<DomesticTour>> {
    if !set_text_column(conn, DOMESTIC, "status", id, Some(status))? {
        return Ok(None);
    }
    find_domestic_tour(conn, id)
}

// ---------------------------------------------------------------------------
// Luzon joiners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LuzonJoinerChanges {
    pub travel_dates: Field<String>,
    pub destination: Field<String>,
    pub days: Field<i64>,
    pub pax: Field<i64>,
    pub with_coordinator: Field<String>,
    pub lead_guest: Field<String>,
    pub contact: Field<String>,
    pub pickup_point: Field<String>,
    pub balance: Field<f64>,
    pub payment_status: Field<String>,
    pub accommodation: Field<String>,
    pub room_setup: Field<String>,
    pub booked_accommodation: Field<bool>,
    pub van_details_sent: Field<bool>,
    pub assigned_team: Field<String>,
    pub status: Field<String>,
    pub notes: Field<String>,
}

impl LuzonJoinerChanges {
    fn columns(self) -> Columns {
        Columns::new()
            .field("travel_dates", self.travel_dates)
            .field("destination", self.destination)
            .field("days", self.days)
            .field("pax", self.pax)
            .field("with_coordinator", self.with_coordinator)
            .field("lead_guest", self.lead_guest)
            .field("contact", self.contact)
            .field("pickup_point", self.pickup_point)
            .field("balance", self.balance)
            .field("payment_status", self.payment_status)
            .field("accommodation", self.accommodation)
            .field("room_setup", self.room_setup)
            .field("booked_accommodation", yes_no_column(self.booked_accommodation))
            .field("van_details_sent", yes_no_column(self.van_details_sent))
            .field("assigned_team", self.assigned_team)
            .field("status", self.status)
            .field("notes", self.notes)
    }
}

fn map_luzon_joiner(row: &Row<'_>) -> rusqlite::Result<LuzonJoiner> {
    Ok(LuzonJoiner {
        id: row.get(0)?,
        travel_dates: row.get(1)?,
        destination: row.get(2)?,
        days: row.get(3)?,
        pax: row.get(4)?,
        with_coordinator: row.get(5)?,
        lead_guest: row.get(6)?,
        contact: row.get(7)?,
        pickup_point: row.get(8)?,
        balance: row.get(9)?,
        payment_status: row.get(10)?,
        accommodation: row.get(11)?,
        room_setup: row.get(12)?,
        booked_accommodation: read_yes_no(row.get(13)?),
        van_details_sent: read_yes_no(row.get(14)?),
        assigned_team: row.get(15)?,
        status: row.get(16)?,
        notes: row.get(17)?,
        created_at: timestamp(row.get(18)?),
        updated_at: timestamp(row.get(19)?),
    })
}

pub fn paginate_luzon_joiners(
    conn: &Connection,
    params: &LuzonJoinerListParams,
    request: PageRequest,
) -> Result<Page<LuzonJoiner>> {
    fetch_page(
        conn,
        &build_luzon_joiner_list_query(params),
        request,
        map_luzon_joiner,
    )
}

pub fn find_luzon_joiner(conn: &Connection, id: i64) -> Result<Option<LuzonJoiner>> {
    let query = by_id(LUZON, &LUZON_JOINER_COLUMNS, id);
    Ok(fetch_all(conn, &query, map_luzon_joiner)?.into_iter().next())
}

pub fn create_luzon_joiner(conn: &Connection, changes: LuzonJoinerChanges) -> Result<LuzonJoiner> {
    let tx = conn.unchecked_transaction().map_err(BackofficeError::Database)?;
    let id = next_id(&tx, LUZON)?;
    insert_row(&tx, LUZON, stamped_insert(changes.columns().set("id", id)))?;
    tx.commit().map_err(BackofficeError::Database)?;

    find_luzon_joiner(conn, id)?.ok_or_else(|| BackofficeError::not_found("Luzon joiner tour", id))
}

pub fn update_luzon_joiner(
    conn: &Connection,
    id: i64,
    changes: LuzonJoinerChanges,
) -> Result<Option<LuzonJoiner>> {
    let columns = changes.columns().set("updated_at", now_timestamp());
    if !update_row(conn, LUZON, id, columns)? {
        return Ok(None);
    }
    find_luzon_joiner(conn, id)
}

pub fn delete_luzon_joiner(conn: &Connection, id: i64) -> Result<bool> {
    delete_row(conn, LUZON, id)
}

pub fn set_luzon_joiner_status(
    conn: &Connection,
    id: i64,
    status: &str,
) -> Result<Option<LuzonJoiner>> {
    if !set_text_column(conn, LUZON, "status", id, Some(status))? {
        return Ok(None);
    }
    find_luzon_joiner(conn, id)
}
