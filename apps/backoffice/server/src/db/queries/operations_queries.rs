//! SQL query builders for the tour operations trackers

use sea_query::{Expr, Order, Query, SelectStatement};

use super::{col, like_pattern, search_any, sort_column, sort_direction};
use crate::db::models::{
    flag, param, CancelledTourListParams, CompletedTourListParams, DomesticTourListParams,
    LuzonJoinerListParams,
};

pub const COMPLETED_TOUR_COLUMNS: [&str; 17] = [
    "id",
    "tour_id",
    "assigned_team",
    "followup_status",
    "tail_end",
    "completion_date",
    "notes",
    "customer_assigned",
    "invoice_no",
    "travel_dates",
    "destination",
    "tour_type",
    "days",
    "pax",
    "lead_guest",
    "created_at",
    "updated_at",
];

pub const CANCELLED_TOUR_COLUMNS: [&str; 24] = [
    "id",
    "tour_id",
    "cancellation_person",
    "cancellation_reason",
    "refund_status",
    "cancellation_date",
    "days",
    "pax",
    "with_coordinator",
    "pickup_point",
    "balance",
    "payment_status",
    "accommodation",
    "room_setup",
    "booked_accommodation",
    "van_details_sent",
    "assigned_team",
    "status",
    "notes",
    "lead_guest",
    "contact",
    "destination",
    "created_at",
    "updated_at",
];

pub const DOMESTIC_TOUR_COLUMNS: [&str; 20] = [
    "id",
    "travel_dates",
    "destination",
    "days",
    "pax",
    "lead_guest",
    "contact",
    "pickup_details",
    "balance",
    "payment_status",
    "accommodation",
    "booked_accommodation",
    "coordinated_with_supplier",
    "hotel_balance",
    "transfer_details_sent",
    "handled_by",
    "status",
    "notes",
    "created_at",
    "updated_at",
];

pub const LUZON_JOINER_COLUMNS: [&str; 20] = [
    "id",
    "travel_dates",
    "destination",
    "days",
    "pax",
    "with_coordinator",
    "lead_guest",
    "contact",
    "pickup_point",
    "balance",
    "payment_status",
    "accommodation",
    "room_setup",
    "booked_accommodation",
    "van_details_sent",
    "assigned_team",
    "status",
    "notes",
    "created_at",
    "updated_at",
];

/// `true` selects tours with a coordinator, anything else those without.
fn coordinator_filter(raw: &str) -> &'static str {
    if raw == "true" {
        "With"
    } else {
        "None"
    }
}

fn eq_filter(query: &mut SelectStatement, column: &str, value: &Option<String>) {
    if let Some(v) = param(value) {
        query.and_where(Expr::col(col(column)).eq(v));
    }
}

fn like_filter(query: &mut SelectStatement, column: &str, value: &Option<String>) {
    if let Some(v) = param(value) {
        query.and_where(Expr::col(col(column)).like(like_pattern(v)));
    }
}

fn ordered(
    query: &mut SelectStatement,
    sort_by: &Option<String>,
    sort_order: &Option<String>,
    allowed: &[&'static str],
    default: &'static str,
) {
    let sort = sort_column(param(sort_by), allowed, default);
    query
        .order_by(col(sort), sort_direction(param(sort_order), Order::Desc))
        .order_by(col("id"), Order::Desc);
}

pub fn build_completed_tour_list_query(params: &CompletedTourListParams) -> SelectStatement {
    let mut query = Query::select()
        .columns(COMPLETED_TOUR_COLUMNS.map(col))
        .from(col("completed_tours"))
        .to_owned();

    eq_filter(&mut query, "assigned_team", &params.assigned_team);
    eq_filter(&mut query, "followup_status", &params.followup_status);
    eq_filter(&mut query, "tail_end", &params.tail_end);
    like_filter(&mut query, "destination", &params.destination);
    eq_filter(&mut query, "tour_type", &params.tour_type);

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(
            &["lead_guest", "destination", "assigned_team", "invoice_no"],
            term,
        ));
    }

    ordered(
        &mut query,
        &params.sort_by,
        &params.sort_order,
        &["completion_date", "travel_dates", "destination", "assigned_team"],
        "completion_date",
    );
    query
}

pub fn build_cancelled_tour_list_query(params: &CancelledTourListParams) -> SelectStatement {
    let mut query = Query::select()
        .columns(CANCELLED_TOUR_COLUMNS.map(col))
        .from(col("cancelled_tours"))
        .to_owned();

    eq_filter(&mut query, "refund_status", &params.refund_status);
    eq_filter(&mut query, "status", &params.status);
    eq_filter(&mut query, "payment_status", &params.payment_status);
    if let Some(raw) = param(&params.with_coordinator) {
        query.and_where(Expr::col(col("with_coordinator")).eq(coordinator_filter(raw)));
    }
    like_filter(&mut query, "destination", &params.destination);
    eq_filter(&mut query, "assigned_team", &params.assigned_team);

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(
            &["lead_guest", "destination", "contact", "assigned_team"],
            term,
        ));
    }

    ordered(
        &mut query,
        &params.sort_by,
        &params.sort_order,
        &["cancellation_date", "destination", "refund_status", "status"],
        "cancellation_date",
    );
    query
}

pub fn build_domestic_tour_list_query(params: &DomesticTourListParams) -> SelectStatement {
    let mut query = Query::select()
        .columns(DOMESTIC_TOUR_COLUMNS.map(col))
        .from(col("domestic_tours"))
        .to_owned();

    like_filter(&mut query, "destination", &params.destination);
    eq_filter(&mut query, "status", &params.status);
    eq_filter(&mut query, "payment_status", &params.payment_status);
    eq_filter(&mut query, "handled_by", &params.handled_by);
    if flag(&params.accommodation_booked) {
        query.and_where(Expr::col(col("booked_accommodation")).eq("YES"));
    }
    if flag(&params.coordinated_with_supplier) {
        query.and_where(Expr::col(col("coordinated_with_supplier")).eq("YES"));
    }
    if flag(&params.transfer_details_sent) {
        query.and_where(Expr::col(col("transfer_details_sent")).eq("YES"));
    }

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(
            &["lead_guest", "destination", "contact", "handled_by"],
            term,
        ));
    }

    ordered(
        &mut query,
        &params.sort_by,
        &params.sort_order,
        &["travel_dates", "destination", "status", "payment_status"],
        "travel_dates",
    );
    query
}

pub fn build_luzon_joiner_list_query(params: &LuzonJoinerListParams) -> SelectStatement {
    let mut query = Query::select()
        .columns(LUZON_JOINER_COLUMNS.map(col))
        .from(col("luzon_exclusive"))
        .to_owned();

    like_filter(&mut query, "destination", &params.destination);
    eq_filter(&mut query, "status", &params.status);
    eq_filter(&mut query, "payment_status", &params.payment_status);
    if let Some(raw) = param(&params.with_coordinator) {
        query.and_where(Expr::col(col("with_coordinator")).eq(coordinator_filter(raw)));
    }
    eq_filter(&mut query, "assigned_team", &params.assigned_team);
    if flag(&params.accommodation_booked) {
        query.and_where(Expr::col(col("booked_accommodation")).eq("YES"));
    }
    if flag(&params.van_details_sent) {
        query.and_where(Expr::col(col("van_details_sent")).eq("YES"));
    }

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(
            &["lead_guest", "destination", "contact", "assigned_team"],
            term,
        ));
    }

    ordered(
        &mut query,
        &params.sort_by,
        &params.sort_order,
        &["travel_dates", "destination", "status", "payment_status"],
        "travel_dates",
    );
    query
}
