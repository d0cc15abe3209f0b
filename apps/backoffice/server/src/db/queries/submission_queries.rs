//! SQL query builders for customer submissions

use chrono::{Days, NaiveDate};
use sea_query::{Expr, Order, Query, SelectStatement};

use super::{col, search_any};
use crate::db::models::{param, ArchiveScope, SubmissionListParams};

pub const SUBMISSION_COLUMNS: [&str; 11] = [
    "id",
    "package_type",
    "email",
    "lead_guest",
    "fb_name",
    "contact_number",
    "payment_date",
    "payment_amount",
    "has_payment_receipt",
    "archived",
    "created_at",
];

/// Submissions listing, newest first
///
/// Date bounds compare against the stored timestamp text, so `date_to` is
/// turned into an exclusive bound on the following day.
pub fn build_submission_list_query(params: &SubmissionListParams) -> SelectStatement {
    let mut query = Query::select();
    query
        .columns(SUBMISSION_COLUMNS.map(col))
        .from(col("submissions"));

    if let Some(package_type) = param(&params.package_type) {
        query.and_where(Expr::col(col("package_type")).eq(package_type));
    }

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(
            &["email", "lead_guest", "fb_name", "contact_number"],
            term,
        ));
    }

    if let Some(from) = param(&params.date_from).and_then(parse_day) {
        query.and_where(Expr::col(col("created_at")).gte(from.to_string()));
    }

    if let Some(to) = param(&params.date_to).and_then(parse_day) {
        if let Some(next) = to.checked_add_days(Days::new(1)) {
            query.and_where(Expr::col(col("created_at")).lt(next.to_string()));
        }
    }

    match ArchiveScope::parse(param(&params.show_archived)) {
        ArchiveScope::Active => {
            query.and_where(Expr::col(col("archived")).eq(0));
        }
        ArchiveScope::ArchivedOnly => {
            query.and_where(Expr::col(col("archived")).eq(1));
        }
        ArchiveScope::All => {}
    }

    query
        .order_by(col("created_at"), Order::Desc)
        .order_by(col("id"), Order::Desc);
    query
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
