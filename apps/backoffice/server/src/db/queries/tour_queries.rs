//! SQL query builders for the tour catalogue

use sea_query::{Expr, JoinType, Order, Query, SelectStatement};

use super::{col, search_any_in, sort_direction, tcol};
use crate::db::models::{flag, param, TourListParams};

pub const TOUR_COLUMNS: [&str; 19] = [
    "id",
    "title",
    "slug",
    "duration",
    "subtitle",
    "description",
    "inclusions",
    "exclusions",
    "destination_id",
    "package_type",
    "tour_type",
    "frontend_category",
    "image",
    "image_alt",
    "active",
    "featured",
    "display_order",
    "created_at",
    "updated_at",
];

const TOUR_SORTS: [&str; 4] = ["title", "created_at", "updated_at", "display_order"];

/// Tours joined with their primary destination
///
/// Selects the tour columns, then `d.name` and `d.slug`.
pub fn base_tour_query() -> SelectStatement {
    Query::select()
        .columns(TOUR_COLUMNS.map(|c| tcol("p", c)))
        .column(tcol("d", "name"))
        .column(tcol("d", "slug"))
        .from_as(col("packages"), col("p"))
        .join_as(
            JoinType::LeftJoin,
            col("destinations"),
            col("d"),
            Expr::col(tcol("d", "id")).equals(tcol("p", "destination_id")),
        )
        .to_owned()
}

/// Filtered tour listing
///
/// Unknown or missing `sort_by` uses the catalogue order: `display_order`
/// ascending, then newest first.
pub fn build_tour_list_query(params: &TourListParams) -> SelectStatement {
    let mut query = base_tour_query();

    if let Some(destination_id) = param(&params.destination_id) {
        query.and_where(Expr::col(tcol("p", "destination_id")).eq(destination_id));
    }
    if let Some(package_type) = param(&params.package_type).filter(|t| *t != "all") {
        query.and_where(Expr::col(tcol("p", "package_type")).eq(package_type));
    }
    if let Some(tour_type) = param(&params.tour_type) {
        query.and_where(Expr::col(tcol("p", "tour_type")).eq(tour_type));
    }
    if let Some(category) = param(&params.category) {
        query.and_where(Expr::col(tcol("p", "frontend_category")).eq(category));
    }
    if let Some(term) = param(&params.search) {
        query.cond_where(search_any_in("p", &["title", "subtitle", "description"], term));
    }
    if flag(&params.active_only) {
        query.and_where(Expr::col(tcol("p", "active")).eq(1));
    }
    if flag(&params.featured_only) {
        query.and_where(Expr::col(tcol("p", "featured")).eq(1));
    }

    match param(&params.sort_by).filter(|s| TOUR_SORTS.contains(s)) {
        Some(sort) => {
            query.order_by(
                tcol("p", sort),
                sort_direction(param(&params.sort_order), Order::Asc),
            );
        }
        None => {
            query
                .order_by(tcol("p", "display_order"), Order::Asc)
                .order_by(tcol("p", "created_at"), Order::Desc);
        }
    }
    query.order_by(tcol("p", "id"), Order::Desc);
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::SqliteQueryBuilder;

    #[test]
    fn test_default_catalogue_order() {
        let sql = build_tour_list_query(&TourListParams::default()).to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#"LEFT JOIN "destinations" AS "d""#));
        assert!(sql.contains(r#"ORDER BY "p"."display_order" ASC, "p"."created_at" DESC"#));
    }

    #[test]
    fn test_package_type_all_is_not_a_filter() {
        let params = TourListParams {
            package_type: Some("all".to_string()),
            active_only: Some("true".to_string()),
            ..Default::default()
        };

        let sql = build_tour_list_query(&params).to_string(SqliteQueryBuilder);

        assert!(!sql.contains(r#""p"."package_type" ="#));
        assert!(sql.contains(r#""p"."active" = 1"#));
    }

    #[test]
    fn test_search_and_explicit_sort() {
        let params = TourListParams {
            search: Some("island".to_string()),
            sort_by: Some("title".to_string()),
            sort_order: Some("desc".to_string()),
            category: Some("beach".to_string()),
            ..Default::default()
        };

        let sql = build_tour_list_query(&params).to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#""p"."subtitle" LIKE '%island%'"#));
        assert!(sql.contains(r#""p"."frontend_category" = 'beach'"#));
        assert!(sql.contains(r#"ORDER BY "p"."title" DESC"#));
    }
}
