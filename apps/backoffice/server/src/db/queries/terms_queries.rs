//! SQL query builders for terms and conditions and the form's questions

use sea_query::{Expr, JoinType, Order, Query, SelectStatement};

use super::{col, search_any, search_any_in, sort_column, sort_direction, tcol};
use crate::db::models::{param, TermsListParams, TermsQuestionListParams};

pub const TERMS_AND_CONDITIONS_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "content",
    "pdf_file_path",
    "pdf_file_name",
    "is_active",
    "created_at",
    "updated_at",
];

pub const TERMS_QUESTION_COLUMNS: [&str; 8] = [
    "id",
    "package_id",
    "question_text",
    "yes_option",
    "no_option",
    "sort_order",
    "created_at",
    "updated_at",
];

/// Terms and conditions listing with status filter, search and sort
pub fn build_terms_list_query(params: &TermsListParams) -> SelectStatement {
    let mut query = Query::select();
    query
        .columns(TERMS_AND_CONDITIONS_COLUMNS.map(col))
        .from(col("terms_and_conditions"));

    match param(&params.status) {
        Some("active") => {
            query.and_where(Expr::col(col("is_active")).eq(1));
        }
        Some("inactive") => {
            query.and_where(Expr::col(col("is_active")).eq(0));
        }
        _ => {}
    }

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any(&["title", "content"], term));
    }

    let sort = sort_column(
        param(&params.sort_by),
        &["title", "created_at", "updated_at"],
        "created_at",
    );
    query
        .order_by(col(sort), sort_direction(param(&params.sort_order), Order::Desc))
        .order_by(col("id"), Order::Desc);
    query
}

/// Questions joined with their package name
///
/// Selects the question columns, then `p.id` and `p.name` which are NULL
/// when the package no longer exists.
pub fn build_terms_question_list_query(params: &TermsQuestionListParams) -> SelectStatement {
    let mut query = base_terms_question_query();

    if let Some(package_id) = param(&params.package_id) {
        query.and_where(Expr::col(tcol("q", "package_id")).eq(package_id));
    }

    if let Some(term) = param(&params.search) {
        query.cond_where(search_any_in(
            "q",
            &["question_text", "yes_option", "no_option"],
            term,
        ));
    }

    let sort = sort_column(
        param(&params.sort_by),
        &["sort_order", "created_at", "updated_at"],
        "sort_order",
    );
    query
        .order_by(tcol("q", sort), sort_direction(param(&params.sort_order), Order::Asc))
        .order_by(tcol("q", "id"), Order::Asc);
    query
}

pub fn base_terms_question_query() -> SelectStatement {
    Query::select()
        .columns(TERMS_QUESTION_COLUMNS.map(|c| tcol("q", c)))
        .column(tcol("p", "id"))
        .column(tcol("p", "name"))
        .from_as(col("terms_questions"), col("q"))
        .join_as(
            JoinType::LeftJoin,
            col("packages"),
            col("p"),
            Expr::col(tcol("p", "id")).equals(tcol("q", "package_id")),
        )
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::SqliteQueryBuilder;

    #[test]
    fn test_build_terms_list_query_status_filter() {
        let params = TermsListParams {
            status: Some("inactive".to_string()),
            ..Default::default()
        };

        let sql = build_terms_list_query(&params).to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#""is_active" = 0"#));
        assert!(sql.contains(r#"ORDER BY "created_at" DESC"#));
    }

    #[test]
    fn test_build_terms_list_query_sort_by_title() {
        let params = TermsListParams {
            sort_by: Some("title".to_string()),
            sort_order: Some("asc".to_string()),
            search: Some("refund".to_string()),
            ..Default::default()
        };

        let sql = build_terms_list_query(&params).to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#""content" LIKE '%refund%'"#));
        assert!(sql.contains(r#"ORDER BY "title" ASC"#));
    }

    #[test]
    fn test_build_terms_question_list_query() {
        let params = TermsQuestionListParams {
            package_id: Some("3".to_string()),
            ..Default::default()
        };

        let sql = build_terms_question_list_query(&params).to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#"LEFT JOIN "packages" AS "p""#));
        assert!(sql.contains(r#""q"."package_id" = '3'"#));
        assert!(sql.contains(r#"ORDER BY "q"."sort_order" ASC"#));
    }
}
