//! SQL query builders for dynamic SQL generation
//!
//! List endpoints combine optional filters, free-text search and a
//! whitelisted sort column, so their SELECTs are built with sea-query.
//! Fixed statements stay as plain SQL in the repositories.

pub mod invoice_queries;
pub mod operations_queries;
pub mod pagination;
pub mod submission_queries;
pub mod terms_queries;
pub mod tour_queries;

pub use invoice_queries::*;
pub use operations_queries::*;
pub use pagination::*;
pub use submission_queries::*;
pub use terms_queries::*;
pub use tour_queries::*;

use sea_query::{Alias, Cond, Expr, Order};

/// Unqualified column reference.
pub fn col(name: &str) -> Alias {
    Alias::new(name)
}

/// Table-qualified column reference, e.g. `("p", "title")`.
pub fn tcol(table: &str, name: &str) -> (Alias, Alias) {
    (Alias::new(table), Alias::new(name))
}

/// Pick the requested sort column if whitelisted, else the default.
pub fn sort_column(
    requested: Option<&str>,
    allowed: &[&'static str],
    default: &'static str,
) -> &'static str {
    requested
        .and_then(|r| allowed.iter().copied().find(|a| *a == r))
        .unwrap_or(default)
}

/// Parse `asc`/`desc` in any case, falling back to `default`.
pub fn sort_direction(requested: Option<&str>, default: Order) -> Order {
    match requested.map(str::to_ascii_lowercase).as_deref() {
        Some("asc") => Order::Asc,
        Some("desc") => Order::Desc,
        _ => default,
    }
}

/// `%term%` for a LIKE match.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

/// OR of `column LIKE %term%` over several columns.
pub fn search_any(columns: &[&str], term: &str) -> Cond {
    let pattern = like_pattern(term);
    columns.iter().fold(Cond::any(), |cond, c| {
        cond.add(Expr::col(col(c)).like(pattern.clone()))
    })
}

/// Like [`search_any`] with every column qualified by `table`.
pub fn search_any_in(table: &str, columns: &[&str], term: &str) -> Cond {
    let pattern = like_pattern(term);
    columns.iter().fold(Cond::any(), |cond, c| {
        cond.add(Expr::col(tcol(table, c)).like(pattern.clone()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::{Query, SqliteQueryBuilder};

    #[test]
    fn test_sort_column_whitelist() {
        let allowed = ["title", "created_at"];
        assert_eq!(sort_column(Some("title"), &allowed, "created_at"), "title");
        assert_eq!(
            sort_column(Some("password; DROP TABLE"), &allowed, "created_at"),
            "created_at"
        );
        assert_eq!(sort_column(None, &allowed, "created_at"), "created_at");
    }

    #[test]
    fn test_sort_direction() {
        assert!(matches!(sort_direction(Some("ASC"), Order::Desc), Order::Asc));
        assert!(matches!(sort_direction(Some("sideways"), Order::Desc), Order::Desc));
        assert!(matches!(sort_direction(None, Order::Asc), Order::Asc));
    }

    #[test]
    fn test_search_any_builds_or_clause() {
        let sql = Query::select()
            .column(col("id"))
            .from(col("terms"))
            .cond_where(search_any(&["title", "content"], "refund"))
            .to_string(SqliteQueryBuilder);

        assert!(sql.contains(r#""title" LIKE '%refund%'"#));
        assert!(sql.contains(" OR "));
    }
}
