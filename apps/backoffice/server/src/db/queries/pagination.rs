//! Offset pagination over sea-query SELECTs
//!
//! Pages serialize to the envelope the admin frontend already understands:
//! `{current_page, data, from, to, last_page, per_page, total}`.

use rusqlite::{Connection, Row};
use sea_query::{Alias, Expr, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::Serialize;

use crate::db::models::{param, PageParams};
use crate::error::{BackofficeError, Result};

pub const MAX_PER_PAGE: u64 = 100;

/// Highest page whose offset still fits SQLite's signed 64-bit OFFSET.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// `page` is clamped to `1..=MAX_PAGE`, `per_page` to `1..=MAX_PER_PAGE`.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Unparseable values fall back to page 1 and the endpoint default.
    pub fn from_params(params: &PageParams, default_per_page: u64) -> Self {
        let page = param(&params.page)
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(1);
        let per_page = param(&params.per_page)
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(default_per_page);
        Self::new(page, per_page)
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub current_page: u64,
    pub data: Vec<T>,
    pub from: Option<u64>,
    pub to: Option<u64>,
    pub last_page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset().saturating_add(1);
            (Some(from), Some(from.saturating_add(data.len() as u64 - 1)))
        };
        Self {
            current_page: request.page,
            from,
            to,
            last_page: total.div_ceil(request.per_page).max(1),
            per_page: request.per_page,
            total,
            data,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            from: self.from,
            to: self.to,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
        }
    }

    /// Like [`Page::map`] for conversions that can fail.
    pub fn try_map<U, E>(
        self,
        f: impl FnMut(T) -> std::result::Result<U, E>,
    ) -> std::result::Result<Page<U>, E> {
        let data = self
            .data
            .into_iter()
            .map(f)
            .collect::<std::result::Result<Vec<U>, E>>()?;
        Ok(Page {
            current_page: self.current_page,
            data,
            from: self.from,
            to: self.to,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
        })
    }
}

/// Run a SELECT and map every row.
pub fn fetch_all<T, F>(conn: &Connection, query: &SelectStatement, map_row: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let (sql, values) = query.build_rusqlite(SqliteQueryBuilder);
    let mut stmt = conn.prepare(&sql).map_err(BackofficeError::Database)?;
    let rows = stmt
        .query_map(&*values.as_params(), map_row)
        .map_err(BackofficeError::Database)?
        .collect::<rusqlite::Result<Vec<T>>>()
        .map_err(BackofficeError::Database)?;
    Ok(rows)
}

/// Number of rows the SELECT would return, ignoring any limit.
pub fn count_rows(conn: &Connection, query: &SelectStatement) -> Result<u64> {
    let (sql, values) = Query::select()
        .expr(Expr::cust("COUNT(*)"))
        .from_subquery(query.clone(), Alias::new("sub"))
        .build_rusqlite(SqliteQueryBuilder);
    let count: i64 = conn
        .query_row(&sql, &*values.as_params(), |row| row.get(0))
        .map_err(BackofficeError::Database)?;
    Ok(count.max(0) as u64)
}

/// Count, then fetch one page of the SELECT.
pub fn fetch_page<T, F>(
    conn: &Connection,
    query: &SelectStatement,
    request: PageRequest,
    map_row: F,
) -> Result<Page<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let total = count_rows(conn, query)?;
    let mut paged = query.clone();
    paged.limit(request.per_page).offset(request.offset());
    let data = fetch_all(conn, &paged, map_row)?;
    Ok(Page::new(data, total, request))
}
