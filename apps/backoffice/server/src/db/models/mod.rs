//! Database models
//!
//! Row structs map one table each. `*View` structs are the JSON shapes the
//! API returns, with display fields derived from the row.

pub mod dto;
pub mod invoice;
pub mod operations;
pub mod submission;
pub mod terms;
pub mod tour;
pub mod user;

pub use dto::*;
pub use invoice::*;
pub use operations::*;
pub use submission::*;
pub use terms::*;
pub use tour::*;
pub use user::*;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a stored timestamp, falling back to now for malformed values.
///
/// Rows written by this service use RFC 3339; rows created through SQLite
/// column defaults use `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    parse_timestamp_opt(raw).unwrap_or_else(Utc::now)
}

pub fn parse_timestamp_opt(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    })
}

/// Current time in the stored timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// One field of a partial update
///
/// `Missing` leaves the column alone, `Null` clears it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    #[default]
    Missing,
    Null,
    Present(T),
}

impl<T> Field<T> {
    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Missing => Field::Missing,
            Field::Null => Field::Null,
            Field::Present(v) => Field::Present(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Missing => Field::Missing,
            Field::Null => Field::Null,
            Field::Present(v) => Field::Present(f(v)),
        }
    }

    /// The value when present; `Missing` and `Null` both give `None`.
    pub fn present(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    /// Present value, or `default` for `Missing`/`Null`.
    pub fn unwrap_or(self, default: T) -> T {
        self.present().unwrap_or(default)
    }
}

/// `None` leaves the column alone.
impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Missing,
        }
    }
}
