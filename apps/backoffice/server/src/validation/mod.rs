//! Request validation
//!
//! Validates a JSON object (or multipart text fields collected into one)
//! field by field, collecting every failure. Each check returns a [`Field`]
//! so the result can feed a repository `*Changes` struct directly.
//!
//! Strings are trimmed and blank values count as null, as a form would send
//! them.

use serde_json::{Map, Value};

use crate::db::models::Field;
use crate::error::{BackofficeError, FieldErrors, Result};
use crate::utils::regex::{EMAIL_REGEX, ISO_DATE_REGEX};

/// How a missing or null value is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be present and not null
    Required,
    /// Checked only when present; null is still rejected
    Sometimes,
    /// May be missing or null
    Nullable,
}

enum Step<'v, T> {
    Check(&'v Value),
    Done(Field<T>),
}

pub struct Validator<'a> {
    input: &'a Map<String, Value>,
    prefix: String,
    errors: FieldErrors,
}

/// Human attribute name: `lead_guest` becomes `lead guest`.
fn attribute(key: &str) -> String {
    key.replace('_', " ")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn as_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// `true`, `false`, `1`, `0` and their string forms.
pub fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn is_date(raw: &str) -> bool {
    if ISO_DATE_REGEX.is_match(raw) {
        return chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok();
    }
    chrono::DateTime::parse_from_rfc3339(raw).is_ok()
}

impl<'a> Validator<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Self::scoped(input, "")
    }

    /// Validator for a nested object; error keys start with `prefix`,
    /// e.g. `answers.0.`.
    pub fn scoped(input: &'a Map<String, Value>, prefix: impl Into<String>) -> Self {
        Self {
            input,
            prefix: prefix.into(),
            errors: FieldErrors::new(),
        }
    }

    pub fn input(&self) -> &'a Map<String, Value> {
        self.input
    }

    pub fn contains(&self, field: &str) -> bool {
        self.input.contains_key(field)
    }

    fn key(&self, field: &str) -> String {
        format!("{}{field}", self.prefix)
    }

    /// Record a failure for `field`.
    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        let key = self.key(field);
        self.errors.entry(key).or_default().push(message.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(&self.key(field))
    }

    /// `unique` failure
    pub fn taken(&mut self, field: &str) {
        let msg = format!("The {} has already been taken.", attribute(&self.key(field)));
        self.fail(field, msg);
    }

    /// `exists` / `in` failure
    pub fn invalid_selection(&mut self, field: &str) {
        let msg = format!("The selected {} is invalid.", attribute(&self.key(field)));
        self.fail(field, msg);
    }

    fn must(&mut self, field: &str, rule: &str) {
        let msg = format!("The {} field must {rule}.", attribute(&self.key(field)));
        self.fail(field, msg);
    }

    fn begin<T>(&mut self, field: &str, presence: Presence) -> Step<'a, T> {
        let input = self.input;
        match (input.get(field), presence) {
            (Some(value), _) if !is_blank(value) => Step::Check(value),
            (None, Presence::Sometimes | Presence::Nullable) => Step::Done(Field::Missing),
            (Some(_), Presence::Nullable) => Step::Done(Field::Null),
            _ => {
                let msg = format!("The {} field is required.", attribute(&self.key(field)));
                self.fail(field, msg);
                Step::Done(Field::Missing)
            }
        }
    }

    /// String of at most `max` characters.
    pub fn string(&mut self, field: &str, presence: Presence, max: usize) -> Field<String> {
        let value = match self.begin(field, presence) {
            Step::Check(value) => value,
            Step::Done(done) => return done,
        };
        let Some(s) = value.as_str().map(str::trim) else {
            self.must(field, "be a string");
            return Field::Missing;
        };
        if s.chars().count() > max {
            self.must(field, &format!("not be greater than {max} characters"));
            return Field::Missing;
        }
        Field::Present(s.to_string())
    }

    /// String without a length limit.
    pub fn text(&mut self, field: &str, presence: Presence) -> Field<String> {
        self.string(field, presence, usize::MAX)
    }

    pub fn email(&mut self, field: &str, presence: Presence, max: usize) -> Field<String> {
        let value = self.string(field, presence, max);
        if let Field::Present(email) = &value {
            if !EMAIL_REGEX.is_match(email) {
                self.must(field, "be a valid email address");
                return Field::Missing;
            }
        }
        value
    }

    pub fn integer(&mut self, field: &str, presence: Presence, min: Option<i64>) -> Field<i64> {
        let value = match self.begin(field, presence) {
            Step::Check(value) => value,
            Step::Done(done) => return done,
        };
        let Some(n) = as_integer(value) else {
            self.must(field, "be an integer");
            return Field::Missing;
        };
        if let Some(min) = min.filter(|min| n < *min) {
            self.must(field, &format!("be at least {min}"));
            return Field::Missing;
        }
        Field::Present(n)
    }

    pub fn decimal(&mut self, field: &str, presence: Presence, min: Option<f64>) -> Field<f64> {
        let value = match self.begin(field, presence) {
            Step::Check(value) => value,
            Step::Done(done) => return done,
        };
        let Some(n) = as_decimal(value) else {
            self.must(field, "be a number");
            return Field::Missing;
        };
        if let Some(min) = min.filter(|min| n < *min) {
            self.must(field, &format!("be at least {min}"));
            return Field::Missing;
        }
        Field::Present(n)
    }

    pub fn boolean(&mut self, field: &str, presence: Presence) -> Field<bool> {
        let value = match self.begin(field, presence) {
            Step::Check(value) => value,
            Step::Done(done) => return done,
        };
        match as_boolean(value) {
            Some(b) => Field::Present(b),
            None => {
                self.must(field, "be true or false");
                Field::Missing
            }
        }
    }

    /// One of the `allowed` strings.
    pub fn one_of(&mut self, field: &str, presence: Presence, allowed: &[&str]) -> Field<String> {
        let value = self.text(field, presence);
        if let Field::Present(v) = &value {
            if !allowed.contains(&v.as_str()) {
                self.invalid_selection(field);
                return Field::Missing;
            }
        }
        value
    }

    /// `YYYY-MM-DD` or an RFC 3339 timestamp, kept as sent.
    pub fn date(&mut self, field: &str, presence: Presence) -> Field<String> {
        let value = self.text(field, presence);
        if let Field::Present(v) = &value {
            if !is_date(v) {
                self.must(field, "be a valid date");
                return Field::Missing;
            }
        }
        value
    }

    fn array(&mut self, field: &str, presence: Presence) -> Field<&'a Vec<Value>> {
        let value = match self.begin(field, presence) {
            Step::Check(value) => value,
            Step::Done(done) => return done,
        };
        match value.as_array() {
            Some(items) => Field::Present(items),
            None => {
                self.must(field, "be an array");
                Field::Missing
            }
        }
    }

    /// Array of strings; blank entries are dropped.
    pub fn string_list(&mut self, field: &str, presence: Presence, max: usize) -> Field<Vec<String>> {
        let items = match self.array(field, presence) {
            Field::Present(items) => items,
            Field::Missing => return Field::Missing,
            Field::Null => return Field::Null,
        };
        let mut list = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_field = format!("{field}.{i}");
            match item {
                Value::Null => {}
                Value::String(s) if s.trim().is_empty() => {}
                Value::String(s) if s.trim().chars().count() > max => {
                    self.must(&item_field, &format!("not be greater than {max} characters"));
                }
                Value::String(s) => list.push(s.trim().to_string()),
                _ => self.must(&item_field, "be a string"),
            }
        }
        Field::Present(list)
    }

    pub fn integer_list(&mut self, field: &str, presence: Presence) -> Field<Vec<i64>> {
        let items = match self.array(field, presence) {
            Field::Present(items) => items,
            Field::Missing => return Field::Missing,
            Field::Null => return Field::Null,
        };
        let mut list = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match as_integer(item) {
                Some(n) => list.push(n),
                None => self.must(&format!("{field}.{i}"), "be an integer"),
            }
        }
        Field::Present(list)
    }

    /// Array of objects, for nested validation with [`Validator::scoped`].
    pub fn objects(
        &mut self,
        field: &str,
        presence: Presence,
    ) -> Field<Vec<&'a Map<String, Value>>> {
        let items = match self.array(field, presence) {
            Field::Present(items) => items,
            Field::Missing => return Field::Missing,
            Field::Null => return Field::Null,
        };
        let mut list = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_object() {
                Some(object) => list.push(object),
                None => self.must(&format!("{field}.{i}"), "be an object"),
            }
        }
        Field::Present(list)
    }

    /// `<field>_confirmation` must match `<field>`.
    pub fn confirmed(&mut self, field: &str) {
        let confirmation = self.input.get(&format!("{field}_confirmation"));
        if self.input.get(field) != confirmation || confirmation.is_none() {
            let msg = format!(
                "The {} field confirmation does not match.",
                attribute(&self.key(field))
            );
            self.fail(field, msg);
        }
    }

    pub fn min_length(&mut self, field: &str, value: &Field<String>, min: usize) {
        if let Field::Present(v) = value {
            if v.chars().count() < min {
                self.must(field, &format!("be at least {min} characters"));
            }
        }
    }

    /// Take the errors of a nested validator.
    pub fn absorb(&mut self, nested: Validator<'_>) {
        for (key, messages) in nested.errors {
            self.errors.entry(key).or_default().extend(messages);
        }
    }

    /// All collected failures as one 422 error.
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BackofficeError::validation_errors(self.errors))
        }
    }
}
