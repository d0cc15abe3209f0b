//! Compiled regex patterns
//!
//! Patterns are compiled once on first use and reused.

use once_cell::sync::Lazy;
use regex::Regex;

// Characters stripped from uploaded file names
pub static UNSAFE_FILE_CHARS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z0-9._-]").expect("Invalid UNSAFE_FILE_CHARS_REGEX pattern")
});

// Runs of characters that separate slug words
pub static SLUG_SEPARATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid SLUG_SEPARATOR_REGEX pattern"));

// Deliberately loose: local@domain.tld with no whitespace
pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid EMAIL_REGEX pattern")
});

pub static ISO_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid ISO_DATE_REGEX pattern"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_regex() {
        assert!(EMAIL_REGEX.is_match("ana@vantripper.ph"));
        assert!(!EMAIL_REGEX.is_match("ana@localhost"));
        assert!(!EMAIL_REGEX.is_match("ana vantripper@x.ph"));
    }

    #[test]
    fn test_unsafe_file_chars() {
        assert_eq!(
            UNSAFE_FILE_CHARS_REGEX.replace_all("my terms (v2).pdf", ""),
            "mytermsv2.pdf"
        );
    }
}
