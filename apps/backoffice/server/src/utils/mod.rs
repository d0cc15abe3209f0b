pub mod format;
pub mod regex;
