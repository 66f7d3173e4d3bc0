//! Join key normalization

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Canonical form of a listing id: quotes and whitespace removed, uppercased.
///
/// Both sides of the photo merge go through this before comparison.
pub fn normalize(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    WHITESPACE
        .replace_all(&value.replace('"', ""), "")
        .to_uppercase()
}
