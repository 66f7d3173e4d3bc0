//! Type coercion for mapped fields
//!
//! Every function here is total: anything that cannot be coerced becomes an
//! empty cell. Zero counts as "no data" for numeric fields, so a missing price
//! and a price of 0 export the same way.

use crate::mapping::FieldType;

/// Marker written for truthy boolean fields
pub const TRUE_MARKER: &str = "OUI";
/// Marker written for any other non-empty boolean field
pub const FALSE_MARKER: &str = "NON";

const TRUE_VALUES: [&str; 3] = ["true", "1", "yes"];

/// Coerce raw text according to the declared field type
pub fn coerce(field_type: FieldType, raw: &str) -> String {
    match field_type {
        FieldType::Decimal => decimal(raw),
        FieldType::Integer => integer(raw),
        FieldType::Boolean => boolean(raw),
        FieldType::Text => text(raw),
    }
}

/// Two-decimal fixed point, empty for zero or unparsable input
pub fn decimal(raw: &str) -> String {
    parse_nonzero(raw)
        .map(|n| format!("{:.2}", n))
        .unwrap_or_default()
}

/// Truncated integer, empty for zero or unparsable input
pub fn integer(raw: &str) -> String {
    parse_nonzero(raw)
        .map(f64::trunc)
        .filter(|n| *n != 0.0)
        .map(|n| format!("{:.0}", n))
        .unwrap_or_default()
}

pub fn boolean(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let lower = raw.to_lowercase();
    if TRUE_VALUES.contains(&lower.as_str()) {
        TRUE_MARKER.to_string()
    } else {
        FALSE_MARKER.to_string()
    }
}

/// Free text: double quotes become single quotes, spreadsheet carriage-return
/// escapes become `<br>`, newlines are dropped.
pub fn text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    raw.replace('"', "'")
        .replace("_x000D_", "<br>")
        .replace('\n', "")
        .trim()
        .to_string()
}

fn parse_nonzero(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(decimal("12.5"), "12.50");
        assert_eq!(decimal("250000"), "250000.00");
        assert_eq!(decimal("-3.456"), "-3.46");
        assert_eq!(decimal("0"), "");
        assert_eq!(decimal("0.00"), "");
        assert_eq!(decimal("abc"), "");
        assert_eq!(decimal(""), "");
        assert_eq!(decimal("inf"), "");
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer("7.9"), "7");
        assert_eq!(integer("-7.9"), "-7");
        assert_eq!(integer("42"), "42");
        assert_eq!(integer("0.0"), "");
        assert_eq!(integer("0.4"), "");
        assert_eq!(integer("seven"), "");
        assert_eq!(integer("1e30"), "1000000000000000019884624838656");
        assert_eq!(integer("-12345678901234567890.7"), "-12345678901234567168");
        assert_eq!(integer(""), "");
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean(""), "");
        assert_eq!(boolean("Yes"), TRUE_MARKER);
        assert_eq!(boolean("TRUE"), TRUE_MARKER);
        assert_eq!(boolean("1"), TRUE_MARKER);
        assert_eq!(boolean("no"), FALSE_MARKER);
        assert_eq!(boolean("maybe"), FALSE_MARKER);
    }

    #[test]
    fn test_text() {
        assert_eq!(text(""), "");
        assert_eq!(text("  Maison \"T4\"  "), "Maison 'T4'");
        assert_eq!(text("line one_x000D_\nline two"), "line one<br>line two");
    }

    #[test]
    fn test_coerce_dispatch() {
        assert_eq!(coerce(FieldType::Decimal, "1"), "1.00");
        assert_eq!(coerce(FieldType::Integer, "3.2"), "3");
        assert_eq!(coerce(FieldType::Boolean, "yes"), TRUE_MARKER);
        assert_eq!(coerce(FieldType::Text, " x "), "x");
    }
}
