//! Polars AnyValue utility functions.
//!
//! Key matching and pivot column naming both go through [`any_to_string`], so
//! an integer trial id and the same id stored as a float resolve to the same
//! key.

use polars::prelude::*;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats floats without trailing
/// zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use holo_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::Float64(3.0)), "3");
/// assert_eq!(any_to_string(AnyValue::String("stim")), "stim");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use holo_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// assert_eq!(format_numeric(-2.0), "-2");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parses a comma-separated list of numbers such as `"0,2,5,7"`.
///
/// Returns `None` if any entry fails to parse.
pub fn parse_f64_list(value: &str) -> Option<Vec<f64>> {
    if value.trim().is_empty() {
        return Some(Vec::new());
    }
    value.split(',').map(parse_f64).collect()
}

/// Builds a composite key from the given columns at row `idx`.
///
/// Each part is length-prefixed and nulls get their own marker, so distinct
/// tuples never share a key even when values contain the separator.
pub fn row_key(columns: &[&Column], idx: usize) -> String {
    let mut composite = String::new();
    for (pos, column) in columns.iter().enumerate() {
        if pos > 0 {
            composite.push('|');
        }
        match column.get(idx).unwrap_or(AnyValue::Null) {
            AnyValue::Null => composite.push('~'),
            value => {
                let text = any_to_string(value);
                composite.push_str(&format!("{}:{text}", text.len()));
            }
        }
    }
    composite
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_integers() {
        assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::UInt32(0)), "0");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(1.0)), "1");
        assert_eq!(any_to_string(AnyValue::Float64(10.0)), "10");
    }

    #[test]
    fn test_any_to_string_boolean() {
        assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
        assert_eq!(any_to_string(AnyValue::Boolean(false)), "false");
    }

    #[test]
    fn test_format_numeric_keeps_integer_zeros() {
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(2.50), "2.5");
        assert_eq!(format_numeric(-0.0), "-0");
    }

    #[test]
    fn test_parse_f64_list() {
        assert_eq!(parse_f64_list("0,2,5,7"), Some(vec![0.0, 2.0, 5.0, 7.0]));
        assert_eq!(parse_f64_list(" 1 , 3 "), Some(vec![1.0, 3.0]));
        assert_eq!(parse_f64_list(""), Some(vec![]));
        assert_eq!(parse_f64_list("1,x"), None);
    }

    #[test]
    fn test_row_key_matches_int_and_float() {
        let ints = Column::new("trial".into(), &[3i64]);
        let floats = Column::new("trial".into(), &[3.0f64]);
        assert_eq!(row_key(&[&ints], 0), row_key(&[&floats], 0));

        let stim = Column::new("stim".into(), &["a"]);
        assert_eq!(row_key(&[&ints, &stim], 0), "1:3|1:a");
    }

    #[test]
    fn test_row_key_separates_embedded_separators() {
        let left = Column::new("a".into(), &["x|y", "x"]);
        let right = Column::new("b".into(), &["z", "y|z"]);
        assert_ne!(row_key(&[&left, &right], 0), row_key(&[&left, &right], 1));

        let stim = Column::new("stim".into(), &[None, Some("")]);
        assert_ne!(row_key(&[&stim], 0), row_key(&[&stim], 1));
    }
}
