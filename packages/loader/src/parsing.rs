//! Cell parsing helpers for the accident CSV.
//!
//! Every helper treats an empty cell as a missing value. Numeric and flag
//! helpers also ignore surrounding whitespace; text cells are kept as
//! written.

use chrono::NaiveDateTime;

/// Parses a `Start_Time` cell.
///
/// Everything from the first `.` onward is discarded before parsing, so
/// `2023-01-01 05:30:00.123456` and `2023-01-01 05:30:00.000000000` parse
/// the same as `2023-01-01 05:30:00`. A `T` separator is also accepted.
#[must_use]
pub fn parse_start_time(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    let prefix = trimmed.split_once('.').map_or(trimmed, |(head, _)| head);

    if let Ok(dt) = NaiveDateTime::parse_from_str(prefix, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    None
}

/// Parses a `Severity` cell.
///
/// Integral floats (`"4.0"`) are accepted since some exports write every
/// numeric column as a float.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_severity(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i64)
    } else {
        None
    }
}

/// Parses an amenity-style boolean cell.
///
/// Recognizes `true/false`, `t/f`, `yes/no`, `y/n` and `1/0` in any case.
/// Any other non-empty value counts as set.
#[must_use]
pub fn parse_flag(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.to_ascii_lowercase().as_str() {
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => Some(true),
    }
}

/// Parses a coordinate cell. Non-finite values are treated as missing.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Returns the cell unchanged, or `None` when it is empty.
#[must_use]
pub fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
