//! Field-level constraint checks shared by every entity kind.
//!
//! Checks are pure functions. Scalar checks return the normalized value or a
//! human-readable reason; entities feed those outcomes into a
//! [`ValidationErrors`] so that every violated rule of one mutation is
//! reported together.

use std::ops::RangeBounds;

use longhaul_foundation::{FieldKey, ValidationErrors};

/// Minutes in one day; scheduled times and durations must stay below this.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Shortest accepted entity name.
pub const MIN_NAME_LEN: usize = 3;

/// Lowest accepted airport altitude, in feet.
pub const MIN_ALTITUDE: i32 = -1240;

/// Accepted latitude, in degrees.
pub const LATITUDE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Accepted longitude, in degrees.
pub const LONGITUDE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Accepted UTC offset, in hours.
pub const TIMEZONE: std::ops::RangeInclusive<f64> = -12.0..=14.0;

/// Tokens that data sources use to mean "no value".
const PLACEHOLDERS: [&str; 4] = ["\"\"", "-", "N/A", "\\N"];

/// Trims a raw text input, mapping blanks and placeholder tokens to `None`.
#[must_use]
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Returns true if `code` is ASCII alphanumeric with an accepted length.
#[must_use]
pub fn is_code(code: &str, lengths: impl RangeBounds<usize>) -> bool {
    lengths.contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Normalizes an optional identifier code.
///
/// A blank input is accepted as `None`. Anything else must be alphanumeric with
/// an accepted length and is upper-cased.
///
/// # Errors
///
/// Returns `reason` if the code has the wrong shape.
pub fn check_code(
    raw: Option<&str>,
    lengths: impl RangeBounds<usize>,
    reason: &str,
) -> Result<Option<String>, String> {
    match normalize_text(raw) {
        None => Ok(None),
        Some(code) if is_code(&code, lengths) => Ok(Some(code.to_ascii_uppercase())),
        Some(_) => Err(reason.to_owned()),
    }
}

/// Like [`check_code`] but the code must be present.
///
/// # Errors
///
/// Returns `reason` if the code is blank or has the wrong shape.
pub fn check_required_code(
    raw: Option<&str>,
    lengths: impl RangeBounds<usize>,
    reason: &str,
) -> Result<String, String> {
    check_code(raw, lengths, reason)?.ok_or_else(|| reason.to_owned())
}

/// Normalizes a required text field.
///
/// # Errors
///
/// Returns `reason` if the text is blank.
pub fn check_required(raw: Option<&str>, reason: &str) -> Result<String, String> {
    normalize_text(raw).ok_or_else(|| reason.to_owned())
}

/// Rejects text containing a semicolon, the separator of the exchange format.
///
/// # Errors
///
/// Returns a reason naming `label`.
pub fn check_no_semicolon(text: String, label: &str) -> Result<String, String> {
    if text.contains(';') {
        Err(format!("{label} cannot contain semicolons"))
    } else {
        Ok(text)
    }
}

/// Normalizes an entity name: at least three characters, no semicolons.
///
/// # Errors
///
/// Returns the reason the name was rejected.
pub fn check_name(raw: Option<&str>) -> Result<String, String> {
    match normalize_text(raw) {
        Some(name) if name.chars().count() >= MIN_NAME_LEN => check_no_semicolon(name, "Name"),
        _ => Err("Name cannot be shorter than three characters".to_owned()),
    }
}

/// Accepts a value inside a field-specific range.
///
/// # Errors
///
/// Returns `reason` when the value falls outside `range`. `NaN` is never inside.
pub fn check_range<T, R>(value: T, range: R, reason: &str) -> Result<T, String>
where
    T: PartialOrd,
    R: RangeBounds<T>,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(reason.to_owned())
    }
}

/// Validates a daily takeoff schedule, returning it sorted.
///
/// A missing list fails once under `field`. Otherwise every offending
/// element fails under its own position, in input order: a null element, a
/// time outside `0..1440`, or a repeat of an earlier element (the first
/// occurrence stays valid).
///
/// # Errors
///
/// Returns every failure found.
pub fn check_takeoff_times(
    field: &'static str,
    raw: Option<&[Option<i32>]>,
) -> Result<Vec<i32>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(raw) = raw else {
        errors.insert(field, "Takeoff times cannot be null");
        return Err(errors);
    };

    let mut times = Vec::with_capacity(raw.len());
    for (index, time) in raw.iter().enumerate() {
        let Some(time) = *time else {
            errors.insert(FieldKey::element(field, index), "Received null as takeoff time");
            continue;
        };
        if raw[..index].contains(&Some(time)) {
            errors.insert(
                FieldKey::element(field, index),
                "Duplicate takeoff time encountered",
            );
        } else if !(0..MINUTES_PER_DAY).contains(&time) {
            errors.insert(
                FieldKey::element(field, index),
                "Takeoff time must be between 0 minutes (inclusive) and 24 hours (exclusive)",
            );
        } else {
            times.push(time);
        }
    }

    if errors.is_empty() {
        times.sort_unstable();
        Ok(times)
    } else {
        Err(errors)
    }
}

/// Splits a whitespace separated equipment list.
#[must_use]
pub fn split_plane_types(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}

/// Validates aircraft type codes: each three or four alphanumeric characters.
///
/// Blank entries are skipped.
///
/// # Errors
///
/// Returns one reason per rejected code, joined.
pub fn check_plane_types<S: AsRef<str>>(types: &[S]) -> Result<Vec<String>, String> {
    let mut accepted = Vec::with_capacity(types.len());
    let mut rejected = Vec::new();
    for raw in types {
        let Some(code) = normalize_text(Some(raw.as_ref())) else {
            continue;
        };
        if is_code(&code, 3..=4) {
            accepted.push(code.to_ascii_uppercase());
        } else {
            rejected.push(format!(
                "Plane types must all be three or four character, alphanumeric codes: got '{code}'"
            ));
        }
    }
    if rejected.is_empty() {
        Ok(accepted)
    } else {
        Err(rejected.join(" AND "))
    }
}
