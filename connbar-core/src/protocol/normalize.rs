//! Input normalization for hand-edited option bags
//!
//! Stored values are corrected to safe defaults where one exists; only an
//! empty host is left for callers to reject.

/// Lowest accepted RDP desktop dimension
pub const MIN_DIMENSION: u32 = 640;

/// Highest accepted RDP desktop dimension
pub const MAX_DIMENSION: u32 = 8192;

/// Coerces a raw port to a usable one
///
/// Missing, zero, non-finite and out-of-range values map to `default`;
/// everything else is rounded to the nearest integer.
#[must_use]
pub fn normalize_port(raw: Option<f64>, default: u16) -> u16 {
    let Some(value) = raw else {
        return default;
    };
    if !value.is_finite() || value == 0.0 {
        return default;
    }
    let rounded = value.round();
    if (1.0..=f64::from(u16::MAX)).contains(&rounded) {
        rounded as u16
    } else {
        default
    }
}

/// Coerces a raw desktop dimension
///
/// Returns `None` for missing, zero, non-finite and out-of-range values.
#[must_use]
pub fn normalize_dimension(raw: Option<f64>) -> Option<u32> {
    let value = raw?;
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    (f64::from(MIN_DIMENSION)..=f64::from(MAX_DIMENSION))
        .contains(&rounded)
        .then_some(rounded as u32)
}

/// Strips CR/LF and surrounding whitespace from a host
#[must_use]
pub fn clean_host(raw: &str) -> String {
    strip_line_breaks(raw).trim().to_string()
}

/// Strips CR/LF and trims; an empty result becomes `None`
#[must_use]
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let cleaned = strip_line_breaks(raw?);
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Strips CR/LF but keeps surrounding whitespace; empty becomes `None`
#[must_use]
pub fn clean_password(raw: Option<&str>) -> Option<String> {
    let cleaned = strip_line_breaks(raw?);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn strip_line_breaks(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Formats a raw numeric value the way it reads in a summary line
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
