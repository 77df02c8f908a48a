//! Shared numeric helpers for the packaging core.
//!
//! The upstream order data arrives with holes: missing dimensions, `null`
//! weights, zero quantities. This module centralizes the "use the documented
//! default instead of failing" rules so every caller applies them the same
//! way.

/// Global numerical tolerance for floating-point comparisons.
///
/// Used when checking whether an aggregate volume or weight fits a carton.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Returns `value` when it is a finite, strictly positive number, otherwise
/// the fallback.
///
/// Zero counts as missing here: a zero-length or zero-weight line item is
/// incomplete catalog data, not a real measurement.
///
/// # Parameters
/// * `value` - Raw optional field from the order line
/// * `fallback` - Documented default for the field
#[inline]
pub fn or_positive(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    }
}

/// Clamps an optional quantity to a minimum of 1.
///
/// A missing, zero or negative quantity still represents one physical unit.
#[inline]
pub fn quantity_or_min(value: Option<i64>) -> u32 {
    match value {
        Some(q) if q >= 1 => q.min(u32::MAX as i64) as u32,
        _ => 1,
    }
}

/// Rounds a currency amount to 2 decimal places, half away from zero.
#[inline]
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Checks whether a string is a valid Indian pincode (exactly 6 digits).
#[inline]
pub fn is_six_digit_pincode(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Checks that a value is a usable positive measurement.
#[inline]
pub fn is_positive_number(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
