//! Miscellaneous routines shared by the geometry and combination code.
//!
//! Provides:
//! - Approximate float comparison (`feq`, `within`, `round_to`)
//! - A 2D point alias used by the sweep and snapping code
//! - CJK text detection

/// Default epsilon for approximate float equality.
pub const EPSILON: f64 = 0.01;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// Compares two floats for approximate equality with the default epsilon.
#[inline]
pub fn feq(a: f64, b: f64) -> bool {
    feq_eps(a, b, EPSILON)
}

/// Compares two floats for approximate equality.
#[inline]
pub fn feq_eps(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Returns true if `second` lies strictly inside `first ± variance`.
#[inline]
pub fn within(first: f64, second: f64, variance: f64) -> bool {
    second < first + variance && second > first - variance
}

/// Rounds `v` to `places` decimal digits.
pub fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

/// Returns true if the character is a CJK unified ideograph.
#[inline]
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

/// Returns true if the text contains at least one CJK ideograph.
pub fn has_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}
