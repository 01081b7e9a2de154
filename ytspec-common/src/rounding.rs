//! Half-up rounding and the amplitude quantizer
//!
//! Both the peak pass and the normalize pass go through [`quantize`], so any
//! change to the tie-break here moves the peak and every normalized value.

use crate::model::ScaledValue;

/// Fixed scale applied to raw amplitudes before rounding
pub const SCALE_FACTOR: f64 = 1_000_000.0;

/// Round `value` to `places` decimal places, ties away from zero
///
/// `places` may be zero (whole units) or negative (tens, hundreds, ...).
/// The fractional part is compared against one half after scaling, so
/// `round_to(0.5, 0) == 1.0` and `round_to(-0.5, 0) == -1.0`; there is no
/// banker's rounding.
///
/// Non-finite input is returned unchanged.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let pow = 10f64.powi(places);
    let digit = value * pow;
    let magnitude = digit.abs();
    let whole = magnitude.trunc();
    let rounded = if magnitude - whole >= 0.5 {
        whole + 1.0
    } else {
        whole
    };

    if digit < 0.0 && rounded != 0.0 {
        -rounded / pow
    } else {
        rounded / pow
    }
}

/// Scale a raw amplitude by [`SCALE_FACTOR`] and round half-up to a whole unit
///
/// Callers are expected to reject non-finite amplitudes first; NaN maps to 0
/// and infinities saturate.
pub fn quantize(raw: f64) -> ScaledValue {
    ScaledValue(round_to(raw * SCALE_FACTOR, 0) as i64)
}
