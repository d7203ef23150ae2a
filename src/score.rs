//! Score rescaling and five-band classification.
//!
//! Raw indicator values arrive normalized to [0, 1]; users see them on a
//! 1-10 scale together with an ordinal class.

use crate::error::{Result, RiskError};
use crate::types::{Dimension, DisplayScore, RiskClass};

/// Inclusive upper bounds for the first four classes; anything above the
/// last bound is `VeryHigh`.
pub const CLASS_BOUNDS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

pub(crate) fn check_range(field: &str, raw: f64) -> Result<()> {
    if raw.is_nan() || !(0.0..=1.0).contains(&raw) {
        return Err(RiskError::OutOfRange {
            field: field.to_string(),
            value: raw,
        });
    }
    Ok(())
}

/// Map a raw value in [0, 1] to a display score in [1, 10].
pub fn scale(raw: f64) -> Result<f64> {
    check_range("raw", raw)?;
    Ok(raw * 9.0 + 1.0)
}

/// Inverse of [`scale`].
pub fn unscale(scaled: f64) -> Result<f64> {
    if scaled.is_nan() || !(1.0..=10.0).contains(&scaled) {
        return Err(RiskError::OutOfRange {
            field: "scaled".to_string(),
            value: scaled,
        });
    }
    Ok((scaled - 1.0) / 9.0)
}

/// Bucket a raw value. Boundary values belong to the lower class.
///
/// Values outside [0, 1] are not rejected here: below zero lands in
/// `VeryLow`, above one in `VeryHigh`. NaN compares false against every
/// bound and is `VeryHigh`. [`display_score`] rejects NaN before it gets
/// here.
pub fn classify(raw: f64) -> RiskClass {
    if raw.is_nan() {
        return RiskClass::VeryHigh;
    }
    // first matching bound wins
    for (bound, class) in CLASS_BOUNDS.iter().zip(RiskClass::ALL) {
        if raw <= *bound {
            return class;
        }
    }
    RiskClass::VeryHigh
}

/// Range of raw values covered by a class, `(lower, upper)`.
pub fn class_range(class: RiskClass) -> (f64, f64) {
    let i = class.index();
    let lower = if i == 0 { 0.0 } else { CLASS_BOUNDS[i - 1] };
    let upper = CLASS_BOUNDS.get(i).copied().unwrap_or(1.0);
    (lower, upper)
}

/// Scale and classify a single indicator value.
pub fn display_score(dimension: Dimension, raw: f64) -> Result<DisplayScore> {
    check_range(dimension.field_name(), raw)?;
    Ok(DisplayScore {
        raw,
        scaled: raw * 9.0 + 1.0,
        class: classify(raw),
    })
}
