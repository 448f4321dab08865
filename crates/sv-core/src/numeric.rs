use crate::{CoreError, CoreResult};

/// Floating point type used for temperatures, gains and control signals.
pub type Real = f64;

pub fn ensure_finite(value: Real, what: &'static str) -> CoreResult<Real> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::NonFinite { what, value })
    }
}

/// Accepts `value` only if it lies in `[min, max]`. NaN is rejected.
pub fn ensure_in_range(value: Real, min: Real, max: Real, what: &'static str) -> CoreResult<Real> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::OutOfRange {
            what,
            value,
            min,
            max,
        })
    }
}
