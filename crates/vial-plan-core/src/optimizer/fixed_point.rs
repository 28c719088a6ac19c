//! Conversion of real-valued doses, strengths and prices to fixed point.

/// Values this close to a whole fixed-point unit are treated as exact.
const SNAP_TOLERANCE: f64 = 1e-6;

/// Finest scale [`required_scale`] will try.
const MAX_SCALE: u32 = 1_000_000_000;

/// Rounding direction for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rounding {
    /// Round toward positive infinity.
    Up,
    /// Only accept values that are whole units at this scale.
    Exact,
}

/// Convert `value` to whole units of `1 / scale`.
///
/// Returns `None` for negative, non-finite or out-of-range values, and for
/// values off the grid under [`Rounding::Exact`].
pub(crate) fn to_fixed(value: f64, scale: u32, rounding: Rounding) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let raw = value * f64::from(scale);
    let nearest = raw.round();
    let units = if (raw - nearest).abs() < SNAP_TOLERANCE {
        nearest
    } else {
        match rounding {
            Rounding::Up => raw.ceil(),
            Rounding::Exact => return None,
        }
    };
    if units >= u64::MAX as f64 {
        return None;
    }
    Some(units as u64)
}

/// Smallest `scale * 10^k` at which `value` is exact, if any.
pub(crate) fn required_scale(value: f64, scale: u32) -> Option<u32> {
    let mut candidate = scale;
    loop {
        if to_fixed(value, candidate, Rounding::Exact).is_some() {
            return Some(candidate);
        }
        candidate = candidate.checked_mul(10).filter(|&c| c <= MAX_SCALE)?;
    }
}

pub(crate) fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
