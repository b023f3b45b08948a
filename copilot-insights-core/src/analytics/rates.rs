//! Rounding and ratio helpers shared by every aggregation.
//!
//! All rates are computed once from summed numerators and denominators;
//! nothing here averages ratios.

/// Round to the nearest integer, halves rounding towards positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to two decimal places (`round(x * 100) / 100`).
pub fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Arithmetic mean of `count` values summing to `sum`, rounded to an integer.
///
/// Returns 0 for an empty set.
pub fn mean_rounded(sum: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    round_half_up(sum as f64 / count as f64) as u64
}

/// Mean of fractional values, rounded to two decimals. 0 for an empty set.
pub fn mean2(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(sum / count as f64)
}

/// Mean of fractional values, rounded to an integer. 0 for an empty set.
pub fn mean_to_int(sum: f64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    round_half_up(sum / count as f64).max(0.0) as u64
}

/// `100 * numerator / denominator`, rounded to two decimals.
///
/// A zero denominator yields 0. Upstream data occasionally reports more
/// acceptances than suggestions; such rates are clamped to 100 and logged.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    if numerator > denominator {
        tracing::warn!(
            numerator,
            denominator,
            "rate numerator exceeds denominator, clamping to 100%"
        );
        return 100.0;
    }
    round2(numerator as f64 / denominator as f64 * 100.0)
}
