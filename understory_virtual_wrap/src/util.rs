// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float-to-index helpers that work without `std` float intrinsics.

/// `floor(value)` as an index. Negative values and NaN map to `0`; very large
/// values saturate at `usize::MAX`.
pub(crate) fn floor_index(value: f64) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Value is positive and float-to-int casts saturate"
    )]
    let i = value as usize;
    i
}

/// `ceil(value)` as an index, with the same clamping as [`floor_index`].
pub(crate) fn ceil_index(value: f64) -> usize {
    let floor = floor_index(value);
    #[allow(
        clippy::cast_precision_loss,
        reason = "Only used to detect a fractional remainder"
    )]
    let has_fraction = value > floor as f64;
    if has_fraction {
        floor.saturating_add(1)
    } else {
        floor
    }
}

/// Clamps `value` to `[0, max]`, treating a negative `max` as `0` and NaN as `0`.
pub(crate) fn clamp_non_negative(value: f64, max: f64) -> f64 {
    let max = max.max(0.0);
    if value.is_nan() || value <= 0.0 {
        0.0
    } else if value > max {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{ceil_index, clamp_non_negative, floor_index};

    #[test]
    fn floor_and_ceil_indices() {
        assert_eq!(floor_index(-3.5), 0);
        assert_eq!(floor_index(f64::NAN), 0);
        assert_eq!(floor_index(7.9), 7);
        assert_eq!(ceil_index(7.1), 8);
        assert_eq!(ceil_index(8.0), 8);
        assert_eq!(ceil_index(0.0), 0);
        assert_eq!(floor_index(f64::INFINITY), usize::MAX);
    }

    #[test]
    fn clamp_respects_bounds() {
        assert_eq!(clamp_non_negative(-1.0, 10.0), 0.0);
        assert_eq!(clamp_non_negative(11.0, 10.0), 10.0);
        assert_eq!(clamp_non_negative(5.0, -10.0), 0.0);
        assert_eq!(clamp_non_negative(5.0, 10.0), 5.0);
    }
}
