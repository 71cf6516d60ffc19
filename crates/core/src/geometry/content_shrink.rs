//! Content-aware shrink percentages.
//!
//! Detection-accuracy preprocessing only: the image is content-aware
//! shrunk to `shrink%` and re-expanded by the compensating `restore%`
//! before the first detection pass, leaving overall dimensions unchanged.
//! Unrelated to the pupil-alignment geometry.

use crate::shared::constants::DEFAULT_SHRINK_PERCENT;

/// Valid shrink percentages. A documented fallback, not error suppression:
/// anything non-numeric or outside the range becomes the default.
const SHRINK_RANGE: std::ops::RangeInclusive<u32> = 1..=200;

/// Normalizes a raw shrink value (as carried in upload metadata).
pub fn shrink_percent(raw: Option<&str>) -> u32 {
    match raw.and_then(|s| s.trim().parse::<u32>().ok()) {
        Some(p) if SHRINK_RANGE.contains(&p) => p,
        _ => DEFAULT_SHRINK_PERCENT,
    }
}

/// Compensating re-expansion percentage: `floor(100 * (100 / shrink))`.
///
/// Applying `shrink%` then `restore%` restores the original dimensions to
/// within rounding.
pub fn restore_percent(shrink: u32) -> u32 {
    debug_assert!(SHRINK_RANGE.contains(&shrink));
    10_000 / shrink
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("0"), 50)]
    #[case(Some("201"), 50)]
    #[case(Some("abc"), 50)]
    #[case(Some("-5"), 50)]
    #[case(None, 50)]
    #[case(Some("1"), 1)]
    #[case(Some("200"), 200)]
    #[case(Some("80"), 80)]
    #[case(Some(" 80 "), 80)]
    fn test_shrink_percent_clamps(#[case] raw: Option<&str>, #[case] expected: u32) {
        assert_eq!(shrink_percent(raw), expected);
    }

    #[rstest]
    #[case(80, 125)]
    #[case(50, 200)]
    #[case(100, 100)]
    #[case(3, 3333)]
    #[case(200, 50)]
    fn test_restore_percent_floors(#[case] shrink: u32, #[case] expected: u32) {
        assert_eq!(restore_percent(shrink), expected);
    }
}
