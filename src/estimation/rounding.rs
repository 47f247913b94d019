//! Rounding and uncertainty ranges
//!
//! The only two presentation primitives used by the rest of the crate:
//! half-up rounding and symmetric fractional ranges. Estimators keep
//! unrounded values internally and round only when presenting.

use serde::{Deserialize, Serialize};

/// Default presentation precision (whole grams / whole calories)
pub const DEFAULT_PRECISION: u32 = 0;

/// Round half-up at the given number of decimal digits
pub fn round(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor + 0.5).floor() / factor
}

/// A `[low, high]` uncertainty interval, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Unrounded symmetric interval around `value`, with the low bound floored at zero
    pub fn around(value: f64, variance: f64) -> Self {
        Self {
            low: (value * (1.0 - variance)).max(0.0),
            high: value * (1.0 + variance),
        }
    }

    /// Multiply both bounds by `factor`
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            low: self.low * factor,
            high: self.high * factor,
        }
    }

    pub fn rounded(&self, digits: u32) -> Self {
        Self {
            low: round(self.low, digits),
            high: round(self.high, digits),
        }
    }

    /// Whether `value` lies inside the interval and the interval is non-negative
    pub fn brackets(&self, value: f64) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && self.low >= 0.0
            && self.low <= value
            && value <= self.high
    }
}

impl From<[f64; 2]> for Range {
    fn from(bounds: [f64; 2]) -> Self {
        Self::new(bounds[0], bounds[1])
    }
}

impl From<Range> for [f64; 2] {
    fn from(range: Range) -> Self {
        [range.low, range.high]
    }
}

impl std::ops::Add for Range {
    type Output = Range;

    fn add(self, other: Range) -> Range {
        Range::new(self.low + other.low, self.high + other.high)
    }
}

impl std::iter::Sum for Range {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Range::default(), |acc, r| acc + r)
    }
}

/// Build a presentation range around `value` at the default precision
pub fn build_range(value: f64, variance: f64) -> Range {
    build_range_with_precision(value, variance, DEFAULT_PRECISION)
}

pub fn build_range_with_precision(value: f64, variance: f64, digits: u32) -> Range {
    Range::around(value, variance).rounded(digits)
}
