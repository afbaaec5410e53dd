//! Core traits for streaming summaries
//!
//! Every summary implements the base [`Sketch`] trait, with [`QuantileSketch`]
//! layered on top for rank queries. The error types shared by merge and
//! decode paths live here as well.

use core::fmt::Debug;

/// Why two summaries could not be combined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The summaries were built with different error bounds. Both sides are
    /// rendered as `epsilon=<value>`.
    IncompatibleConfig {
        expected: String,
        found: String,
    },
}

impl core::fmt::Display for MergeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MergeError::IncompatibleConfig { expected, found } => {
                write!(f, "incompatible config: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// Why a wire payload or snapshot was rejected
///
/// Decoding never leaves a summary half-loaded: on any of these errors the
/// target keeps its previous contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before a declared field or count could be read
    BufferTooShort { expected: usize, found: usize },
    /// Payload does not start with the `GKQS` magic
    InvalidHeader,
    /// Binary layout version this build cannot read
    UnsupportedVersion(u32),
    /// Framing was readable but the entries are inconsistent (out of order,
    /// zero weight, oversized delta, weights not matching the count, or
    /// trailing bytes)
    Corrupted(String),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::BufferTooShort { expected, found } => {
                write!(f, "buffer too short: expected {}, found {}", expected, found)
            }
            DecodeError::InvalidHeader => write!(f, "invalid header"),
            DecodeError::UnsupportedVersion(v) => write!(f, "unsupported version: {}", v),
            DecodeError::Corrupted(msg) => write!(f, "corrupted data: {}", msg),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A mergeable stream summary
///
/// Implementors absorb items one at a time and can be combined with another
/// instance built under the same configuration, so per-worker summaries can
/// be folded into one view.
pub trait Sketch: Clone + Debug {
    /// What one observation looks like
    type Item: ?Sized;

    /// Record one observation
    fn update(&mut self, item: &Self::Item);

    /// Fold `other` into `self`
    ///
    /// An empty `other` is a no-op that succeeds regardless of its
    /// configuration. A configuration mismatch is reported as
    /// [`MergeError::IncompatibleConfig`] and leaves `self` unchanged.
    fn merge(&mut self, other: &Self) -> Result<(), MergeError>;

    /// Drop every observation, keeping the configuration
    fn clear(&mut self);

    /// Approximate heap and inline footprint
    fn size_bytes(&self) -> usize;

    /// Observations represented, merged ones included
    fn count(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Rank queries over an ordered value domain
pub trait QuantileSketch: Sketch {
    type Value: PartialOrd + Clone;

    /// Record a value without a caller-chosen identity
    fn add(&mut self, value: Self::Value);

    /// Value whose rank is close to `rank * count`
    ///
    /// `None` when nothing has been recorded. Ranks at or below 0 and at or
    /// above 1 give the exact minimum and maximum.
    fn quantile(&self, rank: f64) -> Option<Self::Value>;

    /// Fraction of observations at or below `value`, in `[0, 1]`; 0 when empty
    fn rank(&self, value: &Self::Value) -> f64;

    fn cdf(&self, value: &Self::Value) -> f64 {
        self.rank(value)
    }

    /// Smallest value recorded, `None` when empty
    fn min(&self) -> Option<Self::Value>;

    /// Largest value recorded, `None` when empty
    fn max(&self) -> Option<Self::Value>;

    fn median(&self) -> Option<Self::Value> {
        self.quantile(0.5)
    }

    /// One [`quantile`](Self::quantile) answer per requested rank, in order
    fn quantiles(&self, ranks: &[f64]) -> Vec<Option<Self::Value>> {
        ranks.iter().map(|&r| self.quantile(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_error_display_names_both_sides() {
        let err = MergeError::IncompatibleConfig {
            expected: "epsilon=0.01".into(),
            found: "epsilon=0.05".into(),
        };
        assert_eq!(
            err.to_string(),
            "incompatible config: expected epsilon=0.01, found epsilon=0.05"
        );
    }

    #[test]
    fn decode_error_display() {
        assert_eq!(
            DecodeError::BufferTooShort {
                expected: 24,
                found: 3
            }
            .to_string(),
            "buffer too short: expected 24, found 3"
        );
        assert_eq!(DecodeError::InvalidHeader.to_string(), "invalid header");
        assert_eq!(
            DecodeError::UnsupportedVersion(7).to_string(),
            "unsupported version: 7"
        );
        assert_eq!(
            DecodeError::Corrupted("trailing bytes".into()).to_string(),
            "corrupted data: trailing bytes"
        );
    }
}
