//! Quantile estimation
//!
//! This module provides a streaming quantile summary with a bounded rank
//! error, plus the wire forms used to ship it between processes.
//!
//! # Algorithms
//!
//! - [`Summary`]: Greenwald-Khanna summary over `i64` measurements, with
//!   sample IDs carried alongside each answer
//!
//! # Example
//!
//! ```
//! use gkstream::quantiles::{Summary, SummaryConfig};
//! use gkstream::traits::{QuantileSketch, Sketch};
//!
//! let mut shard_a = Summary::with_config(SummaryConfig::new(0.01));
//! let mut shard_b = Summary::with_config(SummaryConfig::new(0.01));
//!
//! for span_id in 0..1_000u64 {
//!     let micros = (span_id * 37 % 1_000) as i64;
//!     if span_id % 2 == 0 {
//!         shard_a.insert(micros, span_id);
//!     } else {
//!         shard_b.insert(micros, span_id);
//!     }
//! }
//!
//! shard_a.merge(&shard_b).unwrap();
//! assert_eq!(shard_a.count(), 1_000);
//! println!("p99: {:?}", shard_a.quantile(0.99));
//! ```

mod codec;
mod config;
mod summary;

#[cfg(test)]
mod testdata;

pub use codec::Snapshot;
pub use config::{SummaryConfig, DEFAULT_EPSILON};
pub use summary::{Entry, Estimate, Slice, Summary};

/// `k` evenly spaced quantiles covering `[0, 1]`
///
/// `i / (k - 1)` for `i` in `0..k`. A single rung is the median and zero
/// rungs yield nothing.
///
/// ```
/// use gkstream::quantiles::evenly_spaced;
///
/// assert_eq!(evenly_spaced(3), vec![0.0, 0.5, 1.0]);
/// assert_eq!(evenly_spaced(1), vec![0.5]);
/// ```
pub fn evenly_spaced(k: usize) -> Vec<f64> {
    match k {
        0 => Vec::new(),
        1 => vec![0.5],
        _ => (0..k).map(|i| i as f64 / (k - 1) as f64).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evenly_spaced() {
        assert!(evenly_spaced(0).is_empty());
        assert_eq!(evenly_spaced(1), vec![0.5]);
        assert_eq!(evenly_spaced(2), vec![0.0, 1.0]);
        assert_eq!(evenly_spaced(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_evenly_spaced_endpoints() {
        let ladder = evenly_spaced(7);
        assert_eq!(ladder.len(), 7);
        assert_eq!(ladder[0], 0.0);
        assert_eq!(ladder[6], 1.0);
        assert!(ladder.windows(2).all(|w| w[0] < w[1]));
    }
}
