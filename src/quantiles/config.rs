//! Accuracy configuration for quantile summaries

/// Default rank error bound, as a fraction of the observation count
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Construction-time parameters of a [`Summary`](super::Summary)
///
/// Configuration is always handed to the summary explicitly; there is no
/// process-wide default that can change under a running pipeline.
///
/// With the `serde` feature the struct can be embedded in a larger
/// configuration file; missing fields fall back to their defaults.
///
/// # Example
///
/// ```
/// use gkstream::quantiles::SummaryConfig;
///
/// let config = SummaryConfig::new(0.005);
/// assert_eq!(config.compress_period(), 100);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SummaryConfig {
    /// Maximum rank error of any answer, as a fraction of N
    pub epsilon: f64,
}

impl SummaryConfig {
    /// Create a configuration with the given error bound
    ///
    /// # Panics
    ///
    /// Panics if `epsilon` is not finite or not in `(0, 1)`.
    pub fn new(epsilon: f64) -> Self {
        let config = Self { epsilon };
        config.validate();
        config
    }

    pub(crate) fn validate(&self) {
        assert!(
            self.epsilon.is_finite() && self.epsilon > 0.0 && self.epsilon < 1.0,
            "epsilon must be in (0, 1), got {}",
            self.epsilon
        );
    }

    /// Number of value inserts between automatic compress passes
    ///
    /// `ceil(1 / (2 * epsilon))`, never less than one.
    pub fn compress_period(&self) -> u64 {
        ((1.0 / (2.0 * self.epsilon)).ceil() as u64).max(1)
    }

    /// Whether two configurations describe the same accuracy
    ///
    /// Uses a relative tolerance so values that went through a text encoding
    /// still compare equal.
    pub fn is_compatible(&self, other: &Self) -> bool {
        let avg = (self.epsilon + other.epsilon) * 0.5;
        let diff = (self.epsilon - other.epsilon).abs();
        avg <= 0.0 || diff / avg <= 1e-9
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}
