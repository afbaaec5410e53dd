//! Greenwald-Khanna quantile summary
//!
//! A [`Summary`] answers rank queries over a stream of `i64` measurements
//! with a rank error of at most `epsilon * N`, while keeping only a small,
//! sorted set of [`Entry`] values. Every observation carries an opaque
//! sample ID; IDs survive compression and merging so an approximate answer
//! can be traced back to a concrete source record.
//!
//! Each entry stores:
//! - `g`: how many observations it accounts for (the gap to its predecessor's
//!   minimum rank)
//! - `delta`: how far its maximum rank can exceed its minimum rank
//!
//! The minimum rank of the i-th entry is the sum of `g` up to and including
//! it, so `sum(g) == N` at all times, and the first and last entries always
//! have `delta == 0`, which makes `quantile(0.0)` and `quantile(1.0)` exact.
//!
//! # Merging
//!
//! [`Sketch::merge`] inserts every entry of the other summary unchanged and
//! then runs one compress pass. This is an approximate merge: summaries of
//! similar size stay within roughly `2 * epsilon * N`.
//!
//! # Thread Safety
//!
//! `Summary` has no interior mutability and is `Send + Sync`. Mutations take
//! `&mut self`, so a single writer is enforced by the borrow checker. For a
//! summary shared between threads use `Arc<RwLock<Summary>>`: queries take
//! the read lock, inserts and merges take the write lock.

use super::config::SummaryConfig;
use crate::store::{GeometricLevels, Keyed, OrderedStore, Skiplist};
use crate::traits::{MergeError, QuantileSketch, Sketch};
use core::fmt::Debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Seed offset so the retention coin and the level coin of a seeded
/// summary do not replay the same sequence.
const RETENTION_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// A compressed run of one or more observations
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// Measurement this entry stands for
    #[cfg_attr(feature = "serde", serde(rename = "v"))]
    pub value: i64,
    /// Observations accounted for by this entry
    pub g: u64,
    /// Rank uncertainty between minimum and maximum rank
    pub delta: u64,
    /// Sample IDs of observations folded into this entry
    pub samples: Vec<u64>,
}

impl Entry {
    /// Entry for a single fresh observation
    pub fn new(value: i64, sample_id: u64) -> Self {
        Self {
            value,
            g: 1,
            delta: 0,
            samples: vec![sample_id],
        }
    }
}

impl Keyed for Entry {
    type Key = i64;

    fn key(&self) -> i64 {
        self.value
    }
}

/// Answer to a quantile query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Estimate<'a> {
    /// Approximate quantile value
    pub value: i64,
    /// Sample IDs of observations recorded with this value
    pub samples: &'a [u64],
}

/// One bucket of the histogram produced by [`Summary::by_slices`]
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slice {
    /// Lower value boundary (exclusive)
    pub start: i64,
    /// Upper value boundary (inclusive)
    pub end: i64,
    /// Upper bound on the observations falling in `(start, end]`
    pub weight: u64,
    /// Representative sample IDs for the bucket
    pub samples: Vec<u64>,
}

/// Streaming epsilon-approximate quantile summary
///
/// # Example
///
/// ```
/// use gkstream::quantiles::Summary;
/// use gkstream::traits::Sketch;
///
/// let mut latencies = Summary::new();
/// for (span_id, micros) in [(1, 120), (2, 340), (3, 95), (4, 410)] {
///     latencies.insert(micros, span_id);
/// }
///
/// let p50 = latencies.query(0.5).unwrap();
/// assert!(p50.value == 120 || p50.value == 340);
/// assert_eq!(latencies.count(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct Summary<S = Skiplist<Entry>> {
    config: SummaryConfig,
    store: S,
    /// Observations represented, including merged ones
    n: u64,
    /// Value inserts since the last automatic compress
    inserts: u64,
    period: u64,
    rng: SmallRng,
}

impl Summary {
    /// Create an empty summary with the default configuration
    pub fn new() -> Self {
        Self::with_config(SummaryConfig::default())
    }

    /// Create an empty summary with the given configuration
    ///
    /// # Panics
    ///
    /// Panics if `config.epsilon` is not in `(0, 1)`.
    pub fn with_config(config: SummaryConfig) -> Self {
        Self::with_store(config, Skiplist::new())
    }

    /// Create an empty summary whose random choices are reproducible
    ///
    /// The seed drives both skiplist level draws and the sample retained when
    /// two entries are folded together.
    pub fn with_seed(config: SummaryConfig, seed: u64) -> Self {
        config.validate();
        Self::from_parts(
            config,
            Skiplist::with_policy(GeometricLevels::seeded(seed)),
            SmallRng::seed_from_u64(seed ^ RETENTION_SEED_MIX),
        )
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OrderedStore<Entry>> Summary<S> {
    /// Create an empty summary on top of a caller-supplied store
    ///
    /// # Panics
    ///
    /// Panics if `config.epsilon` is not in `(0, 1)`.
    pub fn with_store(config: SummaryConfig, store: S) -> Self {
        config.validate();
        Self::from_parts(config, store, SmallRng::from_entropy())
    }

    fn from_parts(config: SummaryConfig, mut store: S, rng: SmallRng) -> Self {
        store.clear();
        Self {
            config,
            store,
            n: 0,
            inserts: 0,
            period: config.compress_period(),
            rng,
        }
    }

    /// Configuration this summary was built with
    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Rank error bound as a fraction of the observation count
    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    pub(crate) fn n(&self) -> u64 {
        self.n
    }

    /// Number of entries currently kept
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Entries in ascending value order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.store.iter()
    }

    /// Current error budget `floor(2 * epsilon * N)`
    fn budget(&self) -> u64 {
        (2.0 * self.config.epsilon * self.n as f64).floor() as u64
    }

    /// Record one observation
    ///
    /// Interior observations get `delta = floor(2 * epsilon * N)`, capped at
    /// `N - 1` since no rank can be less certain than that; a new minimum or
    /// maximum stays exact. A compress pass runs every
    /// [`SummaryConfig::compress_period`] inserts.
    pub fn insert(&mut self, value: i64, sample_id: u64) {
        let handle = self.store.insert(Entry::new(value, sample_id));
        self.n += 1;

        if self.store.prev(handle).is_some() && self.store.next(handle).is_some() {
            let delta = self.budget().min(self.n - 1);
            self.store.get_mut(handle).delta = delta;
        }

        self.inserts += 1;
        if self.inserts >= self.period {
            self.inserts = 0;
            self.compress();
        }
    }

    /// Fold adjacent entries whose combined uncertainty fits the error budget
    ///
    /// One left-to-right pass. An entry is folded into its successor when
    /// both hold the same value, or when it is not the first entry and
    /// `cur.g + next.g + next.delta` is below `floor(2 * epsilon * N)`. The
    /// folded entry's `g` moves to the successor, which keeps either its own
    /// samples or the folded ones with equal probability.
    ///
    /// Never increases the entry count.
    pub fn compress(&mut self) {
        let Some(mut cur) = self.store.first() else {
            return;
        };
        let budget = self.budget();
        let before = self.store.len();

        while let Some(next) = self.store.next(cur) {
            let current = self.store.get(cur);
            let successor = self.store.get(next);
            let fold = current.value == successor.value
                || (self.store.prev(cur).is_some()
                    && current
                        .g
                        .saturating_add(successor.g)
                        .saturating_add(successor.delta)
                        < budget);

            if fold {
                let folded = self.store.remove(cur);
                let keep_folded = self.rng.gen::<bool>();
                let target = self.store.get_mut(next);
                target.g += folded.g;
                if keep_folded {
                    target.samples = folded.samples;
                }
            }
            cur = next;
        }

        // sum(g) == N, so both extremes are known exactly
        if let Some(first) = self.store.first() {
            self.store.get_mut(first).delta = 0;
        }
        if let Some(last) = self.store.last() {
            self.store.get_mut(last).delta = 0;
        }

        trace!(
            n = self.n,
            budget,
            before,
            after = self.store.len(),
            "compressed quantile summary"
        );
    }

    fn estimate(&self, handle: S::Handle) -> Estimate<'_> {
        let entry = self.store.get(handle);
        Estimate {
            value: entry.value,
            samples: &entry.samples,
        }
    }

    /// Approximate value at quantile `q`
    ///
    /// `q <= 0` and `q >= 1` return the exact minimum and maximum. For other
    /// `q` the returned value's rank is within `epsilon * N` of `q * N`.
    ///
    /// Returns `None` when the summary is empty or `q` is NaN.
    pub fn query(&self, q: f64) -> Option<Estimate<'_>> {
        if q.is_nan() {
            return None;
        }
        let first = self.store.first()?;
        if q <= 0.0 {
            return Some(self.estimate(first));
        }
        if q >= 1.0 {
            return self.store.last().map(|last| self.estimate(last));
        }

        let target = (q * self.n as f64 + 0.5) as u64;
        let slack = (self.config.epsilon * self.n as f64).floor() as u64;

        let mut rmin = 0u64;
        let mut cur = first;
        loop {
            rmin = rmin.saturating_add(self.store.get(cur).g);
            let Some(next) = self.store.next(cur) else {
                return Some(self.estimate(cur));
            };
            let successor = self.store.get(next);
            let rmax = rmin
                .saturating_add(successor.g)
                .saturating_add(successor.delta);
            if target.saturating_add(slack) < rmax {
                let pick = if rmin.saturating_add(slack) >= target {
                    cur
                } else {
                    next
                };
                return Some(self.estimate(pick));
            }
            cur = next;
        }
    }

    /// Contiguous histogram over the observed value range
    ///
    /// One slice per adjacent entry pair, ascending, each keeping at most
    /// `max_samples` of the upper entry's sample IDs.
    pub fn by_slices(&self, max_samples: usize) -> Vec<Slice> {
        self.store
            .iter()
            .zip(self.store.iter().skip(1))
            .map(|(prev, cur)| Slice {
                start: prev.value,
                end: cur.value,
                weight: cur.g.saturating_add(cur.delta).saturating_sub(1),
                samples: cur.samples.iter().take(max_samples).copied().collect(),
            })
            .collect()
    }

    /// One sample ID per rung of an evenly spaced quantile ladder
    ///
    /// Queries [`evenly_spaced(k)`](super::evenly_spaced) and keeps the first
    /// sample ID of each answer, dropping repeats while preserving ladder
    /// order.
    pub fn representative_samples(&self, k: usize) -> Vec<u64> {
        let mut picked = Vec::with_capacity(k);
        for q in super::evenly_spaced(k) {
            if let Some(&id) = self.query(q).and_then(|est| est.samples.first()) {
                if !picked.contains(&id) {
                    picked.push(id);
                }
            }
        }
        picked
    }

    /// Replace the contents with already-compressed entries
    pub(crate) fn load(&mut self, entries: Vec<Entry>, n: u64) {
        self.store.clear();
        for entry in entries {
            self.store.insert(entry);
        }
        self.n = n;
        self.inserts = 0;
    }
}

impl<S> Sketch for Summary<S>
where
    S: OrderedStore<Entry> + Clone + Debug,
{
    /// `(value, sample_id)`
    type Item = (i64, u64);

    fn update(&mut self, item: &(i64, u64)) {
        self.insert(item.0, item.1);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        if other.n == 0 {
            return Ok(());
        }
        if !self.config.is_compatible(&other.config) {
            debug!(
                expected = self.config.epsilon,
                found = other.config.epsilon,
                "rejected merge of incompatible summaries"
            );
            return Err(MergeError::IncompatibleConfig {
                expected: format!("epsilon={}", self.config.epsilon),
                found: format!("epsilon={}", other.config.epsilon),
            });
        }

        self.n += other.n;
        for entry in other.store.iter() {
            self.store.insert(entry.clone());
        }
        self.compress();

        debug!(
            n = self.n,
            merged = other.n,
            entries = self.store.len(),
            "merged quantile summary"
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.store.clear();
        self.n = 0;
        self.inserts = 0;
    }

    fn size_bytes(&self) -> usize {
        let samples: usize = self
            .store
            .iter()
            .map(|e| e.samples.capacity() * core::mem::size_of::<u64>())
            .sum();
        core::mem::size_of::<Self>() - core::mem::size_of::<S>() + self.store.size_bytes() + samples
    }

    fn count(&self) -> u64 {
        self.n
    }
}

impl<S> QuantileSketch for Summary<S>
where
    S: OrderedStore<Entry> + Clone + Debug,
{
    type Value = i64;

    /// Records `value` with its arrival ordinal as the sample ID
    ///
    /// The ordinal is the current count, which jumps by the other side's
    /// count on every merge. IDs handed out here are only unique within a
    /// summary that has never been merged into; pass explicit IDs to
    /// [`Summary::insert`] when summaries are combined.
    fn add(&mut self, value: i64) {
        let ordinal = self.n;
        self.insert(value, ordinal);
    }

    fn quantile(&self, rank: f64) -> Option<i64> {
        self.query(rank).map(|est| est.value)
    }

    /// Fraction of observations at or below `value`, by minimum rank
    fn rank(&self, value: &i64) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let below: u64 = self
            .store
            .iter()
            .take_while(|e| e.value <= *value)
            .map(|e| e.g)
            .sum();
        below as f64 / self.n as f64
    }

    fn min(&self) -> Option<i64> {
        self.store.first().map(|h| self.store.get(h).value)
    }

    fn max(&self) -> Option<i64> {
        self.store.last().map(|h| self.store.get(h).value)
    }
}

// ============================================================================
// Tests
// ============================================================================
