//! # gkstream
//!
//! Mergeable streaming quantiles for Rust.
//!
//! gkstream keeps an epsilon-approximate picture of a numeric stream, such as
//! span latencies in a tracing agent, without storing every observation.
//! Every observation carries an opaque sample ID, so an answer like "the p99
//! is 41ms" comes with a concrete record that produced it.
//!
//! ## Features
//!
//! - **Quantile Estimation**: Greenwald-Khanna summary with rank error at most `epsilon * N`
//! - **Exact Extremes**: `quantile(0.0)` and `quantile(1.0)` are the true minimum and maximum
//! - **Mergeability**: summaries from separate workers fold into one
//! - **Histograms**: contiguous value slices with weight bounds and samples
//! - **Serialization**: structured (serde) and compact binary wire forms
//! - **Pluggable Storage**: the summary runs on any [`OrderedStore`](store::OrderedStore)
//!
//! ## Quick Start
//!
//! ```rust
//! use gkstream::prelude::*;
//!
//! let mut latencies = Summary::new();
//! for (span_id, micros) in [(11, 120), (12, 480), (13, 95), (14, 310)] {
//!     latencies.insert(micros, span_id);
//! }
//!
//! let p50 = latencies.query(0.5).unwrap();
//! println!("median ~{}us, e.g. span {:?}", p50.value, p50.samples);
//! ```
//!
//! ## Distributed Computing
//!
//! Summaries implement the [`Sketch`](traits::Sketch) trait, whose `merge`
//! combines partial summaries computed per shard or per host:
//!
//! ```rust
//! use gkstream::quantiles::Summary;
//! use gkstream::traits::Sketch;
//!
//! let mut worker1 = Summary::new();
//! let mut worker2 = Summary::new();
//!
//! worker1.insert(250, 1);
//! worker2.insert(900, 2);
//!
//! let payload = worker2.to_bytes();
//! worker1.merge(&Summary::from_bytes(&payload).unwrap()).unwrap();
//! assert_eq!(worker1.count(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): `Serialize`/`Deserialize` for summaries, snapshots
//!   and configuration

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod traits;

pub mod quantiles;
pub mod store;

pub mod prelude {
    pub use crate::quantiles::{Estimate, Slice, Summary, SummaryConfig};
    pub use crate::store::OrderedStore;
    pub use crate::traits::*;
}

pub use quantiles::{Summary, SummaryConfig};
