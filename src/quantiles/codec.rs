//! Wire forms of a quantile summary
//!
//! A summary is shipped as a [`Snapshot`]: its entries in ascending order plus
//! the observation count. Decoding inserts the entries straight into a fresh
//! store, so `g`, `delta` and sample IDs come back exactly as they were.
//! Skiplist levels are not part of the wire form and are redrawn.
//!
//! # Structured form
//!
//! With the `serde` feature, `Summary` serializes as
//! `{"data": [{"v": .., "g": .., "delta": .., "samples": [..]}, ..], "n": ..}`.
//!
//! # Binary form
//!
//! Little-endian, fixed header followed by variable-length entries:
//!
//! ```text
//! magic    [u8; 4]  "GKQS"
//! version  u32      1
//! n        u64
//! entries  u64
//! per entry:
//!   value    i64
//!   g        u64
//!   delta    u64
//!   samples  u32, then u64 * samples
//! ```

use super::config::SummaryConfig;
use super::summary::{Entry, Summary};
use crate::store::OrderedStore;
use crate::traits::DecodeError;
use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

const MAGIC: [u8; 4] = *b"GKQS";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 24;
/// Encoded size of an entry with no samples
const ENTRY_MIN_LEN: usize = 28;

/// Flattened summary state: ascending entries plus observation count
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Entries in ascending value order
    pub data: Vec<Entry>,
    /// Observations represented
    pub n: u64,
}

impl Snapshot {
    fn validate(&self) -> Result<(), DecodeError> {
        if self.data.windows(2).any(|w| w[0].value > w[1].value) {
            return Err(DecodeError::Corrupted("entries out of order".into()));
        }
        if self.data.iter().any(|e| e.g == 0) {
            return Err(DecodeError::Corrupted("entry with zero weight".into()));
        }
        if let Some(e) = self.data.iter().find(|e| e.delta > self.n) {
            return Err(DecodeError::Corrupted(format!(
                "entry delta {} exceeds count {}",
                e.delta, self.n
            )));
        }
        let mass = self
            .data
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.g))
            .ok_or_else(|| DecodeError::Corrupted("entry weights overflow".into()))?;
        if mass != self.n {
            return Err(DecodeError::Corrupted(format!(
                "entry weights sum to {} but count is {}",
                mass, self.n
            )));
        }
        Ok(())
    }
}

impl<S: OrderedStore<Entry>> Summary<S> {
    /// Copy out the entries and count
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            data: self.entries().cloned().collect(),
            n: self.n(),
        }
    }

    /// Replace this summary's contents with a snapshot
    ///
    /// The snapshot is checked before anything is touched: entries must be
    /// ascending, each must account for at least one observation with a
    /// `delta` no larger than `n`, and their weights must add up to `n`.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), DecodeError> {
        if let Err(err) = snapshot.validate() {
            debug!(%err, "rejected quantile summary snapshot");
            return Err(err);
        }
        self.load(snapshot.data, snapshot.n);
        Ok(())
    }

    /// Encode into the compact binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let samples: usize = self.entries().map(|e| e.samples.len()).sum();
        let mut buf = vec![0u8; HEADER_LEN + self.len() * ENTRY_MIN_LEN + samples * 8];

        buf[0..4].copy_from_slice(&MAGIC);
        LittleEndian::write_u32(&mut buf[4..8], VERSION);
        LittleEndian::write_u64(&mut buf[8..16], self.n());
        LittleEndian::write_u64(&mut buf[16..24], self.len() as u64);

        let mut pos = HEADER_LEN;
        for entry in self.entries() {
            LittleEndian::write_i64(&mut buf[pos..pos + 8], entry.value);
            LittleEndian::write_u64(&mut buf[pos + 8..pos + 16], entry.g);
            LittleEndian::write_u64(&mut buf[pos + 16..pos + 24], entry.delta);
            LittleEndian::write_u32(&mut buf[pos + 24..pos + 28], entry.samples.len() as u32);
            pos += ENTRY_MIN_LEN;
            for &id in &entry.samples {
                LittleEndian::write_u64(&mut buf[pos..pos + 8], id);
                pos += 8;
            }
        }
        buf
    }
}

impl Summary {
    /// Rebuild a summary from a snapshot
    pub fn from_snapshot(config: SummaryConfig, snapshot: Snapshot) -> Result<Self, DecodeError> {
        let mut summary = Summary::with_config(config);
        summary.restore(snapshot)?;
        Ok(summary)
    }

    /// Decode the compact binary form with the default configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_bytes_with_config(SummaryConfig::default(), bytes)
    }

    /// Decode the compact binary form
    pub fn from_bytes_with_config(config: SummaryConfig, bytes: &[u8]) -> Result<Self, DecodeError> {
        let snapshot = decode(bytes).map_err(|err| {
            debug!(%err, len = bytes.len(), "rejected quantile summary payload");
            err
        })?;
        Self::from_snapshot(config, snapshot)
    }
}

/// Bounds-checked little-endian cursor
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.saturating_add(len);
        if end > self.buf.len() {
            return Err(DecodeError::BufferTooShort {
                expected: end,
                found: self.buf.len(),
            });
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        self.take(4).map(LittleEndian::read_u32)
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        self.take(8).map(LittleEndian::read_u64)
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        self.take(8).map(LittleEndian::read_i64)
    }
}

fn decode(bytes: &[u8]) -> Result<Snapshot, DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::BufferTooShort {
            expected: HEADER_LEN,
            found: bytes.len(),
        });
    }
    let mut r = Reader { buf: bytes, pos: 0 };
    if r.take(4)? != &MAGIC[..] {
        return Err(DecodeError::InvalidHeader);
    }
    let version = r.u32()?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let n = r.u64()?;
    let claimed = r.u64()?;

    // Every entry needs at least ENTRY_MIN_LEN bytes, so a count the input
    // cannot hold is rejected before allocating for it.
    let count = match usize::try_from(claimed) {
        Ok(count) if count <= r.remaining() / ENTRY_MIN_LEN => count,
        _ => {
            return Err(DecodeError::BufferTooShort {
                expected: usize::try_from(claimed)
                    .unwrap_or(usize::MAX)
                    .saturating_mul(ENTRY_MIN_LEN)
                    .saturating_add(HEADER_LEN),
                found: bytes.len(),
            })
        }
    };

    let mut data = Vec::with_capacity(count);
    for _ in 0..count {
        let value = r.i64()?;
        let g = r.u64()?;
        let delta = r.u64()?;
        let sample_count = r.u32()? as usize;
        if sample_count > r.remaining() / 8 {
            return Err(DecodeError::BufferTooShort {
                expected: r.pos.saturating_add(sample_count.saturating_mul(8)),
                found: bytes.len(),
            });
        }
        let samples = (0..sample_count)
            .map(|_| r.u64())
            .collect::<Result<Vec<u64>, DecodeError>>()?;
        data.push(Entry {
            value,
            g,
            delta,
            samples,
        });
    }

    if r.remaining() != 0 {
        return Err(DecodeError::Corrupted(format!(
            "{} trailing bytes",
            r.remaining()
        )));
    }
    Ok(Snapshot { data, n })
}

#[cfg(feature = "serde")]
impl<S: OrderedStore<Entry>> serde::Serialize for Summary<S> {
    fn serialize<Z>(&self, serializer: Z) -> Result<Z::Ok, Z::Error>
    where
        Z: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Summary", 2)?;
        state.serialize_field("data", &SerializeEntries(self))?;
        state.serialize_field("n", &self.n())?;
        state.end()
    }
}

#[cfg(feature = "serde")]
struct SerializeEntries<'a, S>(&'a Summary<S>);

#[cfg(feature = "serde")]
impl<S: OrderedStore<Entry>> serde::Serialize for SerializeEntries<'_, S> {
    fn serialize<Z>(&self, serializer: Z) -> Result<Z::Ok, Z::Error>
    where
        Z: serde::Serializer,
    {
        serializer.collect_seq(self.0.entries())
    }
}

/// Decodes with the default configuration; rejected snapshots surface as
/// the format's error.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Summary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let snapshot = <Snapshot as serde::Deserialize>::deserialize(deserializer)?;
        Summary::from_snapshot(SummaryConfig::default(), snapshot).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
