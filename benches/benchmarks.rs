//! Benchmarks for gkstream
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use gkstream::quantiles::{Summary, SummaryConfig};
use gkstream::store::{Keyed, OrderedStore, Skiplist};
use gkstream::traits::{QuantileSketch, Sketch};

/// xorshift stream so every run sees the same values
fn values(len: usize) -> Vec<i64> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 20) as i64
        })
        .collect()
}

fn filled(len: usize) -> Summary {
    let mut s = Summary::with_seed(SummaryConfig::default(), 1);
    for (i, v) in values(len).into_iter().enumerate() {
        s.insert(v, i as u64);
    }
    s
}

// ============================================================================
// Skiplist Benchmarks
// ============================================================================

#[derive(Clone, Debug)]
struct Key(i64);

impl Keyed for Key {
    type Key = i64;
    fn key(&self) -> i64 {
        self.0
    }
}

fn bench_skiplist(c: &mut Criterion) {
    let mut group = c.benchmark_group("skiplist");
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_remove_10k", |b| {
        let mut list = Skiplist::new();
        for v in values(10_000) {
            list.insert(Key(v));
        }
        let mut i = 0i64;
        b.iter(|| {
            let h = list.insert(Key(black_box(i.wrapping_mul(2_654_435_761))));
            list.remove(h);
            i = i.wrapping_add(1);
        });
    });

    group.bench_function("iterate_10k", |b| {
        let mut list = Skiplist::new();
        for v in values(10_000) {
            list.insert(Key(v));
        }
        b.iter(|| black_box(list.iter().map(|k| k.0).fold(0i64, i64::wrapping_add)));
    });

    group.finish();
}

// ============================================================================
// Summary Benchmarks
// ============================================================================

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("gk_summary");
    group.throughput(Throughput::Elements(1));

    for epsilon in [0.001, 0.01, 0.05] {
        group.bench_function(format!("insert_eps{}", epsilon), |b| {
            let mut s = Summary::with_config(SummaryConfig::new(epsilon));
            let input = values(1 << 16);
            let mut i = 0usize;
            b.iter(|| {
                s.insert(input[i & 0xFFFF], i as u64);
                i = i.wrapping_add(1);
            });
        });
    }

    group.bench_function("query", |b| {
        let s = filled(100_000);
        b.iter(|| black_box(s.query(0.99).map(|est| est.value)));
    });

    group.bench_function("rank", |b| {
        let s = filled(100_000);
        b.iter(|| black_box(s.rank(&(1 << 40))));
    });

    group.bench_function("by_slices", |b| {
        let s = filled(100_000);
        b.iter(|| black_box(s.by_slices(4).len()));
    });

    group.bench_function("merge", |b| {
        let s1 = filled(10_000);
        let s2 = filled(10_000);
        b.iter(|| {
            let mut s = s1.clone();
            s.merge(black_box(&s2)).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Codec Benchmarks
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let s = filled(100_000);
    let bytes = s.to_bytes();

    group.bench_function("to_bytes", |b| {
        b.iter(|| black_box(s.to_bytes()));
    });

    group.bench_function("from_bytes", |b| {
        b.iter(|| black_box(Summary::from_bytes(black_box(&bytes)).unwrap().count()));
    });

    #[cfg(feature = "serde")]
    group.bench_function("json_roundtrip", |b| {
        b.iter(|| {
            let text = serde_json::to_string(&s).unwrap();
            let back: Summary = serde_json::from_str(&text).unwrap();
            black_box(back.count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_skiplist, bench_summary, bench_codec);
criterion_main!(benches);
