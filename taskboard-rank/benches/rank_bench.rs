//! Benchmarks for rank generation and rebalancing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use taskboard_rank::{spread, Rank};

/// Benchmark inserting between two close neighbours
fn bench_between(c: &mut Criterion) {
    let low = Rank::parse("i0000k").unwrap();
    let high = Rank::parse("i0000l").unwrap();

    c.bench_function("between_adjacent", |b| {
        b.iter(|| Rank::between(black_box(&low), black_box(&high)))
    });
}

/// Benchmark appending a long run of records
fn bench_append(c: &mut Criterion) {
    c.bench_function("append_1000", |b| {
        b.iter(|| {
            let mut rank = Rank::middle();
            for _ in 0..1000 {
                rank = match rank.next() {
                    Ok(next) => next,
                    Err(_) => break,
                };
            }
            black_box(rank)
        })
    });
}

/// Benchmark rebalancing containers of different sizes
fn bench_spread(c: &mut Criterion) {
    let mut group = c.benchmark_group("spread");
    for count in [10usize, 1_000, 100_000] {
        group.bench_function(count.to_string(), |b| b.iter(|| spread(black_box(count))));
    }
    group.finish();
}

criterion_group!(benches, bench_between, bench_append, bench_spread);
criterion_main!(benches);
