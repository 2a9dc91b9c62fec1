//! Trampoline Overhead Benchmarks
//!
//! Compares plain recursion with the same functions run on the trampoline:
//! - Fibonacci without memoization (every call becomes a frame)
//! - Fibonacci with memoization (one frame per distinct argument)
//! - Linear-depth summation beyond what the native stack allows
//!
//! Run with:
//!   cargo bench --bench trampoline_overhead

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iterec::demos::{native, Demos};
use iterec::TrampolineConfig;
use std::time::Duration;

fn demos(memoize: bool) -> Demos {
    Demos::with_config(TrampolineConfig {
        memoize,
        ..TrampolineConfig::default()
    })
}

/// Benchmark native vs trampolined Fibonacci
fn bench_fib(c: &mut Criterion) {
    let mut group = c.benchmark_group("fibonacci");
    group.measurement_time(Duration::from_secs(5));

    let memo = demos(true);
    let no_memo = demos(false);

    for n in [15i64, 20] {
        group.bench_with_input(BenchmarkId::new("native", n), &n, |b, &n| {
            b.iter(|| native::fib(black_box(n)));
        });
        group.bench_with_input(BenchmarkId::new("trampoline_memo", n), &n, |b, &n| {
            b.iter(|| memo.trampoline.invoke(memo.ifib1, [black_box(n)]));
        });
        group.bench_with_input(BenchmarkId::new("trampoline_no_memo", n), &n, |b, &n| {
            b.iter(|| no_memo.trampoline.invoke(no_memo.ifib1, [black_box(n)]));
        });
    }

    group.finish();
}

/// Benchmark per-frame cost on a linear chain
fn bench_linear_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_depth");
    group.sample_size(20); // Deep chains allocate one frame per level

    let memo = demos(true);
    let no_memo = demos(false);

    group.bench_function("native_sum_to_10k", |b| {
        b.iter(|| native::sum_to(black_box(10_000)));
    });
    group.bench_function("trampoline_sum_to_10k", |b| {
        b.iter(|| memo.trampoline.invoke(memo.sum_to, [black_box(10_000i64)]));
    });
    group.bench_function("trampoline_sum_to_1m_no_memo", |b| {
        b.iter(|| no_memo.trampoline.invoke(no_memo.sum_to, [black_box(1_000_000i64)]));
    });

    group.finish();
}

criterion_group!(benches, bench_fib, bench_linear_depth);
criterion_main!(benches);
