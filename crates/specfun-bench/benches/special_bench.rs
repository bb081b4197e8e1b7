//! Special-function kernel benchmarks.
//!
//! One input per evaluation region so a regression in a single branch
//! shows up on its own line.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use specfun_core::{Complex64, expi, expi_complex, hyp2f1, lgamma};

fn bench_hyp2f1(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyp2f1");
    let cases = [
        ("power_series", (0.3, 1.7, 2.9, 0.4)),
        ("one_minus_z", (0.25, 0.5, 0.75, 80.0 / 81.0)),
        ("pfaff", (1.5, 2.25, 3.1, -3.0)),
        ("polynomial", (-10.0, 7.4, 5.0, 0.95)),
        ("gauss_sum", (0.5, 0.25, 2.0, 1.0)),
    ];
    for (name, (a, b, cc, z)) in cases {
        group.bench_function(name, |bench| {
            bench.iter(|| hyp2f1(black_box(a), black_box(b), black_box(cc), black_box(z)));
        });
    }
    group.finish();
}

fn bench_expi(c: &mut Criterion) {
    let mut group = c.benchmark_group("expi");
    group.bench_function("real_series", |b| b.iter(|| expi(black_box(1.5))));
    group.bench_function("real_asymptotic", |b| b.iter(|| expi(black_box(60.0))));
    group.bench_function("real_negative", |b| b.iter(|| expi(black_box(-7.5))));
    group.bench_function("complex_continued_fraction", |b| {
        b.iter(|| expi_complex(black_box(Complex64::new(-3.0, 4.0))));
    });
    group.finish();
}

fn bench_lgamma(c: &mut Criterion) {
    c.bench_function("lgamma", |b| b.iter(|| lgamma(black_box(37.25))));
}

criterion_group!(benches, bench_hyp2f1, bench_expi, bench_lgamma);
criterion_main!(benches);
