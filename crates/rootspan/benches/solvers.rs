//! Benchmarks for the bracketing solvers.
//!
//! Run with: cargo bench -p rootspan

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rootspan::solvers::{bisection, false_position, toms748, Options, Reduction};

fn target(x: f64) -> f64 {
    x.exp() - x.cos()
}

fn bench_solvers(c: &mut Criterion) {
    let options = Options::default();
    let mut group = c.benchmark_group("bracketing");

    group.bench_function("bisection", |b| {
        b.iter(|| bisection(target, black_box(-1.0), black_box(1.0), &options).unwrap());
    });
    group.bench_function("toms748", |b| {
        b.iter(|| toms748(target, black_box(-1.0), black_box(1.0), &options).unwrap());
    });
    group.bench_function("false_position", |b| {
        b.iter(|| {
            false_position(
                target,
                black_box(-1.0),
                black_box(1.0),
                Reduction::default(),
                &options,
            )
            .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
