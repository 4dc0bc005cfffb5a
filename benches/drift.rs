use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;
use rand::prelude::*;
use tripflow::drift::{DriftScorer, PsiScorer};

fn sample(n: usize, shift: f64) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen::<f64>() * 10.0 + shift).collect()
}

fn feature_frame(n: usize, shift: f64) -> DataFrame {
    let mut rng = rand::thread_rng();

    df!(
        "vendor_id" => (0..n).map(|_| rng.gen_range(1..=2i64)).collect::<Vec<i64>>(),
        "passenger_count" => (0..n).map(|_| rng.gen_range(0..=8i64)).collect::<Vec<i64>>(),
        "trip_distance" => (0..n).map(|_| rng.gen::<f64>() * 10.0 + shift).collect::<Vec<f64>>(),
        "rate_code" => (0..n).map(|_| rng.gen_range(1..=6i64)).collect::<Vec<i64>>(),
        "payment_type" => (0..n).map(|_| rng.gen_range(1..=4i64)).collect::<Vec<i64>>(),
        "pickup_hour" => (0..n).map(|_| rng.gen_range(0..=23i64)).collect::<Vec<i64>>(),
        "pickup_weekday" => (0..n).map(|_| rng.gen_range(0..=6i64)).collect::<Vec<i64>>(),
        "duration_min" => (0..n).map(|_| rng.gen::<f64>() * 60.0).collect::<Vec<f64>>()
    )
    .unwrap()
}

fn bench_psi(c: &mut Criterion) {
    let mut group = c.benchmark_group("psi");

    for n in [1_000, 10_000, 100_000].iter() {
        let reference = sample(*n, 0.0);
        let current = sample(*n, 2.0);

        group.bench_with_input(BenchmarkId::new("score", n), n, |b, _| {
            b.iter(|| PsiScorer::default().score(black_box(&reference), black_box(&current)))
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    group.sample_size(10); // Whole-frame comparisons are slow enough already

    for n in [10_000, 50_000].iter() {
        let reference = feature_frame(*n, 0.0);
        let current = feature_frame(*n, 1.5);

        group.bench_with_input(BenchmarkId::new("compare", n), n, |b, _| {
            b.iter(|| {
                DriftScorer::default()
                    .compare(black_box(&reference), black_box(&current), "ref", "cur")
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_psi, bench_report);
criterion_main!(benches);
