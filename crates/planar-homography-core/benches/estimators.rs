use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Matrix3, Point2};
use planar_homography_core::{
    estimate_homography_dlt, estimate_homography_least_squares, Homography,
};

fn correspondences(n: usize) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
    let h = Homography::new(Matrix3::new(
        0.9, 0.05, 40.0, //
        -0.03, 1.05, 25.0, //
        0.0006, -0.0003, 1.0,
    ));
    let src: Vec<Point2<f64>> = (0..n)
        .map(|i| {
            let t = i as f64;
            Point2::new(320.0 + 300.0 * (0.37 * t).sin(), 240.0 + 220.0 * (0.53 * t).cos())
        })
        .collect();
    let dst = src.iter().map(|&p| h.apply(p)).collect();
    (src, dst)
}

fn bench_estimators(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimators");
    for n in [4usize, 16, 64, 256] {
        let (src, dst) = correspondences(n);
        group.bench_with_input(BenchmarkId::new("dlt", n), &n, |b, _| {
            b.iter(|| estimate_homography_dlt(black_box(&src), black_box(&dst)))
        });
        group.bench_with_input(BenchmarkId::new("least_squares", n), &n, |b, _| {
            b.iter(|| estimate_homography_least_squares(black_box(&src), black_box(&dst)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_estimators);
criterion_main!(benches);
