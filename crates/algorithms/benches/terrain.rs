//! Benchmarks for the derivative kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csmap_algorithms::terrain::{curvature, gaussian_filter, slope, CurvatureType};
use ndarray::Array2;

fn create_dem(size: usize) -> Array2<f64> {
    Array2::from_shape_fn((size, size), |(row, col)| {
        let base = (row + col) as f64;
        let variation = ((row * 7 + col * 13) % 100) as f64 / 10.0;
        base + variation
    })
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");

    for size in [256, 512, 1024].iter() {
        let dem = create_dem(*size);

        group.bench_with_input(BenchmarkId::new("slope", size), size, |b, _| {
            b.iter(|| slope(black_box(dem.view())).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("gaussian_12_3", size), size, |b, _| {
            b.iter(|| gaussian_filter(black_box(dem.view()), 12, 3.0).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("curvature", size), size, |b, _| {
            b.iter(|| curvature(black_box(dem.view()), 1, CurvatureType::General).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kernels);
criterion_main!(benches);
