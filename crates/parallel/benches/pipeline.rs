//! Benchmarks for whole-grid and chunked CS-map runs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csmap_core::Raster;
use csmap_parallel::{single_pass, ChunkScheduler, CsmapParams, ProcessingMode};
use ndarray::Array2;

fn create_dem(size: usize) -> Raster<f64> {
    Raster::from_array(Array2::from_shape_fn((size, size), |(row, col)| {
        let base = (row + col) as f64;
        let variation = ((row * 7 + col * 13) % 100) as f64 / 10.0;
        base + variation
    }))
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    let params = CsmapParams::default();

    for size in [256, 512].iter() {
        let dem = create_dem(*size);

        group.bench_with_input(BenchmarkId::new("single_pass", size), size, |b, _| {
            b.iter(|| single_pass(black_box(dem.view()), &params).unwrap())
        });

        for (name, mode) in [
            ("chunked_sequential", ProcessingMode::Sequential),
            ("chunked_parallel", ProcessingMode::Parallel),
        ] {
            let scheduler = ChunkScheduler::new(params.clone(), 128).unwrap().with_mode(mode);
            group.bench_with_input(BenchmarkId::new(name, size), size, |b, _| {
                b.iter(|| {
                    let mut sink = scheduler.memory_sink(&dem).unwrap();
                    scheduler.run(black_box(&dem), &mut sink).unwrap()
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
