//! Benchmarks for the morphology filters

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cumbre_algorithms::morphology::{dilate, erode, opening, SquareWindow};
use cumbre_core::ElevationGrid;
use ndarray::Array2;

fn create_test_grid(size: usize) -> ElevationGrid {
    // Varied surface with some structure
    let data = Array2::from_shape_fn((size, size), |(row, col)| ((row * 7 + col * 13) % 256) as f64);
    ElevationGrid::from_array(data, 30.0).unwrap()
}

fn bench_erode(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/erode");
    let window = SquareWindow::default();
    for size in [256, 512, 1024] {
        let grid = create_test_grid(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| erode(black_box(&grid), window).unwrap())
        });
    }
    group.finish();
}

fn bench_dilate(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/dilate");
    let window = SquareWindow::default();
    for size in [256, 512, 1024] {
        let grid = create_test_grid(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| dilate(black_box(&grid), window).unwrap())
        });
    }
    group.finish();
}

fn bench_opening_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/opening_window");
    let grid = create_test_grid(512);
    for size in [3, 7, 15, 31] {
        let window = SquareWindow::new(size).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| opening(black_box(&grid), window).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_erode, bench_dilate, bench_opening_window);
criterion_main!(benches);
