//! Benchmarks for plot and axis geometry generation

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;
use teaplot_graph::axes::{Sections, grid_lines};
use teaplot_graph::{AxisRanges, DataSeries, GraphId, Plot, PlotFrame, PlotId, is_point_visible};

fn samples(count: usize) -> Vec<Vec<f64>> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            vec![t * 1000.0, (t * 12.0).sin() * 200.0 + 250.0]
        })
        .collect()
}

fn frame() -> PlotFrame {
    PlotFrame {
        origin: Vec3::new(-320.0, -200.0, 0.0),
        limits: AxisRanges::graph_default(),
        zoom_limits: AxisRanges::graph_default(),
    }
}

fn bench_plot_new(c: &mut Criterion) {
    let mut group = c.benchmark_group("plot_new");

    for size in [100, 1000, 10000, 100000] {
        group.throughput(Throughput::Elements(size as u64));
        let data = samples(size);

        group.bench_with_input(BenchmarkId::new("samples", size), &data, |b, data| {
            b.iter(|| {
                let series = DataSeries::new(data.clone()).with_scales(1.0, 2.0, 1.0);
                Plot::new(PlotId::default(), GraphId::default(), black_box(series), &frame())
            });
        });
    }

    group.finish();
}

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_visibility");
    let limits = AxisRanges::graph_default();
    let axes = limits.maxs();

    for size in [1000, 100000] {
        group.throughput(Throughput::Elements(size as u64));
        let points: Vec<[f32; 3]> = samples(size)
            .into_iter()
            .map(|s| [s[0] as f32, s[1] as f32, 0.0])
            .collect();

        group.bench_with_input(BenchmarkId::new("half_revealed", size), &points, |b, points| {
            b.iter(|| {
                points
                    .iter()
                    .filter(|p| is_point_visible(black_box(**p), &limits, axes, 500.0))
                    .count()
            });
        });
    }

    group.finish();
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_lines");
    let limits = AxisRanges::graph_default();

    for sections in [4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("perspective", sections), &sections, |b, &sections| {
            b.iter(|| grid_lines(Vec3::ZERO, &limits, Sections::uniform(black_box(sections)), true));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plot_new, bench_visibility, bench_grid);
criterion_main!(benches);
