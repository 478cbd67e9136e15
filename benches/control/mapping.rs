//! Benchmarks for scale quantization and stage mapping.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lane_conductor::mapping::{map_point, Direction, EditGroup, PitchRange, StageRect};
use lane_conductor::music::Scale;

pub fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("control/quantize");

    // A sweep across the playable range, off-grid on purpose
    let raws: Vec<f64> = (0..256).map(|i| 36.0 + i as f64 * 0.23).collect();

    for scale in Scale::ALL {
        group.bench_with_input(BenchmarkId::new("sweep", scale.name()), &scale, |b, scale| {
            b.iter(|| {
                let mut acc = 0i32;
                for &raw in &raws {
                    acc = acc.wrapping_add(scale.quantize(black_box(raw), 2));
                }
                acc
            })
        });
    }

    group.finish();
}

pub fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("control/mapping");
    let rect = StageRect::new(0.0, 0.0, 1280.0, 720.0);
    let range = PitchRange::default();

    for lanes in [1usize, 4, 8] {
        let edit = EditGroup {
            edit_count: lanes.div_ceil(2),
            select_all: false,
        };

        group.bench_with_input(BenchmarkId::new("map_resolve", lanes), &lanes, |b, &lanes| {
            let mut x = 0.0;
            b.iter(|| {
                x = (x + 37.0) % 1280.0;
                let point = map_point(black_box(x), black_box(360.0), &rect, lanes, &range);
                edit.resolve(lanes, point.lane, Direction::Forward)
            })
        });
    }

    group.finish();
}
