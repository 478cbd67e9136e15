//! Benchmarks for bus rendering and analyser taps.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lane_conductor::monitor::{Analyser, AudioContext, BusRegistry};

use crate::BLOCK_SIZES;

pub fn bench_buses(c: &mut Criterion) {
    let mut group = c.benchmark_group("monitor/buses");

    for native in [true, false] {
        let label = if native { "native" } else { "split" };

        for &size in BLOCK_SIZES {
            // Eight lanes, each with a preview tone ringing
            let mut registry = BusRegistry::new(AudioContext::new(48_000.0, native));
            for lane in 0..8 {
                registry.set_pan(lane, (lane * 16) as u8);
                registry.preview(lane, 60 + lane as u8, (lane * 16) as u8);
            }
            let mut out = vec![0.0f32; size * 2];

            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| registry.render(black_box(&mut out)))
            });
        }
    }

    group.finish();
}

pub fn bench_analyser(c: &mut Criterion) {
    let mut group = c.benchmark_group("monitor/analyser");

    let block: Vec<f32> = (0..512)
        .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 48_000.0).sin())
        .collect();

    let mut freq = Analyser::frequency_tap();
    freq.push(&block);
    let mut bins = vec![0.0f32; freq.frequency_bin_count()];
    group.bench_function(BenchmarkId::new("float_frequency", freq.fft_size()), |b| {
        b.iter(|| freq.float_frequency(black_box(&mut bins)))
    });

    let mut time = Analyser::time_tap();
    group.bench_function(BenchmarkId::new("push", block.len()), |b| {
        b.iter(|| time.push(black_box(&block)))
    });

    group.finish();
}
