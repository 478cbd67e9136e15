//! Benchmarks for the gesture pipeline and the monitoring buses.
//!
//! Run with: cargo bench
//!
//! The control path runs once per admitted input sample (~30 Hz) and must
//! stay far below a frame. The monitor path renders on the UI thread in
//! blocks sized like a device callback.
//!
//! Benchmark groups:
//!   - control/*  quantize, map + resolve, MIDI diffing
//!   - monitor/*  per-lane bus rendering and analyser reads

use criterion::{criterion_group, criterion_main};

mod control;
mod monitor;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    control::bench_quantize,
    control::bench_mapping,
    control::bench_emit,
    monitor::bench_buses,
    monitor::bench_analyser,
);
criterion_main!(benches);
