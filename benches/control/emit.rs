//! Benchmarks for MIDI diffing against the voice cache.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lane_conductor::control::{MidiEmitter, VoiceControlState};

pub fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("control/emit");
    let emitter = MidiEmitter::new(1);

    for lanes in [1usize, 4, 8] {
        let targets: Vec<usize> = (0..lanes).collect();

        // Alternating pitch: every call is a Note-Off + Note-On per lane
        let mut voices = VoiceControlState::new(lanes);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("pitch_change", lanes), &lanes, |b, _| {
            b.iter(|| {
                flip = !flip;
                let pitch = if flip { 60 } else { 64 };
                emitter.apply_targets(black_box(&targets), pitch, 64, &mut voices)
            })
        });

        // Unchanged pitch and pan: the diff should come back empty
        let mut voices = VoiceControlState::new(lanes);
        emitter.apply_targets(&targets, 60, 64, &mut voices);
        group.bench_with_input(BenchmarkId::new("steady", lanes), &lanes, |b, _| {
            b.iter(|| emitter.apply_targets(black_box(&targets), 60, 64, &mut voices))
        });
    }

    group.finish();
}
