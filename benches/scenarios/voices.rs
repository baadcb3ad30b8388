//! Benchmarks for single voices rendering into a channel.
//!
//! A voice pays for three envelopes, two LFOs, eight oversampled
//! operators and two cascaded filters every sample, so the cost scales
//! with how many operators the preset uses.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polytone::synth::{
    preset::{self, Preset},
    Channel, Voice, VoiceTables,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let tables = VoiceTables::new();
    let dt = 1.0 / SAMPLE_RATE as f32;

    let presets: [(&str, Preset); 3] = [
        ("bass_2op", preset::saw_bass()),
        ("lead_2op_vibrato", preset::square_lead()),
        ("strings_7op", preset::saw_strings()),
    ];

    for &size in BLOCK_SIZES {
        for (name, preset) in &presets {
            let mut channel = Channel::new(0, SAMPLE_RATE, size, preset.timbre.clone());
            let mut voice = Voice::new();
            voice.start(0, &channel.bus(), 45, 100, 0, dt);

            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    let mut bus = channel.bus();
                    voice.render(black_box(&mut bus), &tables, dt);
                    bus.left.fill(0.0);
                    bus.right.fill(0.0);
                })
            });
        }
    }

    group.finish();
}
