//! Benchmarks for the exponential-approach envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polytone::dsp::{EnvelopeGenerator, EnvelopeKind, EnvelopeParams, Gate};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn render(env: &mut EnvelopeGenerator, params: &EnvelopeParams, gate: Gate, buffer: &mut [f32]) {
    let dt = 1.0 / SAMPLE_RATE as f32;
    for sample in buffer.iter_mut() {
        *sample = env.next_sample(params, gate, dt);
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let amp = EnvelopeParams::amplitude(0.1, 0.2, 0.7, 0.3, 1.0);
    let cutoff = EnvelopeParams::cutoff(0.05, 0.3, 0.2, 500.0, 6_000.0, 2_000.0, 300.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (band check every sample)
        let mut env = EnvelopeGenerator::new(EnvelopeKind::Amplitude);
        env.trigger(&amp);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&amp), Gate::Press, black_box(&mut buffer)))
        });

        // Release phase
        let mut env = EnvelopeGenerator::new(EnvelopeKind::Amplitude);
        env.trigger(&amp);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&amp), Gate::Release, black_box(&mut buffer)))
        });

        // Cutoff sweep in Hz
        let mut env = EnvelopeGenerator::new(EnvelopeKind::Cutoff);
        env.trigger(&cutoff);
        group.bench_with_input(BenchmarkId::new("cutoff", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&cutoff), Gate::Press, black_box(&mut buffer)))
        });
    }

    group.finish();
}
