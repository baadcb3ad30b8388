//! Benchmarks for the oversampled operator bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polytone::{
    dsp::{oscillator::OperatorBank, pan::PanTable, OperatorParams, Waveform},
    OPERATOR_COUNT,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn operators(active: usize) -> [OperatorParams; OPERATOR_COUNT] {
    let mut params = [OperatorParams::silent(); OPERATOR_COUNT];
    for (i, p) in params.iter_mut().take(active).enumerate() {
        *p = OperatorParams::new(0.2, 1.0 + i as f32 * 0.01, i as f32 / 8.0 - 0.5, 0.5);
    }
    params
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let pans = PanTable::new();
    let delta = 440.0 / SAMPLE_RATE as f32;

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for (name, waveform, active) in [
            ("pulse_1op", Waveform::PulseWidth, 1),
            ("pulse_8op", Waveform::PulseWidth, 8),
            ("saw_8op", Waveform::Sawtooth, 8),
        ] {
            let params = operators(active);
            let mut bank = OperatorBank::new();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                        (*l, *r) = bank.next_sample(
                            black_box(&params),
                            waveform,
                            delta,
                            0.0,
                            0.5,
                            0.0,
                            &pans,
                        );
                    }
                })
            });
        }
    }

    group.finish();
}
