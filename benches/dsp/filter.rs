//! Benchmarks for the cascaded biquad low-pass.
//!
//! Coefficients are recomputed every sample, so the "sweep" case is the one
//! voices actually pay for.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polytone::dsp::filter::{BiquadCoefs, CascadeLowPass};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // Fixed coefficients
        let coefs = BiquadCoefs::lowpass(0.05, 0.5);
        let mut filter = CascadeLowPass::new();
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = filter.next_sample(x, black_box(&coefs));
                }
            })
        });

        // Per-sample coefficients
        let mut filter = CascadeLowPass::new();
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in buffer.iter_mut().zip(&input).enumerate() {
                    let cutoff = 0.01 + 0.3 * i as f32 / size as f32;
                    let coefs = BiquadCoefs::lowpass(black_box(cutoff), 0.5);
                    *out = filter.next_sample(x, &coefs);
                }
            })
        });
    }

    group.finish();
}
