//! Benchmarks for the stereo cross-feedback delay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polytone::dsp::delay::{DelayParams, StereoDelay};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let params = DelayParams::default();

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| ((i % 32) as f32 / 16.0) - 1.0).collect();
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        let mut delay = StereoDelay::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("cross_feedback", size), &size, |b, _| {
            b.iter(|| {
                for ((l, r), &x) in left.iter_mut().zip(right.iter_mut()).zip(&input) {
                    (*l, *r) = delay.next_sample(x, -x, black_box(&params));
                }
            })
        });
    }

    group.finish();
}
