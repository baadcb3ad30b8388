//! Benchmarks for whole engine blocks.
//!
//! These render the full path: message drain, every active voice, per
//! channel delay and metering, master mix and PCM conversion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polytone::{synth::SynthMessage, Engine, EngineConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// An engine with `notes` sustained notes spread over `channels` channels.
fn sounding_engine(block_len: usize, channels: usize, notes: usize) -> Engine {
    let config = EngineConfig::new()
        .sample_rate(SAMPLE_RATE)
        .block_len(block_len)
        .voices(notes.max(1));
    let (mut engine, _tx) = Engine::new(config).expect("valid bench config");

    for ch in 0..channels {
        // strings sustain, so the voice count stays steady while measuring
        engine.handle_message(SynthMessage::ProgramChange {
            channel: ch,
            program: 48,
        });
    }
    for n in 0..notes {
        let mut ch = n % channels;
        if ch == 9 {
            ch = 10 % channels;
        }
        engine.handle_message(SynthMessage::NoteOn {
            channel: ch,
            note: 36 + (n * 7 % 48) as u8,
            velocity: 100,
        });
    }
    engine
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let mut out = vec![0i16; size * 2];

        for (name, channels, notes) in [
            ("idle", 16, 0),
            ("1ch_4notes", 1, 4),
            ("4ch_16notes", 4, 16),
            ("15ch_64notes", 16, 64),
        ] {
            let mut engine = sounding_engine(size, channels, notes);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| engine.render_block(black_box(&mut out)))
            });
        }
    }

    group.finish();
}
