pub mod config;
pub mod dsp;
pub mod engine; // Block rendering and the realtime pipeline
pub mod error;
pub mod io;
pub mod synth; // Channels, voices, presets and polyphony

pub use config::{EngineConfig, StealPolicy};
pub use engine::{
    pipeline::{BlockReader, BlockRing, Pipeline},
    Engine, MessageSender,
};
pub use error::{Result, SynthError};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Oscillator operators summed by every voice.
pub const OPERATOR_COUNT: usize = 8;
/// MIDI channels addressed by one input port.
pub const CHANNELS_PER_PORT: usize = 16;
/// Channel number (within a port) reserved for percussion.
pub const PERCUSSION_CHANNEL: usize = 9;
