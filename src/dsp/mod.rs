//! Low-level DSP primitives used by voices and channels.
//!
//! These components are allocation-free after construction and realtime-safe,
//! so they embed directly inside voice and channel structs. They stay focused
//! on the per-sample math; the `synth` layer decides when and with which
//! parameters they run.

/// Stereo feedback delay with cross-mixing.
pub mod delay;
/// Exponential-approach envelope generators.
pub mod envelope;
/// Cascaded resonant low-pass with polynomial coefficients.
pub mod filter;
/// Sine-table LFOs with delayed onset.
pub mod lfo;
/// RMS and peak level metering.
pub mod meter;
/// Oversampled pulse and sawtooth operators.
pub mod oscillator;
/// Equal-power pan tables.
pub mod pan;

pub use envelope::{EnvelopeGenerator, EnvelopeKind, EnvelopeParams, Gate};
pub use oscillator::{OperatorParams, Waveform};
