//! Real-world scenario benchmarks.
//!
//! These measure complete voices and whole engine blocks with many
//! channels sounding at once.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
