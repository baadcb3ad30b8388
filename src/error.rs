use thiserror::Error;

/// Errors surfaced by engine construction and the realtime pipeline.
///
/// Performance-message problems (short messages, unknown channels, a full
/// voice pool) are never errors: those messages are dropped.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid preset bank: {0}")]
    InvalidBank(String),

    #[error("failed to spawn render thread")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("render thread did not stop within {waited_ms} ms")]
    StopTimeout { waited_ms: u64 },

    #[error("render thread panicked")]
    RenderThreadPanicked,
}

pub type Result<T> = std::result::Result<T, SynthError>;
