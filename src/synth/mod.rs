// Purpose: channels, voices and the pool that connects them
// Sits above the dsp primitives; the engine drives it one block at a time

pub mod channel;
pub mod message;
pub mod pool;
pub mod preset;
pub mod voice;

pub use channel::{Channel, ChannelActivity, ChannelMeters};
pub use message::SynthMessage;
pub use pool::VoicePool;
pub use preset::{Preset, PresetBank, Timbre};
pub use voice::{Voice, VoiceState, VoiceTables};
