//! Initialization-time engine configuration.
//!
//! Everything here is fixed once an [`Engine`](crate::Engine) is built: buffer
//! sizes, the voice pool and the channel table are allocated up front so the
//! render thread never allocates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    CHANNELS_PER_PORT, MAX_BLOCK_SIZE,
};

/// What the voice pool does when a Note-On finds no free voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealPolicy {
    /// Drop the Note-On.
    #[default]
    Drop,
    /// Reclaim the oldest voice that is already releasing or purging.
    /// Falls back to dropping when every voice is still pressed or held.
    OldestReleased,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per rendered block.
    pub block_len: usize,
    /// MIDI input ports; each one addresses 16 channels.
    pub ports: usize,
    /// Size of the voice pool.
    pub voices: usize,
    /// Pre-rendered blocks buffered between the render thread and the device.
    pub ring_depth: usize,
    /// Capacity of each message queue feeding the engine.
    pub queue_capacity: usize,
    pub steal_policy: StealPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_len: 256,
            ports: 1,
            voices: 128,
            ring_depth: 8,
            queue_capacity: 256,
            steal_policy: StealPolicy::Drop,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn block_len(mut self, block_len: usize) -> Self {
        self.block_len = block_len;
        self
    }

    pub fn ports(mut self, ports: usize) -> Self {
        self.ports = ports;
        self
    }

    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn ring_depth(mut self, ring_depth: usize) -> Self {
        self.ring_depth = ring_depth;
        self
    }

    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn steal_policy(mut self, steal_policy: StealPolicy) -> Self {
        self.steal_policy = steal_policy;
        self
    }

    /// Total number of addressable channels (16 per port).
    pub fn channel_count(&self) -> usize {
        self.ports * CHANNELS_PER_PORT
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < 8_000 {
            return Err(SynthError::InvalidConfig(format!(
                "sample rate {} Hz is below 8000 Hz",
                self.sample_rate
            )));
        }
        if self.block_len == 0 || self.block_len > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidConfig(format!(
                "block length {} outside 1..={}",
                self.block_len, MAX_BLOCK_SIZE
            )));
        }
        if self.ports == 0 {
            return Err(SynthError::InvalidConfig("at least one port is required".into()));
        }
        if self.voices == 0 {
            return Err(SynthError::InvalidConfig("voice pool cannot be empty".into()));
        }
        if self.ring_depth < 2 {
            return Err(SynthError::InvalidConfig(format!(
                "ring depth {} is below 2",
                self.ring_depth
            )));
        }
        if self.queue_capacity == 0 {
            return Err(SynthError::InvalidConfig("message queue capacity cannot be zero".into()));
        }
        Ok(())
    }
}
