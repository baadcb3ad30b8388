//! The engine owns every channel, the voice pool and the preset bank, and
//! renders one block of interleaved 16-bit stereo per call.
//!
//! Performance messages never touch DSP state directly: they go through
//! `rtrb` queues and are drained at the start of each block, so a block is
//! always rendered against a consistent snapshot.

pub mod pipeline;

use log::{debug, warn};
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    config::EngineConfig,
    error::Result,
    io::{converter::midi_to_synth, midi::MidiEvent, pcm},
    synth::{
        channel::{Channel, ChannelAction, ChannelMeters},
        message::{MessageReceiver, SynthMessage},
        pool::VoicePool,
        preset::PresetBank,
        voice::VoiceTables,
    },
    CHANNELS_PER_PORT, PERCUSSION_CHANNEL,
};

pub struct Engine {
    config: EngineConfig,
    channels: Vec<Channel>,
    pool: VoicePool,
    tables: VoiceTables,
    bank: PresetBank,
    inputs: Vec<Consumer<SynthMessage>>,
    master_l: Vec<f32>,
    master_r: Vec<f32>,
}

impl Engine {
    /// Build an engine and the sender for its first message queue.
    pub fn new(config: EngineConfig) -> Result<(Self, MessageSender)> {
        config.validate()?;
        debug!("engine config: {config:?}");

        let bank = PresetBank::general_midi();
        let default_timbre = &bank.program(0).timbre;
        let channels = (0..config.channel_count())
            .map(|i| {
                Channel::new(i, config.sample_rate, config.block_len, default_timbre.clone())
            })
            .collect();

        let mut engine = Self {
            pool: VoicePool::new(config.voices, config.sample_rate, config.steal_policy),
            tables: VoiceTables::new(),
            channels,
            bank,
            inputs: Vec::new(),
            master_l: vec![0.0; config.block_len],
            master_r: vec![0.0; config.block_len],
            config,
        };
        let sender = engine.connect_input();
        Ok((engine, sender))
    }

    /// Replace the preset bank. Every channel is reset to the bank's program 0.
    pub fn with_bank(mut self, bank: PresetBank) -> Self {
        let preset = bank.program(0);
        for channel in &mut self.channels {
            channel.program_change(preset);
        }
        self.bank = bank;
        self
    }

    /// Open another message queue, e.g. one per MIDI input.
    pub fn connect_input(&mut self) -> MessageSender {
        let (producer, consumer) = RingBuffer::<SynthMessage>::new(self.config.queue_capacity);
        self.inputs.push(consumer);
        MessageSender { producer }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn bank(&self) -> &PresetBank {
        &self.bank
    }

    pub fn channel_meters(&self) -> impl Iterator<Item = ChannelMeters> + '_ {
        self.channels.iter().map(Channel::meters)
    }

    /// Apply one message immediately. Messages for channels that do not
    /// exist are ignored.
    pub fn handle_message(&mut self, message: SynthMessage) {
        let index = message.channel();
        let Some(channel) = self.channels.get_mut(index) else {
            return;
        };

        match message {
            SynthMessage::NoteOn { note, velocity, .. } => {
                if index % CHANNELS_PER_PORT == PERCUSSION_CHANNEL {
                    return;
                }
                if velocity == 0 {
                    self.pool.release(index, note, channel.hold());
                } else {
                    channel.arm();
                    self.pool.allocate(channel, note & 0x7F, velocity);
                }
            }
            SynthMessage::NoteOff { note, .. } => {
                self.pool.release(index, note, channel.hold());
            }
            SynthMessage::ControlChange {
                controller, value, ..
            } => match channel.control_change(controller, value) {
                ChannelAction::HoldOff => self.pool.hold_off(index),
                ChannelAction::PurgeAll => self.pool.purge_all(index),
                ChannelAction::None => {}
            },
            SynthMessage::ProgramChange { program, .. } => {
                channel.program_change(self.bank.program(program));
            }
            SynthMessage::PitchBend { value, .. } => channel.pitch_bend(value),
        }
    }

    fn drain_inputs(&mut self) {
        for i in 0..self.inputs.len() {
            while let Some(message) = MessageReceiver::pop(&mut self.inputs[i]) {
                self.handle_message(message);
            }
        }
    }

    /// Render one block into `out` as interleaved stereo.
    ///
    /// `out` should hold `block_len * 2` samples; a shorter slice receives
    /// the first frames only.
    pub fn render_block(&mut self, out: &mut [i16]) {
        self.drain_inputs();

        self.pool.render_block(&mut self.channels, &self.tables);

        self.master_l.fill(0.0);
        self.master_r.fill(0.0);
        for channel in &mut self.channels {
            channel.mix_into(&mut self.master_l, &mut self.master_r);
        }

        pcm::interleave(&self.master_l, &self.master_r, out);
    }
}

/// Producer side of one engine message queue.
pub struct MessageSender {
    producer: Producer<SynthMessage>,
}

impl MessageSender {
    /// Queue a message for the next block. Returns `false` if the queue was full.
    pub fn send(&mut self, message: SynthMessage) -> bool {
        match self.producer.push(message) {
            Ok(()) => true,
            Err(PushError::Full(message)) => {
                warn!("message queue full, dropping {message:?}");
                false
            }
        }
    }

    /// Decode raw MIDI bytes received on `port` and queue them.
    /// Malformed messages are ignored.
    pub fn send_midi(&mut self, port: usize, bytes: &[u8]) -> bool {
        match MidiEvent::parse(bytes) {
            Some(event) => self.send(midi_to_synth(event, port)),
            None => false,
        }
    }

    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}
