use rtrb::Consumer;

/// A performance message addressed to one channel.
///
/// `channel` is the flat channel index `(port << 4) | midi_channel`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn {
        channel: usize,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: usize,
        note: u8,
    },
    ControlChange {
        channel: usize,
        controller: u8,
        value: u8,
    },
    ProgramChange {
        channel: usize,
        program: u8,
    },
    /// 14-bit bend, centered on 8192.
    PitchBend {
        channel: usize,
        value: u16,
    },
}

impl SynthMessage {
    pub fn channel(&self) -> usize {
        match *self {
            SynthMessage::NoteOn { channel, .. }
            | SynthMessage::NoteOff { channel, .. }
            | SynthMessage::ControlChange { channel, .. }
            | SynthMessage::ProgramChange { channel, .. }
            | SynthMessage::PitchBend { channel, .. } => channel,
        }
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
