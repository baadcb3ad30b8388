use crate::{io::midi::MidiEvent, synth::message::SynthMessage, CHANNELS_PER_PORT};

/// Address a decoded event to its flat channel index on `port`.
/// Note-On with velocity 0 becomes Note-Off.
pub fn midi_to_synth(midi: MidiEvent, port: usize) -> SynthMessage {
    let channel = port * CHANNELS_PER_PORT + midi.channel() as usize;
    match midi {
        MidiEvent::NoteOn { key, velocity, .. } if velocity > 0 => SynthMessage::NoteOn {
            channel,
            note: key,
            velocity,
        },
        MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => {
            SynthMessage::NoteOff { channel, note: key }
        }
        MidiEvent::ControlChange {
            controller, value, ..
        } => SynthMessage::ControlChange {
            channel,
            controller,
            value,
        },
        MidiEvent::ProgramChange { program, .. } => SynthMessage::ProgramChange { channel, program },
        MidiEvent::PitchBend { value, .. } => SynthMessage::PitchBend { channel, value },
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_index_includes_port() {
        let event = MidiEvent::NoteOn {
            channel: 2,
            key: 60,
            velocity: 90,
        };
        assert_eq!(midi_to_synth(event, 0).channel(), 2);
        assert_eq!(midi_to_synth(event, 3).channel(), 50);
    }

    #[test]
    fn zero_velocity_is_note_off() {
        let event = MidiEvent::NoteOn {
            channel: 0,
            key: 64,
            velocity: 0,
        };
        assert_eq!(
            midi_to_synth(event, 0),
            SynthMessage::NoteOff {
                channel: 0,
                note: 64
            }
        );
    }

    #[test]
    fn a4_is_440() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-3);
    }
}
