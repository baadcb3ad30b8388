use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::info;
use midir::{MidiInput, MidiInputConnection};
use polytone::{synth::SynthMessage, MessageSender};

/// Where performance messages come from. Dropping it stops input.
pub enum Input {
    Port(MidiInputConnection<()>),
    Demo(Demo),
}

/// Forward the first MIDI input port into the engine (as port 0), or start
/// the demo player if there is none.
pub fn connect_first(mut sender: MessageSender) -> Result<Input> {
    let midi_in =
        MidiInput::new("polytone-input").map_err(|e| eyre!("failed to create MIDI input: {e}"))?;

    let ports = midi_in.ports();
    let Some(port) = ports.first() else {
        info!("no MIDI input ports, playing demo progression");
        return Ok(Input::Demo(Demo::start(sender)?));
    };

    let name = midi_in
        .port_name(port)
        .unwrap_or_else(|_| "unknown device".to_string());
    info!("connecting to MIDI device: {name}");

    let connection = midi_in
        .connect(
            port,
            "polytone-midi-in",
            move |_timestamp, message, _| {
                sender.send_midi(0, message);
            },
            (),
        )
        .map_err(|e| eyre!("failed to connect to {name}: {e}"))?;
    Ok(Input::Port(connection))
}

const CHORDS: [[u8; 3]; 4] = [[60, 64, 67], [57, 60, 64], [53, 57, 60], [55, 59, 62]];
const BASS: [u8; 4] = [36, 33, 29, 31];
const CHORD_TIME: Duration = Duration::from_millis(1_600);
const TICK: Duration = Duration::from_millis(50);

/// Loops a four-chord progression on channels 0 (strings) and 1 (bass).
pub struct Demo {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Demo {
    fn start(mut sender: MessageSender) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = thread::Builder::new()
            .name("polytone-demo".into())
            .spawn({
                let stop = Arc::clone(&stop);
                move || play_demo(&mut sender, &stop)
            })
            .wrap_err("failed to spawn demo thread")?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for Demo {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn play_demo(sender: &mut MessageSender, stop: &AtomicBool) {
    sender.send(SynthMessage::ProgramChange {
        channel: 0,
        program: 48,
    });
    sender.send(SynthMessage::ProgramChange {
        channel: 1,
        program: 38,
    });

    for step in 0.. {
        let chord = CHORDS[step % CHORDS.len()];
        let bass = BASS[step % BASS.len()];
        let notes = chord.iter().map(|&n| (0, n)).chain([(1, bass)]);

        for (channel, note) in notes.clone() {
            sender.send(SynthMessage::NoteOn {
                channel,
                note,
                velocity: 90,
            });
        }

        let mut waited = Duration::ZERO;
        while waited < CHORD_TIME {
            if stop.load(Ordering::Acquire) {
                break;
            }
            thread::sleep(TICK);
            waited += TICK;
        }

        for (channel, note) in notes {
            sender.send(SynthMessage::NoteOff { channel, note });
        }
        if stop.load(Ordering::Acquire) {
            return;
        }
    }
}
