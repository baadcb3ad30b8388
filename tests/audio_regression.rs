use polytone::{
    synth::{ChannelActivity, SynthMessage, VoiceState},
    Engine, EngineConfig, MessageSender,
};

const BLOCK: usize = 256;

fn engine(voices: usize) -> (Engine, MessageSender) {
    let config = EngineConfig::new()
        .sample_rate(44_100)
        .block_len(BLOCK)
        .ports(1)
        .voices(voices);
    Engine::new(config).unwrap()
}

fn render(engine: &mut Engine, blocks: usize) -> Vec<i16> {
    let mut out = vec![0i16; BLOCK * 2 * blocks];
    for block in out.chunks_mut(BLOCK * 2) {
        engine.render_block(block);
    }
    out
}

fn note_on(channel: usize, note: u8) -> SynthMessage {
    SynthMessage::NoteOn {
        channel,
        note,
        velocity: 100,
    }
}

#[test]
fn single_note_is_audible_in_first_block() {
    let (mut engine, mut tx) = engine(128);
    assert!(tx.send(note_on(0, 60)));

    let out = render(&mut engine, 1);
    assert!(out.iter().any(|&s| s != 0));
    assert!(engine.channel(0).unwrap().activity() >= ChannelActivity::Standby);
}

#[test]
fn silence_without_notes() {
    let (mut engine, _tx) = engine(16);
    let out = render(&mut engine, 4);
    assert!(out.iter().all(|&s| s == 0));
    assert!(engine
        .channel_meters()
        .all(|m| m.activity == ChannelActivity::Free));
}

#[test]
fn every_note_gets_its_own_voice() {
    let (mut engine, mut tx) = engine(32);
    for ch in 0..4 {
        for note in [48, 55, 60, 64, 67, 72, 76, 79] {
            tx.send(note_on(ch, note));
        }
    }
    render(&mut engine, 1);
    assert_eq!(engine.pool().active_count(), 32);

    // retrigger everything: still one keyed voice per key
    for ch in 0..4 {
        for note in [48, 55, 60, 64] {
            tx.send(note_on(ch, note));
        }
    }
    render(&mut engine, 2);
    for ch in 0..4 {
        for note in [48, 55, 60, 64, 67, 72, 76, 79] {
            assert!(engine.pool().keyed_count(ch, note) <= 1);
        }
    }
}

#[test]
fn held_note_waits_for_pedal() {
    let (mut engine, mut tx) = engine(16);
    tx.send(SynthMessage::ControlChange {
        channel: 0,
        controller: 64,
        value: 127,
    });
    tx.send(note_on(0, 60));
    render(&mut engine, 4);
    tx.send(SynthMessage::NoteOff {
        channel: 0,
        note: 60,
    });
    render(&mut engine, 20);

    let states: Vec<_> = engine
        .pool()
        .voices()
        .filter(|v| !v.is_free())
        .map(|v| v.state())
        .collect();
    assert_eq!(states, vec![VoiceState::Hold]);

    tx.send(SynthMessage::ControlChange {
        channel: 0,
        controller: 64,
        value: 0,
    });
    render(&mut engine, 1);
    assert!(engine
        .pool()
        .voices()
        .all(|v| v.is_free() || v.state() == VoiceState::Release));
}

#[test]
fn immediate_key_up_under_pedal_still_sounds() {
    let (mut engine, mut tx) = engine(16);
    tx.send(SynthMessage::ControlChange {
        channel: 0,
        controller: 64,
        value: 127,
    });
    tx.send(note_on(0, 60));
    tx.send(SynthMessage::NoteOff {
        channel: 0,
        note: 60,
    });

    let out = render(&mut engine, 8);
    assert!(out.iter().any(|&s| s != 0));
    let states: Vec<_> = engine
        .pool()
        .voices()
        .filter(|v| !v.is_free())
        .map(|v| v.state())
        .collect();
    assert_eq!(states, vec![VoiceState::Hold]);

    tx.send(SynthMessage::ControlChange {
        channel: 0,
        controller: 64,
        value: 0,
    });
    // the release tail runs out within a few seconds
    render(&mut engine, 44_100 * 5 / BLOCK);
    assert_eq!(engine.pool().active_count(), 0);
}

#[test]
fn program_change_leaves_no_residue() {
    let (mut engine, mut tx) = engine(16);
    tx.send(SynthMessage::ProgramChange {
        channel: 5,
        program: 88,
    });
    tx.send(SynthMessage::ControlChange {
        channel: 5,
        controller: 94,
        value: 3,
    });
    tx.send(SynthMessage::ProgramChange {
        channel: 5,
        program: 33,
    });
    render(&mut engine, 1);

    let expected = &engine.bank().program(33).timbre;
    assert_eq!(engine.channel(5).unwrap().timbre(), expected);
}

#[test]
fn all_notes_off_returns_channel_to_free() {
    let (mut engine, mut tx) = engine(16);
    for note in [60, 64, 67] {
        tx.send(note_on(0, note));
    }
    render(&mut engine, 20);
    assert_eq!(
        engine.channel(0).unwrap().activity(),
        ChannelActivity::Active
    );

    tx.send(SynthMessage::ControlChange {
        channel: 0,
        controller: 123,
        value: 0,
    });
    // ten seconds is ample for the meters and the delay tail to fall away
    let out = render(&mut engine, 44_100 * 10 / BLOCK);
    assert_eq!(engine.pool().active_count(), 0);
    assert_eq!(engine.channel(0).unwrap().activity(), ChannelActivity::Free);
    assert!(out[out.len() - BLOCK * 2..].iter().all(|&s| s == 0));
}

#[test]
fn raw_midi_addresses_port_channels() {
    let config = EngineConfig::new().ports(2).voices(8);
    let (mut engine, mut tx) = Engine::new(config).unwrap();

    assert!(tx.send_midi(1, &[0x92, 60, 100]));
    assert!(!tx.send_midi(0, &[0x92]));
    render(&mut engine, 1);

    assert_eq!(engine.pool().keyed_count(18, 60), 1);
    assert_eq!(engine.pool().keyed_count(2, 60), 0);
}
