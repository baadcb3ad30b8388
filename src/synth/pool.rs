use log::trace;

use crate::{
    config::StealPolicy,
    synth::{
        channel::Channel,
        voice::{Voice, VoiceState, VoiceTables},
    },
};

/// Fixed arena of voices plus the list of those currently sounding.
pub struct VoicePool {
    voices: Vec<Voice>,
    active: Vec<usize>,
    policy: StealPolicy,
    dt: f32,
    next_age: u64,
}

impl VoicePool {
    pub fn new(size: usize, sample_rate: u32, policy: StealPolicy) -> Self {
        Self {
            voices: (0..size).map(|_| Voice::new()).collect(),
            active: Vec::with_capacity(size),
            policy,
            dt: 1.0 / sample_rate as f32,
            next_age: 0,
        }
    }

    /// Start `note` on `channel`. Any voice already sounding that key is
    /// purged first. Returns the voice index, or `None` if the note was dropped.
    pub fn allocate(&mut self, channel: &mut Channel, note: u8, velocity: u8) -> Option<usize> {
        let ch = channel.index();
        for &i in &self.active {
            let voice = &mut self.voices[i];
            if voice.channel() == ch && voice.note() == note {
                voice.purge();
            }
        }

        let index = match self.voices.iter().position(Voice::is_free) {
            Some(index) => index,
            None => match self.steal() {
                Some(index) => index,
                None => {
                    trace!("voice pool exhausted, dropping note {note} on channel {ch}");
                    return None;
                }
            },
        };

        let age = self.next_age;
        self.next_age += 1;
        self.voices[index].start(ch, &channel.bus(), note, velocity, age, self.dt);
        if !self.active.contains(&index) {
            self.active.push(index);
        }
        Some(index)
    }

    fn steal(&self) -> Option<usize> {
        match self.policy {
            StealPolicy::Drop => None,
            StealPolicy::OldestReleased => self
                .active
                .iter()
                .copied()
                .filter(|&i| {
                    matches!(
                        self.voices[i].state(),
                        VoiceState::Release | VoiceState::Purge
                    )
                })
                .min_by_key(|&i| self.voices[i].age()),
        }
    }

    fn keyed_on(&mut self, channel: usize) -> impl Iterator<Item = &mut Voice> {
        self.voices
            .iter_mut()
            .filter(move |v| !v.is_free() && v.channel() == channel)
    }

    /// Key up for `note` on `channel`.
    pub fn release(&mut self, channel: usize, note: u8, hold: bool) {
        for voice in self.keyed_on(channel) {
            if voice.note() == note && voice.state() == VoiceState::Press {
                voice.release(hold);
            }
        }
    }

    pub fn hold_off(&mut self, channel: usize) {
        self.keyed_on(channel).for_each(Voice::hold_off);
    }

    pub fn purge_all(&mut self, channel: usize) {
        self.keyed_on(channel).for_each(Voice::purge);
    }

    /// Render every active voice into its channel's input buffers.
    pub fn render_block(&mut self, channels: &mut [Channel], tables: &VoiceTables) {
        let voices = &mut self.voices;
        let dt = self.dt;
        self.active.retain(|&i| {
            let voice = &mut voices[i];
            match channels.get_mut(voice.channel()) {
                Some(channel) => voice.render(&mut channel.bus(), tables, dt),
                None => {
                    voice.free();
                    false
                }
            }
        });
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Voices still owned by a key (pressed, released or held) for `note`.
    pub fn keyed_count(&self, channel: usize, note: u8) -> usize {
        self.voices
            .iter()
            .filter(|v| v.channel() == channel && v.note() == note && v.state().is_keyed())
            .count()
    }
}
