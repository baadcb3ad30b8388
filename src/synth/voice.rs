use crate::{
    dsp::{
        filter::{BiquadCoefs, CascadeLowPass},
        lfo::{Lfo, SineTable},
        oscillator::OperatorBank,
        pan::PanTable,
        EnvelopeGenerator, EnvelopeKind, Gate, Waveform,
    },
    io::converter::midi_note_to_freq,
    synth::channel::ChannelBus,
};

/// Amplitude below which a voice that has finished attacking is freed.
pub const SILENCE_THRESHOLD: f32 = 1e-3;
/// Per-sample smoothing toward the channel's gain and pan.
const SMOOTHING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,
    /// Fast fade after being replaced or silenced.
    Purge,
    /// Key down.
    Press,
    /// Key up, releasing.
    Release,
    /// Key up while the hold pedal is down.
    Hold,
}

impl VoiceState {
    /// Sounding and still owned by its key.
    pub fn is_keyed(self) -> bool {
        matches!(self, VoiceState::Press | VoiceState::Release | VoiceState::Hold)
    }

    fn gate(self) -> Gate {
        match self {
            VoiceState::Press => Gate::Press,
            VoiceState::Hold => Gate::Hold,
            VoiceState::Purge => Gate::Purge,
            VoiceState::Release | VoiceState::Free => Gate::Release,
        }
    }
}

/// Lookup tables shared by every voice.
#[derive(Debug, Clone, Default)]
pub struct VoiceTables {
    pub sine: SineTable,
    pub pans: PanTable,
}

impl VoiceTables {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct Voice {
    state: VoiceState,
    channel: usize,
    note: u8,
    velocity: f32,
    age: u64,

    amp_eg: EnvelopeGenerator,
    filter_eg: EnvelopeGenerator,
    pitch_eg: EnvelopeGenerator,
    vibrato: Lfo,
    width_lfo: Lfo,
    operators: OperatorBank,
    filter_l: CascadeLowPass,
    filter_r: CascadeLowPass,

    gain: f32,
    pan: f32,
    base_delta: f32,
    waveform: Waveform,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    pub fn new() -> Self {
        Self {
            state: VoiceState::Free,
            channel: 0,
            note: 0,
            velocity: 0.0,
            age: 0,
            amp_eg: EnvelopeGenerator::new(EnvelopeKind::Amplitude),
            filter_eg: EnvelopeGenerator::new(EnvelopeKind::Cutoff),
            pitch_eg: EnvelopeGenerator::new(EnvelopeKind::Pitch),
            vibrato: Lfo::default(),
            width_lfo: Lfo::default(),
            operators: OperatorBank::new(),
            filter_l: CascadeLowPass::new(),
            filter_r: CascadeLowPass::new(),
            gain: 0.0,
            pan: 0.0,
            base_delta: 0.0,
            waveform: Waveform::default(),
        }
    }

    /// Begin a note on `channel`, reading the timbre and pan from its bus.
    pub fn start(
        &mut self,
        channel: usize,
        bus: &ChannelBus<'_>,
        note: u8,
        velocity: u8,
        age: u64,
        dt: f32,
    ) {
        let timbre = bus.timbre;
        self.state = VoiceState::Press;
        self.channel = channel;
        self.note = note;
        self.velocity = (velocity & 0x7F) as f32 / 127.0;
        self.age = age;

        self.amp_eg.trigger(&timbre.amp_eg);
        self.filter_eg.trigger(&timbre.filter_eg);
        self.pitch_eg.trigger(&timbre.pitch_eg);
        self.vibrato.reset();
        self.width_lfo.reset();
        self.operators.reset();
        self.filter_l.reset();
        self.filter_r.reset();

        self.gain = 0.0;
        self.pan = bus.pan;
        self.base_delta = midi_note_to_freq(note) * dt;
        self.waveform = timbre.waveform;
    }

    /// Key up. With the pedal down the voice keeps sounding in `Hold`.
    pub fn release(&mut self, hold: bool) {
        if self.state == VoiceState::Press {
            self.state = if hold {
                VoiceState::Hold
            } else {
                VoiceState::Release
            };
        }
    }

    pub fn hold_off(&mut self) {
        if self.state == VoiceState::Hold {
            self.state = VoiceState::Release;
        }
    }

    pub fn purge(&mut self) {
        if self.state.is_keyed() {
            self.state = VoiceState::Purge;
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
    }

    /// Render into the channel's input buffers. Returns `false` once the
    /// voice has gone silent and been freed.
    pub fn render(&mut self, bus: &mut ChannelBus<'_>, tables: &VoiceTables, dt: f32) -> bool {
        if self.state == VoiceState::Free {
            return false;
        }
        let timbre = bus.timbre;

        for (out_l, out_r) in bus.left.iter_mut().zip(bus.right.iter_mut()) {
            let gate = self.state.gate();
            let amp = self.amp_eg.next_sample(&timbre.amp_eg, gate, dt);
            let cutoff = self.filter_eg.next_sample(&timbre.filter_eg, gate, dt);
            let bend = self.pitch_eg.next_sample(&timbre.pitch_eg, gate, dt);

            let attacking = matches!(self.state, VoiceState::Press | VoiceState::Hold)
                && self.amp_eg.is_attacking();
            if amp < SILENCE_THRESHOLD && !attacking {
                self.free();
                return false;
            }

            self.gain += (bus.gain * amp * self.velocity - self.gain) * SMOOTHING;
            self.pan += (bus.pan - self.pan) * SMOOTHING;

            let vibrato = self.vibrato.next_vibrato(&timbre.vibrato, &tables.sine, dt);
            let width = self.width_lfo.next_offset(&timbre.width_lfo, &tables.sine, dt);
            let delta = self.base_delta * bus.pitch * bend * vibrato;

            let (l, r) = self.operators.next_sample(
                &timbre.operators,
                self.waveform,
                delta,
                width,
                self.gain,
                self.pan,
                &tables.pans,
            );

            let coefs = BiquadCoefs::lowpass(cutoff * dt, timbre.resonance);
            *out_l += self.filter_l.next_sample(l, &coefs);
            *out_r += self.filter_r.next_sample(r, &coefs);
        }
        true
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn amplitude(&self) -> f32 {
        self.amp_eg.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{channel::Channel, preset::Timbre};

    const SAMPLE_RATE: u32 = 44_100;
    const DT: f32 = 1.0 / SAMPLE_RATE as f32;
    const BLOCK: usize = 256;

    fn setup() -> (Channel, Voice, VoiceTables) {
        let mut channel = Channel::new(0, SAMPLE_RATE, BLOCK, Timbre::default());
        let mut voice = Voice::new();
        voice.start(0, &channel.bus(), 60, 100, 0, DT);
        (channel, voice, VoiceTables::new())
    }

    fn peak(channel: &mut Channel) -> f32 {
        let bus = channel.bus();
        let peak = bus
            .left
            .iter()
            .chain(bus.right.iter())
            .fold(0.0_f32, |m, x| m.max(x.abs()));
        bus.left.fill(0.0);
        bus.right.fill(0.0);
        peak
    }

    #[test]
    fn press_renders_sound() {
        let (mut channel, mut voice, tables) = setup();
        assert_eq!(voice.state(), VoiceState::Press);
        assert!(voice.render(&mut channel.bus(), &tables, DT));
        assert!(peak(&mut channel) > 1e-3);
    }

    #[test]
    fn release_frees_after_fade() {
        let (mut channel, mut voice, tables) = setup();
        voice.render(&mut channel.bus(), &tables, DT);
        voice.release(false);
        assert_eq!(voice.state(), VoiceState::Release);

        let mut blocks = 0;
        while voice.render(&mut channel.bus(), &tables, DT) {
            blocks += 1;
            assert!(blocks < 2_000, "voice never freed");
        }
        assert!(voice.is_free());
        assert!(voice.amplitude() < SILENCE_THRESHOLD);
    }

    #[test]
    fn hold_keeps_voice_until_pedal_lifts() {
        let (mut channel, mut voice, tables) = setup();
        voice.release(true);
        assert_eq!(voice.state(), VoiceState::Hold);
        voice.render(&mut channel.bus(), &tables, DT);
        assert_eq!(voice.state(), VoiceState::Hold);
        voice.hold_off();
        assert_eq!(voice.state(), VoiceState::Release);
    }

    #[test]
    fn key_up_under_pedal_before_first_sample_still_sounds() {
        let (mut channel, mut voice, tables) = setup();
        voice.release(true);
        assert!(voice.render(&mut channel.bus(), &tables, DT));
        assert_eq!(voice.state(), VoiceState::Hold);
        assert!(peak(&mut channel) > 0.0);
        assert!(voice.amplitude() > SILENCE_THRESHOLD);

        voice.hold_off();
        let mut blocks = 0;
        while voice.render(&mut channel.bus(), &tables, DT) {
            blocks += 1;
            assert!(blocks < 2_000, "voice never freed after pedal lifted");
        }
        assert!(voice.is_free());
    }

    #[test]
    fn purge_fades_within_a_block() {
        let (mut channel, mut voice, tables) = setup();
        for _ in 0..10 {
            voice.render(&mut channel.bus(), &tables, DT);
        }
        voice.purge();
        assert_eq!(voice.state(), VoiceState::Purge);
        // 10% per sample: 0.9^256 is far below the threshold
        assert!(!voice.render(&mut channel.bus(), &tables, DT));
        assert!(voice.is_free());
    }

    #[test]
    fn attack_is_not_cut_short() {
        let (mut channel, mut voice, tables) = setup();
        assert!(voice.render(&mut channel.bus(), &tables, DT));
        assert!(voice.amplitude() > SILENCE_THRESHOLD);
    }
}
