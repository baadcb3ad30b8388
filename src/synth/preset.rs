//! Instrument presets and the program-number bank.
//!
//! A preset is an immutable [`Timbre`]. Program Change copies the whole
//! timbre into the channel; nothing from the previous program survives.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::SynthError;

use crate::{
    dsp::{delay::DelayParams, lfo::LfoParams, EnvelopeParams, OperatorParams, Waveform},
    OPERATOR_COUNT,
};

/// Number of addressable MIDI programs.
pub const PROGRAM_COUNT: usize = 128;

/// Everything about a channel's sound that Program Change replaces.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Timbre {
    pub waveform: Waveform,
    pub amp_eg: EnvelopeParams,
    /// Cutoff envelope, values in Hz.
    pub filter_eg: EnvelopeParams,
    pub pitch_eg: EnvelopeParams,
    pub resonance: f32,
    pub vibrato: LfoParams,
    pub width_lfo: LfoParams,
    pub operators: [OperatorParams; OPERATOR_COUNT],
    pub delay: DelayParams,
}

impl Timbre {
    /// Checks the invariants the DSP relies on: positive time constants,
    /// positive pitch ratios and a delay shorter than the delay buffer.
    pub fn is_valid(&self) -> bool {
        let envelopes_ok = [&self.amp_eg, &self.filter_eg, &self.pitch_eg]
            .iter()
            .all(|eg| eg.has_valid_times());
        let lfos_ok = [&self.vibrato, &self.width_lfo]
            .iter()
            .all(|lfo| lfo.delay > 0.0 && lfo.rate >= 0.0);
        let operators_ok = self.operators.iter().all(|op| op.pitch > 0.0 && op.gain >= 0.0);
        let delay_ok = self.delay.time > 0.0 && self.delay.time < 1.0 && self.delay.feedback < 1.0;

        envelopes_ok && lfos_ok && operators_ok && delay_ok && self.resonance >= 0.0
    }
}

impl Default for Timbre {
    fn default() -> Self {
        saw_pluck().timbre
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub timbre: Timbre,
}

impl Preset {
    pub fn new(name: impl Into<String>, timbre: Timbre) -> Self {
        Self {
            name: name.into(),
            timbre,
        }
    }
}

/// Maps the 128 program numbers onto a list of presets.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "BankData")
)]
#[derive(Debug, Clone)]
pub struct PresetBank {
    presets: Vec<Preset>,
    /// Preset index for each program number.
    programs: Vec<usize>,
}

/// Unchecked bank as read from disk.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BankData {
    presets: Vec<Preset>,
    programs: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<BankData> for PresetBank {
    type Error = SynthError;

    fn try_from(data: BankData) -> Result<Self, Self::Error> {
        let programs = data.programs.len();
        PresetBank::new(data.presets, data.programs).ok_or_else(|| {
            SynthError::InvalidBank(format!(
                "{programs} program entries, need {PROGRAM_COUNT} pointing into a non-empty preset list"
            ))
        })
    }
}

impl PresetBank {
    /// Builds a bank, returning `None` if it is empty or a program points
    /// past the preset list.
    pub fn new(presets: Vec<Preset>, programs: Vec<usize>) -> Option<Self> {
        if presets.is_empty() || programs.len() != PROGRAM_COUNT {
            return None;
        }
        if programs.iter().any(|&p| p >= presets.len()) {
            return None;
        }
        Some(Self { presets, programs })
    }

    /// Every program plays the same preset.
    pub fn single(preset: Preset) -> Self {
        Self {
            presets: vec![preset],
            programs: vec![0; PROGRAM_COUNT],
        }
    }

    /// One preset per General MIDI family (eight programs each).
    pub fn general_midi() -> Self {
        let presets = vec![
            saw_pluck(),   // 0
            glass_pulse(), // 1
            drawbar(),     // 2
            saw_bass(),    // 3
            saw_strings(), // 4
            saw_brass(),   // 5
            pulse_reed(),  // 6
            soft_pulse(),  // 7
            square_lead(), // 8
            pwm_pad(),     // 9
            pitch_drop(),  // 10
        ];
        // piano, chromatic perc, organ, guitar, bass, strings, ensemble, brass,
        // reed, pipe, synth lead, synth pad, synth fx, ethnic, percussive, sfx
        const FAMILIES: [usize; 16] = [0, 1, 2, 0, 3, 4, 4, 5, 6, 7, 8, 9, 9, 0, 1, 10];
        let programs = (0..PROGRAM_COUNT).map(|p| FAMILIES[p >> 3]).collect();

        Self { presets, programs }
    }

    pub fn program(&self, program: u8) -> &Preset {
        let index = self.programs[program as usize % PROGRAM_COUNT];
        &self.presets[index]
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }
}

impl Default for PresetBank {
    fn default() -> Self {
        Self::general_midi()
    }
}

fn operators(list: &[(f32, f32, f32, f32)]) -> [OperatorParams; OPERATOR_COUNT] {
    let mut out = [OperatorParams::silent(); OPERATOR_COUNT];
    for (slot, &(gain, pitch, pan, width)) in out.iter_mut().zip(list) {
        *slot = OperatorParams::new(gain, pitch, pan, width);
    }
    out
}

pub fn saw_pluck() -> Preset {
    Preset::new(
        "Saw Pluck",
        Timbre {
            waveform: Waveform::Sawtooth,
            amp_eg: EnvelopeParams::amplitude(0.002, 0.6, 0.0, 0.15, 1.5),
            filter_eg: EnvelopeParams::cutoff(0.001, 0.25, 0.05, 6_000.0, 6_000.0, 600.0, 200.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.4,
            vibrato: LfoParams::off(),
            width_lfo: LfoParams::off(),
            operators: operators(&[
                (0.35, 1.0, -0.2, 0.5),
                (0.35, 1.003, 0.2, 0.5),
                (0.15, 2.0, 0.0, 0.5),
            ]),
            delay: DelayParams::new(0.25, 0.3, 0.25, 0.33),
        },
    )
}

pub fn glass_pulse() -> Preset {
    Preset::new(
        "Glass Pulse",
        Timbre {
            waveform: Waveform::PulseWidth,
            amp_eg: EnvelopeParams::amplitude(0.001, 0.8, 0.0, 0.3, 2.0),
            filter_eg: EnvelopeParams::cutoff(0.001, 0.5, 0.2, 9_000.0, 9_000.0, 3_000.0, 1_000.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.2,
            vibrato: LfoParams::off(),
            width_lfo: LfoParams::off(),
            operators: operators(&[
                (0.4, 1.0, 0.0, 0.5),
                (0.2, 2.0, -0.3, 0.25),
                (0.15, 3.01, 0.3, 0.5),
                (0.1, 4.02, 0.0, 0.3),
            ]),
            delay: DelayParams::new(0.4, 0.4, 0.3, 0.5),
        },
    )
}

pub fn drawbar() -> Preset {
    Preset::new(
        "Drawbar",
        Timbre {
            waveform: Waveform::PulseWidth,
            amp_eg: EnvelopeParams::amplitude(0.003, 0.01, 1.0, 0.02, 0.02),
            filter_eg: EnvelopeParams::cutoff(0.001, 0.01, 0.01, 5_000.0, 5_000.0, 5_000.0, 5_000.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.0,
            vibrato: LfoParams::new(0.004, 6.5, 0.01),
            width_lfo: LfoParams::off(),
            operators: operators(&[
                (0.25, 0.5, 0.0, 0.5),
                (0.3, 1.0, 0.0, 0.5),
                (0.2, 2.0, -0.2, 0.5),
                (0.1, 3.0, 0.2, 0.5),
                (0.1, 4.0, 0.0, 0.5),
            ]),
            delay: DelayParams::new(0.15, 0.2, 0.12, 0.5),
        },
    )
}

pub fn saw_bass() -> Preset {
    Preset::new(
        "Saw Bass",
        Timbre {
            waveform: Waveform::Sawtooth,
            amp_eg: EnvelopeParams::amplitude(0.002, 0.4, 0.6, 0.05, 0.4),
            filter_eg: EnvelopeParams::cutoff(0.001, 0.12, 0.03, 3_000.0, 3_000.0, 400.0, 120.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.8,
            vibrato: LfoParams::off(),
            width_lfo: LfoParams::off(),
            operators: operators(&[(0.5, 1.0, 0.0, 0.5), (0.35, 0.5, 0.0, 0.5)]),
            delay: DelayParams::dry(),
        },
    )
}

pub fn saw_strings() -> Preset {
    Preset::new(
        "Saw Strings",
        Timbre {
            waveform: Waveform::Sawtooth,
            amp_eg: EnvelopeParams::amplitude(0.12, 0.5, 0.85, 0.35, 3.0),
            filter_eg: EnvelopeParams::cutoff(0.2, 0.5, 0.3, 800.0, 5_000.0, 3_500.0, 600.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.1,
            vibrato: LfoParams::new(0.003, 5.5, 0.4),
            width_lfo: LfoParams::off(),
            operators: operators(&[
                (0.13, 0.975, -0.9, 0.5),
                (0.10, 0.98, 0.6, 0.5),
                (0.10, 0.99, -0.3, 0.5),
                (0.26, 1.0, 0.0, 0.5),
                (0.10, 1.01, 0.3, 0.5),
                (0.10, 1.02, -0.6, 0.5),
                (0.13, 1.025, 0.9, 0.5),
            ]),
            delay: DelayParams::new(0.35, 0.45, 0.33, 0.4),
        },
    )
}

pub fn saw_brass() -> Preset {
    Preset::new(
        "Saw Brass",
        Timbre {
            waveform: Waveform::Sawtooth,
            amp_eg: EnvelopeParams::amplitude(0.03, 0.3, 0.8, 0.12, 1.0),
            filter_eg: EnvelopeParams::cutoff(0.06, 0.3, 0.1, 300.0, 4_500.0, 2_200.0, 300.0),
            pitch_eg: EnvelopeParams::pitch(0.02, 0.03, 0.1, 0.97, 1.0, 0.99),
            resonance: 0.3,
            vibrato: LfoParams::new(0.004, 5.0, 0.5),
            width_lfo: LfoParams::off(),
            operators: operators(&[
                (0.3, 1.0, -0.15, 0.5),
                (0.3, 1.004, 0.15, 0.5),
                (0.15, 0.5, 0.0, 0.5),
            ]),
            delay: DelayParams::new(0.2, 0.3, 0.2, 0.33),
        },
    )
}

pub fn pulse_reed() -> Preset {
    Preset::new(
        "Pulse Reed",
        Timbre {
            waveform: Waveform::PulseWidth,
            amp_eg: EnvelopeParams::amplitude(0.02, 0.2, 0.9, 0.08, 0.8),
            filter_eg: EnvelopeParams::cutoff(0.02, 0.2, 0.08, 1_500.0, 3_500.0, 2_800.0, 800.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.5,
            vibrato: LfoParams::new(0.005, 5.0, 0.3),
            width_lfo: LfoParams::new(0.05, 0.7, 0.2),
            operators: operators(&[(0.45, 1.0, 0.0, 0.3), (0.2, 2.0, 0.0, 0.4)]),
            delay: DelayParams::new(0.2, 0.25, 0.18, 0.33),
        },
    )
}

pub fn soft_pulse() -> Preset {
    Preset::new(
        "Soft Pulse",
        Timbre {
            waveform: Waveform::PulseWidth,
            amp_eg: EnvelopeParams::amplitude(0.05, 0.3, 0.8, 0.2, 1.5),
            filter_eg: EnvelopeParams::cutoff(0.05, 0.3, 0.2, 1_200.0, 1_800.0, 1_400.0, 500.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.0,
            vibrato: LfoParams::new(0.004, 4.5, 0.6),
            width_lfo: LfoParams::off(),
            operators: operators(&[(0.5, 1.0, -0.1, 0.5), (0.3, 2.0, 0.1, 0.5)]),
            delay: DelayParams::new(0.4, 0.4, 0.28, 0.5),
        },
    )
}

pub fn square_lead() -> Preset {
    Preset::new(
        "Square Lead",
        Timbre {
            waveform: Waveform::PulseWidth,
            amp_eg: EnvelopeParams::amplitude(0.003, 0.2, 0.8, 0.08, 0.6),
            filter_eg: EnvelopeParams::cutoff(0.001, 0.3, 0.1, 7_000.0, 7_000.0, 3_000.0, 800.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.5,
            vibrato: LfoParams::new(0.006, 5.8, 0.35),
            width_lfo: LfoParams::off(),
            operators: operators(&[(0.4, 1.0, -0.1, 0.5), (0.4, 1.005, 0.1, 0.5)]),
            delay: DelayParams::new(0.3, 0.35, 0.3, 0.6),
        },
    )
}

pub fn pwm_pad() -> Preset {
    Preset::new(
        "PWM Pad",
        Timbre {
            waveform: Waveform::PulseWidth,
            amp_eg: EnvelopeParams::amplitude(0.4, 1.0, 0.8, 0.8, 4.0),
            filter_eg: EnvelopeParams::cutoff(0.8, 1.0, 0.8, 400.0, 2_500.0, 1_800.0, 400.0),
            pitch_eg: EnvelopeParams::flat_pitch(),
            resonance: 0.2,
            vibrato: LfoParams::new(0.002, 4.0, 1.0),
            width_lfo: LfoParams::new(0.2, 0.3, 0.5),
            operators: operators(&[
                (0.2, 1.0, -0.7, 0.5),
                (0.2, 1.006, 0.7, 0.45),
                (0.15, 0.5, 0.0, 0.5),
                (0.1, 2.0, -0.3, 0.4),
                (0.1, 2.004, 0.3, 0.6),
            ]),
            delay: DelayParams::new(0.45, 0.5, 0.4, 0.5),
        },
    )
}

pub fn pitch_drop() -> Preset {
    Preset::new(
        "Pitch Drop",
        Timbre {
            waveform: Waveform::Sawtooth,
            amp_eg: EnvelopeParams::amplitude(0.001, 0.5, 0.3, 0.3, 1.0),
            filter_eg: EnvelopeParams::cutoff(0.001, 0.4, 0.2, 8_000.0, 8_000.0, 1_500.0, 300.0),
            pitch_eg: EnvelopeParams::pitch(0.15, 0.2, 0.3, 2.0, 0.5, 0.25),
            resonance: 0.6,
            vibrato: LfoParams::off(),
            width_lfo: LfoParams::off(),
            operators: operators(&[(0.45, 1.0, -0.3, 0.5), (0.3, 1.5, 0.3, 0.5)]),
            delay: DelayParams::new(0.5, 0.55, 0.375, 0.8),
        },
    )
}
