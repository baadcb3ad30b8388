#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MIN_TIME;

/*
Exponential-Approach Envelopes
==============================

Every voice runs three envelope generators: amplitude, filter cutoff and
pitch. They share one state machine and one update law; only their targets
and initial values differ.


Vocabulary
----------

  value       The envelope's current output. Amplitude runs 0.0 - 1.0, the
              cutoff envelope is in Hz, the pitch envelope is a frequency
              multiplier (1.0 = no bend).

  rise        Value the envelope starts from on note-on (amplitude always
              starts from 0.0).

  level       Attack target (amplitude always aims for 1.0).

  sustain     Decay target, held until note-off. The pitch envelope always
              settles back to 1.0.

  fall        Release target (amplitude always falls to 0.0).

  gate        What the owning voice is doing: pressed, released, held by the
              sustain pedal, or purged.


The Law: Exponential Approach
-----------------------------

Each sample moves the value a fixed fraction of the remaining distance:

    value += (target - value) * dt / T

    T   the segment's time constant in seconds
    dt  seconds per sample (1 / sample_rate)

After T seconds about 63% of the distance is covered, after 5T more than
99%. The curve never overshoots as long as dt / T stays at or below 1, so the
coefficient is clamped there; a time constant shorter than one sample simply
jumps to the target.

        target ┤          ________________
               │      .--'
               │   .-'
               │  /
               │ /
        start  ┼'─────────────────────────→ time


Segments
--------

  Attack    approach `level` with `attack`. Leaves attack once the value sits
            within ±0.5% of `level`.
  Decay     approach `sustain` with `decay`. No exit until the gate changes.
  Release   approach `fall` with `release`.
  Hold      approach `fall` with `hold` (pedal down after note-off). A key
            released under the pedal before its attack arrived finishes the
            attack first.
  Purge     amplitude only: lose 10% per sample regardless of configured
            times. Reclaims a voice in a few milliseconds without a click.
            Cutoff and pitch keep following their release law.
*/

/// Fraction of the attack target that counts as "arrived".
pub const ATTACK_BAND: f32 = 0.005;
/// Per-sample loss of the amplitude envelope while purging.
pub const PURGE_RATE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Amplitude,
    Cutoff,
    Pitch,
}

/// The note state driving an envelope for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Press,
    Release,
    Hold,
    Purge,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub release: f32,
    pub hold: f32,
    pub rise: f32,
    pub level: f32,
    pub sustain: f32,
    pub fall: f32,
}

impl EnvelopeParams {
    /// Amplitude envelope: 0 → 1 → sustain → 0.
    pub fn amplitude(attack: f32, decay: f32, sustain: f32, release: f32, hold: f32) -> Self {
        Self {
            attack,
            decay,
            release,
            hold,
            rise: 0.0,
            level: 1.0,
            sustain: sustain.clamp(0.0, 1.0),
            fall: 0.0,
        }
    }

    /// Cutoff envelope in Hz. Holding uses the release time.
    pub fn cutoff(
        attack: f32,
        decay: f32,
        release: f32,
        rise: f32,
        level: f32,
        sustain: f32,
        fall: f32,
    ) -> Self {
        Self {
            attack,
            decay,
            release,
            hold: release,
            rise,
            level,
            sustain,
            fall,
        }
    }

    /// Pitch multiplier envelope. Decay always settles on 1.0.
    pub fn pitch(attack: f32, decay: f32, release: f32, rise: f32, level: f32, fall: f32) -> Self {
        Self {
            attack,
            decay,
            release,
            hold: release,
            rise,
            level,
            sustain: 1.0,
            fall,
        }
    }

    /// A pitch envelope that never bends.
    pub fn flat_pitch() -> Self {
        Self::pitch(0.001, 0.001, 0.001, 1.0, 1.0, 1.0)
    }

    /// All four time constants are finite and positive.
    pub fn has_valid_times(&self) -> bool {
        [self.attack, self.decay, self.release, self.hold]
            .iter()
            .all(|t| t.is_finite() && *t > 0.0)
    }
}

#[inline]
fn approach(value: f32, target: f32, time: f32, dt: f32) -> f32 {
    let k = (dt / time.max(MIN_TIME)).min(1.0);
    value + (target - value) * k
}

#[inline]
fn within_band(value: f32, target: f32) -> bool {
    (value - target).abs() <= ATTACK_BAND * target.abs().max(f32::EPSILON)
}

#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    kind: EnvelopeKind,
    value: f32,
    attacking: bool,
}

impl EnvelopeGenerator {
    pub fn new(kind: EnvelopeKind) -> Self {
        Self {
            kind,
            value: 0.0,
            attacking: false,
        }
    }

    /// Note-on: restart from the initial value in the attack segment.
    pub fn trigger(&mut self, params: &EnvelopeParams) {
        self.value = match self.kind {
            EnvelopeKind::Amplitude => 0.0,
            EnvelopeKind::Cutoff | EnvelopeKind::Pitch => params.rise,
        };
        self.attacking = true;
    }

    /// Advance by one sample and return the new value.
    pub fn next_sample(&mut self, params: &EnvelopeParams, gate: Gate, dt: f32) -> f32 {
        self.value = match gate {
            Gate::Press | Gate::Hold if self.attacking => {
                let value = approach(self.value, params.level, params.attack, dt);
                if within_band(value, params.level) {
                    self.attacking = false;
                }
                value
            }
            Gate::Press => approach(self.value, params.sustain, params.decay, dt),
            Gate::Release => approach(self.value, params.fall, params.release, dt),
            Gate::Hold => approach(self.value, params.fall, params.hold, dt),
            Gate::Purge => match self.kind {
                EnvelopeKind::Amplitude => self.value - self.value * PURGE_RATE,
                EnvelopeKind::Cutoff | EnvelopeKind::Pitch => {
                    approach(self.value, params.fall, params.release, dt)
                }
            },
        };
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// True until the first attack segment has arrived at its level.
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }
}
