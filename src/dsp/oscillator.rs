#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::pan::PanTable, OPERATOR_COUNT};

/*
Oversampled Operators
=====================

A voice is eight oscillators ("operators") at slightly different pitch
ratios, gains and pan positions. Summed, the small detunings beat against
each other and the result sounds wide and moving.


Cheap Anti-Aliasing
-------------------

Naive pulse and saw waves jump instantly between values. Sampled once per
output sample, the jump lands wherever the sample grid happens to fall and
the error folds back as audible aliasing.

Each operator instead evaluates its waveform eight times per output sample,
advancing the phase by 1/8 of the per-sample increment between evaluations,
and sums the results:

    phase:   |--.--.--.--.--.--.--.--|     one output sample
    value:    +  +  +  +  -  -  -  -        sum = 0.0 (edge mid-sample)

A discontinuity that falls inside a sample produces an intermediate value
instead of a full-scale step. It is a box filter, not a band-limited
oscillator, but it costs eight compares instead of a table or a polyBLEP.


Waveforms
---------

  PulseWidth  +0.125 while phase < width, else -0.125 per sub-step, so eight
              sub-steps sum to a square in -1.0 ..= 1.0. The width comes
              from the operator config plus the voice's width LFO.

  Sawtooth    phase - floor(2 * phase) per sub-step, a ramp centered on zero
              (0.0 → 0.5, jump to -0.5 → 0.0). The eight-step sum is scaled
              by 0.25.
*/

/// Waveform evaluations summed per output sample.
pub const OVERSAMPLE: usize = 8;
const PULSE_STEP: f32 = 0.125;
const SAW_SCALE: f32 = 0.25;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    PulseWidth,
    Sawtooth,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorParams {
    /// Linear gain; 0.0 silences the operator.
    pub gain: f32,
    /// Frequency ratio relative to the note.
    pub pitch: f32,
    /// Pan offset added to the voice pan, -1.0 ..= 1.0.
    pub pan: f32,
    /// Pulse width (0.0 - 1.0). Ignored by the sawtooth.
    pub width: f32,
}

impl OperatorParams {
    pub const fn new(gain: f32, pitch: f32, pan: f32, width: f32) -> Self {
        Self {
            gain,
            pitch,
            pan,
            width,
        }
    }

    pub const fn silent() -> Self {
        Self::new(0.0, 1.0, 0.0, 0.5)
    }
}

impl Default for OperatorParams {
    fn default() -> Self {
        Self::silent()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Operator {
    phase: f32,
}

impl Operator {
    /// Sum one output sample's worth of sub-steps.
    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform, sub_delta: f32, width: f32) -> f32 {
        let mut sum = 0.0;
        match waveform {
            Waveform::PulseWidth => {
                for _ in 0..OVERSAMPLE {
                    self.phase -= self.phase.floor();
                    sum += if self.phase < width {
                        PULSE_STEP
                    } else {
                        -PULSE_STEP
                    };
                    self.phase += sub_delta;
                }
            }
            Waveform::Sawtooth => {
                for _ in 0..OVERSAMPLE {
                    self.phase -= self.phase.floor();
                    sum += self.phase - (self.phase * 2.0).floor();
                    self.phase += sub_delta;
                }
                sum *= SAW_SCALE;
            }
        }
        sum
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// The eight operators of one voice.
#[derive(Debug, Clone, Default)]
pub struct OperatorBank {
    operators: [Operator; OPERATOR_COUNT],
}

impl OperatorBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.operators.iter_mut().for_each(Operator::reset);
    }

    /// Render one stereo sample.
    ///
    /// `delta` is the voice's phase increment per output sample, `width_mod`
    /// the width LFO offset, `gain` and `pan` the voice's smoothed values.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn next_sample(
        &mut self,
        params: &[OperatorParams; OPERATOR_COUNT],
        waveform: Waveform,
        delta: f32,
        width_mod: f32,
        gain: f32,
        pan: f32,
        pans: &PanTable,
    ) -> (f32, f32) {
        let sub_delta = delta / OVERSAMPLE as f32;
        let mut left = 0.0;
        let mut right = 0.0;

        for (op, p) in self.operators.iter_mut().zip(params) {
            if p.gain == 0.0 {
                continue;
            }
            let value = op.next_sample(waveform, p.pitch * sub_delta, p.width + width_mod);
            let value = value * p.gain * gain;
            let (gl, gr) = pans.gains(p.pan + pan);
            left += value * gl;
            right += value * gr;
        }

        (left, right)
    }
}
