//! Low Frequency Oscillators driving vibrato and pulse-width modulation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

use crate::MIN_TIME;

/*
Delayed-Onset LFOs
==================

Each voice carries two LFOs, both sine-shaped:

  LFO 1   vibrato. Output is a pitch multiplier around 1.0:
              value = 1.0 + sin(phase) * depth

  LFO 2   width modulation. Output is an offset added to every operator's
          pulse width:
              value = sin(phase) * depth


Onset Delay
-----------

Vibrato that starts at full depth on every note sounds mechanical. Players
bring it in after the note has settled. Each LFO's depth starts at zero on
note-on and approaches the configured depth with the `delay` time constant,
the same exponential approach the envelopes use:

    depth += (target_depth - depth) * dt / delay

    depth
      ^          ___________
      │       .-'
      │     .'
      │   .'
      0 ┼─'──────────────────→ time
         note-on


Sine Lookup
-----------

The sine comes from a 96-entry table shared by every voice, read with
linear interpolation. The table has one extra entry (sin 2π = 0) so the
interpolation at the last segment never wraps:

    index = phase * 96
    value = table[i] * (1 - frac) + table[i + 1] * frac

At LFO rates the interpolation error is far below anything audible, and it
avoids a sin() call per LFO per voice per sample.
*/

/// Segments in one period of the sine table.
pub const SINE_TABLE_LEN: usize = 96;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    /// Target modulation depth.
    pub depth: f32,
    /// Rate in Hz.
    pub rate: f32,
    /// Onset time constant in seconds.
    pub delay: f32,
}

impl LfoParams {
    pub const fn new(depth: f32, rate: f32, delay: f32) -> Self {
        Self { depth, rate, delay }
    }

    pub const fn off() -> Self {
        Self::new(0.0, 0.0, 0.1)
    }
}

impl Default for LfoParams {
    fn default() -> Self {
        Self::off()
    }
}

#[derive(Debug, Clone)]
pub struct SineTable {
    values: [f32; SINE_TABLE_LEN + 1],
}

impl SineTable {
    pub fn new() -> Self {
        let mut values = [0.0; SINE_TABLE_LEN + 1];
        for (i, v) in values.iter_mut().enumerate().take(SINE_TABLE_LEN) {
            *v = (TAU * i as f32 / SINE_TABLE_LEN as f32).sin();
        }
        Self { values }
    }

    /// Interpolated sine of a phase in 0.0 ..< 1.0 (one period).
    #[inline]
    pub fn lookup(&self, phase: f32) -> f32 {
        let index_f = phase * SINE_TABLE_LEN as f32;
        let index = (index_f as usize).min(SINE_TABLE_LEN - 1);
        let frac = index_f - index as f32;
        self.values[index] * (1.0 - frac) + self.values[index + 1] * frac
    }
}

impl Default for SineTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lfo {
    phase: f32,
    depth: f32,
    sine: f32,
}

impl Lfo {
    /// Note-on: zero depth, restart the cycle.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.depth = 0.0;
        self.sine = 0.0;
    }

    #[inline]
    fn advance(&mut self, params: &LfoParams, table: &SineTable, dt: f32) -> f32 {
        self.phase -= self.phase.floor();
        self.sine = table.lookup(self.phase);
        let scaled = self.sine * self.depth;

        let k = (dt / params.delay.max(MIN_TIME)).min(1.0);
        self.depth += (params.depth - self.depth) * k;
        self.phase += params.rate * dt;
        scaled
    }

    /// Vibrato output: a pitch multiplier around 1.0.
    #[inline]
    pub fn next_vibrato(&mut self, params: &LfoParams, table: &SineTable, dt: f32) -> f32 {
        1.0 + self.advance(params, table, dt)
    }

    /// Width-modulation output: an offset around 0.0.
    #[inline]
    pub fn next_offset(&mut self, params: &LfoParams, table: &SineTable, dt: f32) -> f32 {
        self.advance(params, table, dt)
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 44_100.0;

    #[test]
    fn table_interpolates_sine() {
        let table = SineTable::new();
        for i in 0..1_000 {
            let phase = i as f32 / 1_000.0;
            let expected = (TAU * phase).sin();
            assert!((table.lookup(phase) - expected).abs() < 1e-3, "phase {phase}");
        }
    }

    #[test]
    fn depth_fades_in_with_delay() {
        let table = SineTable::new();
        let params = LfoParams::new(0.5, 5.0, 0.2);
        let mut lfo = Lfo::default();
        lfo.reset();

        for _ in 0..(0.2 / DT) as usize {
            lfo.next_offset(&params, &table, DT);
        }
        // one time constant: ~63%
        assert!((lfo.depth() - 0.5 * 0.632).abs() < 0.01, "depth {}", lfo.depth());

        for _ in 0..(2.0 / DT) as usize {
            lfo.next_offset(&params, &table, DT);
        }
        assert!((lfo.depth() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn vibrato_swings_around_unity() {
        let table = SineTable::new();
        let params = LfoParams::new(0.02, 6.0, MIN_TIME);
        let mut lfo = Lfo::default();

        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for _ in 0..44_100 {
            let v = lfo.next_vibrato(&params, &table, DT);
            lo = lo.min(v);
            hi = hi.max(v);
        }
        assert!((hi - 1.02).abs() < 1e-3, "hi {hi}");
        assert!((lo - 0.98).abs() < 1e-3, "lo {lo}");
    }

    #[test]
    fn disabled_lfo_is_neutral() {
        let table = SineTable::new();
        let params = LfoParams::off();
        let mut lfo = Lfo::default();
        for _ in 0..1_000 {
            assert_eq!(lfo.next_vibrato(&params, &table, DT), 1.0);
        }
    }
}
