use std::f32::consts::TAU;

/*
Swept Resonant Low-Pass
=======================

Voices run a 4-pole low-pass: the same 2-pole biquad applied twice in
series. The cutoff comes from the filter envelope and moves every sample,
so the coefficients are rebuilt every sample too.


Coefficients
------------

With the cutoff normalized to the sample rate (0.0 - 0.5):

    rad   = cutoff * 0.975 * 2π          0.975 keeps clear of Nyquist
    alpha = sin(rad) / (4 * resonance + 1)

    ka1 = -2 cos(rad) / (1 + alpha)      feedback
    ka2 = (1 - alpha) / (1 + alpha)
    kb1 = (1 - cos(rad)) / (1 + alpha)   feed-forward
    kb2 = kb1 / 2

    y[n] = kb2 x[n] + kb1 x[n-1] + kb2 x[n-2] - ka1 y[n-1] - ka2 y[n-2]


Why polynomials instead of sin()/cos()
--------------------------------------

Calling the library trig functions twice per sample per voice is the single
most expensive thing the filter would do. Truncated Taylor series in rad²
(cos to x^8, sin to x^9) are a handful of multiply-adds evaluated with
Horner's rule, and being polynomials they stay smooth as the envelope sweeps:

    cos x ≈ 1 - x²/2! + x⁴/4! - x⁶/6! + x⁸/8!
    sin x ≈ x (1 - x²/3! + x⁴/5! - x⁶/7! + x⁸/9!)

Across 0 ≤ rad ≤ 0.975π the error stays within a few percent near the top of
the range and is negligible across the musically useful cutoffs.
*/

const ADJUST: f32 = 0.975 * TAU;
const INV_FACT2: f32 = 1.0 / 2.0;
const INV_FACT3: f32 = 1.0 / 6.0;
const INV_FACT4: f32 = 1.0 / 24.0;
const INV_FACT5: f32 = 1.0 / 120.0;
const INV_FACT6: f32 = 1.0 / 720.0;
const INV_FACT7: f32 = 1.0 / 5_040.0;
const INV_FACT8: f32 = 1.0 / 40_320.0;
const INV_FACT9: f32 = 1.0 / 362_880.0;

/// Highest normalized cutoff the coefficient polynomials are evaluated at.
pub const MAX_NORMALIZED_CUTOFF: f32 = 0.5;

/// cos(x) as an 8th-degree even polynomial.
#[inline]
pub fn cos_approx(x: f32) -> f32 {
    let x2 = x * x;
    ((((INV_FACT8 * x2 - INV_FACT6) * x2 + INV_FACT4) * x2 - INV_FACT2) * x2) + 1.0
}

/// sin(x) as a 9th-degree odd polynomial.
#[inline]
pub fn sin_approx(x: f32) -> f32 {
    let x2 = x * x;
    (((((INV_FACT9 * x2 - INV_FACT7) * x2 + INV_FACT5) * x2 - INV_FACT3) * x2) + 1.0) * x
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefs {
    pub ka1: f32,
    pub ka2: f32,
    pub kb1: f32,
    pub kb2: f32,
}

impl BiquadCoefs {
    /// Low-pass coefficients for a cutoff given as a fraction of the sample rate.
    #[inline]
    pub fn lowpass(normalized_cutoff: f32, resonance: f32) -> Self {
        let rad = normalized_cutoff.clamp(0.0, MAX_NORMALIZED_CUTOFF) * ADJUST;
        let c = cos_approx(rad);
        let s = sin_approx(rad);
        let alpha = s / (resonance * 4.0 + 1.0);
        let ka0 = alpha + 1.0;
        let kb1 = (1.0 - c) / ka0;

        Self {
            ka1: -2.0 * c / ka0,
            ka2: (1.0 - alpha) / ka0,
            kb1,
            kb2: kb1 * 0.5,
        }
    }
}

/// Two samples of input and output history for one biquad.
#[derive(Debug, Clone, Copy, Default)]
struct BiquadHistory {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadHistory {
    #[inline]
    fn process(&mut self, input: f32, k: &BiquadCoefs) -> f32 {
        let output =
            k.kb2 * input + k.kb1 * self.x1 + k.kb2 * self.x2 - k.ka1 * self.y1 - k.ka2 * self.y2;
        self.y2 = self.y1;
        self.y1 = output;
        self.x2 = self.x1;
        self.x1 = input;
        output
    }
}

/// One side of a voice's filter: two cascaded biquads (8 scalars of state).
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeLowPass {
    stages: [BiquadHistory; 2],
}

impl CascadeLowPass {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32, coefs: &BiquadCoefs) -> f32 {
        let first = self.stages[0].process(input, coefs);
        self.stages[1].process(first, coefs)
    }

    pub fn reset(&mut self) {
        self.stages = Default::default();
    }
}
