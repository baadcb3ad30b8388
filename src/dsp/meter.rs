/// Leaky RMS integrator plus decaying peak hold for one signal.
///
/// The RMS sum loses `3 / sample_rate` of itself per sample and the peak
/// `10 / sample_rate`, so both settle within a fraction of a second.
#[derive(Debug, Clone, Copy)]
pub struct LevelMeter {
    rms_sum: f32,
    rms: f32,
    peak: f32,
    rms_att: f32,
    rms_gain: f32,
    peak_att: f32,
}

impl LevelMeter {
    pub fn new(sample_rate: u32) -> Self {
        let sr = sample_rate as f32;
        let rms_att = 1.0 - 3.0 / sr;
        Self {
            rms_sum: 0.0,
            rms: 0.0,
            peak: 0.0,
            rms_att,
            rms_gain: 1.0 / rms_att - 1.0,
            peak_att: 1.0 - 10.0 / sr,
        }
    }

    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.rms_sum = (self.rms_sum + sample * sample) * self.rms_att;
        self.rms = self.rms_sum * self.rms_gain;
        self.peak = (self.peak * self.peak_att).max(sample.abs());
    }

    /// Mean-square level (not square-rooted).
    pub fn rms(&self) -> f32 {
        self.rms
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn reset(&mut self) {
        self.rms_sum = 0.0;
        self.rms = 0.0;
        self.peak = 0.0;
    }
}
