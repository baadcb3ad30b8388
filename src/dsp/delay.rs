#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    /// Amount of delayed signal added to the dry output.
    pub send: f32,
    /// Amount of delayed signal written back into the line.
    pub feedback: f32,
    /// Delay time in seconds (below one second).
    pub time: f32,
    /// 0.0 keeps sides separate, 0.5 fully blends them, 1.0 ping-pongs.
    pub cross: f32,
}

impl DelayParams {
    pub const fn new(send: f32, feedback: f32, time: f32, cross: f32) -> Self {
        Self {
            send,
            feedback,
            time,
            cross,
        }
    }

    pub const fn dry() -> Self {
        Self::new(0.0, 0.0, 0.2, 0.0)
    }
}

impl Default for DelayParams {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.2, 0.33)
    }
}

/// Stereo feedback delay over a one-second circular buffer.
pub struct StereoDelay {
    left: Vec<f32>,
    right: Vec<f32>,
    write_pos: usize,
    sample_rate: f32,
}

impl StereoDelay {
    pub fn new(sample_rate: u32) -> Self {
        let len = sample_rate.max(2) as usize;
        Self {
            left: vec![0.0; len],
            right: vec![0.0; len],
            write_pos: 0,
            sample_rate: sample_rate as f32,
        }
    }

    /// Buffer length in samples.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Delay time converted to whole samples, kept inside the buffer.
    #[inline]
    pub fn delay_samples(&self, time: f32) -> usize {
        let samples = (time * self.sample_rate).round();
        (samples.max(1.0) as usize).min(self.len() - 1)
    }

    /// Process one stereo sample, returning the wet+dry output.
    #[inline]
    pub fn next_sample(&mut self, input_l: f32, input_r: f32, params: &DelayParams) -> (f32, f32) {
        let len = self.len();
        let delay = self.delay_samples(params.time);
        let read_pos = (self.write_pos + len - delay) % len;

        let tap_l = self.left[read_pos];
        let tap_r = self.right[read_pos];
        let delayed_l = tap_l * (1.0 - params.cross) + tap_r * params.cross;
        let delayed_r = tap_r * (1.0 - params.cross) + tap_l * params.cross;

        self.left[self.write_pos] = input_l + delayed_l * params.feedback;
        self.right[self.write_pos] = input_r + delayed_r * params.feedback;
        self.write_pos = (self.write_pos + 1) % len;

        (
            input_l + delayed_l * params.send,
            input_r + delayed_r * params.send,
        )
    }

    pub fn reset(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
        self.write_pos = 0;
    }
}
