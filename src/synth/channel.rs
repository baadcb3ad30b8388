//! Per-channel performance state, effects and metering.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use log::debug;

use crate::{
    dsp::{delay::StereoDelay, meter::LevelMeter},
    synth::preset::{Preset, Timbre},
};

/// Either side's RMS at or above this wakes a standby channel.
pub const ACTIVE_THRESHOLD: f32 = 1e-4;
/// Both sides' RMS below this puts an active channel to sleep.
pub const FREE_THRESHOLD: f32 = 1e-7;

const BEND_CENTER: u16 = 8192;
const DEFAULT_BEND_RANGE: u8 = 2;
const RPN_NULL: u8 = 127;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ChannelActivity {
    /// Silent and skipped while mixing.
    #[default]
    Free,
    /// Armed by a Note-On, waiting for its output to become audible.
    Standby,
    Active,
}

/// Voice-pool work a controller message asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAction {
    None,
    /// Move held voices into release.
    HoldOff,
    /// Fast-fade every sounding voice.
    PurgeAll,
}

/// Level and activity snapshot for display.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelMeters {
    pub rms_left: f32,
    pub rms_right: f32,
    pub peak_left: f32,
    pub peak_right: f32,
    pub activity: ChannelActivity,
}

/// What a voice sees of its channel while rendering.
pub struct ChannelBus<'a> {
    pub timbre: &'a Timbre,
    pub gain: f32,
    pub pan: f32,
    pub pitch: f32,
    pub left: &'a mut [f32],
    pub right: &'a mut [f32],
}

pub struct Channel {
    index: usize,
    timbre: Timbre,

    volume: u8,
    expression: u8,
    pan: f32,
    bend: u16,
    bend_semitones: u8,
    bend_cents: u8,
    hold: bool,
    rpn_msb: u8,
    rpn_lsb: u8,

    // derived from the controllers above
    gain: f32,
    pitch: f32,

    input_l: Vec<f32>,
    input_r: Vec<f32>,
    delay: StereoDelay,
    meter_l: LevelMeter,
    meter_r: LevelMeter,
    activity: ChannelActivity,
}

impl Channel {
    pub fn new(index: usize, sample_rate: u32, block_len: usize, timbre: Timbre) -> Self {
        let mut channel = Self {
            index,
            timbre,
            volume: 100,
            expression: 127,
            pan: 0.0,
            bend: BEND_CENTER,
            bend_semitones: DEFAULT_BEND_RANGE,
            bend_cents: 0,
            hold: false,
            rpn_msb: RPN_NULL,
            rpn_lsb: RPN_NULL,
            gain: 0.0,
            pitch: 1.0,
            input_l: vec![0.0; block_len],
            input_r: vec![0.0; block_len],
            delay: StereoDelay::new(sample_rate),
            meter_l: LevelMeter::new(sample_rate),
            meter_r: LevelMeter::new(sample_rate),
            activity: ChannelActivity::Free,
        };
        channel.update_gain();
        channel.update_pitch();
        channel
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn timbre(&self) -> &Timbre {
        &self.timbre
    }

    pub fn activity(&self) -> ChannelActivity {
        self.activity
    }

    pub fn hold(&self) -> bool {
        self.hold
    }

    /// `(volume / 127)² · (expression / 127)²`
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Pitch multiplier from the current bend.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Bend range in semitones, including the cents from data entry LSB.
    pub fn bend_range(&self) -> f32 {
        self.bend_semitones as f32 + self.bend_cents as f32 / 100.0
    }

    pub fn meters(&self) -> ChannelMeters {
        ChannelMeters {
            rms_left: self.meter_l.rms(),
            rms_right: self.meter_r.rms(),
            peak_left: self.meter_l.peak(),
            peak_right: self.meter_r.peak(),
            activity: self.activity,
        }
    }

    fn update_gain(&mut self) {
        let volume = self.volume as f32 / 127.0;
        let expression = self.expression as f32 / 127.0;
        self.gain = volume * volume * expression * expression;
    }

    fn update_pitch(&mut self) {
        let offset = (self.bend as f32 - BEND_CENTER as f32) / BEND_CENTER as f32;
        let semitones = offset * self.bend_range();
        self.pitch = 2.0_f32.powf(semitones / 12.0);
    }

    fn bend_range_selected(&self) -> bool {
        self.rpn_msb == 0 && self.rpn_lsb == 0
    }

    pub fn control_change(&mut self, controller: u8, value: u8) -> ChannelAction {
        let value = value & 0x7F;
        match controller {
            6 => {
                if self.bend_range_selected() {
                    self.bend_semitones = value;
                    self.update_pitch();
                }
            }
            7 => {
                self.volume = value;
                self.update_gain();
            }
            10 => {
                self.pan = ((value as f32 - 64.0) / 64.0).clamp(-1.0, 1.0);
            }
            11 => {
                self.expression = value;
                self.update_gain();
            }
            38 => {
                if self.bend_range_selected() {
                    self.bend_cents = value.min(99);
                    self.update_pitch();
                }
            }
            64 => {
                let was_held = self.hold;
                self.hold = value >= 64;
                if was_held && !self.hold {
                    return ChannelAction::HoldOff;
                }
            }
            94 => {
                self.timbre.delay.send = value as f32 / 127.0;
            }
            98 | 99 => {
                self.rpn_msb = RPN_NULL;
                self.rpn_lsb = RPN_NULL;
            }
            100 => self.rpn_lsb = value,
            101 => self.rpn_msb = value,
            120 | 123 => return ChannelAction::PurgeAll,
            121 => {
                let was_held = self.hold;
                self.expression = 127;
                self.bend = BEND_CENTER;
                self.hold = false;
                self.rpn_msb = RPN_NULL;
                self.rpn_lsb = RPN_NULL;
                self.update_gain();
                self.update_pitch();
                if was_held {
                    return ChannelAction::HoldOff;
                }
            }
            _ => {}
        }
        ChannelAction::None
    }

    pub fn pitch_bend(&mut self, value: u16) {
        self.bend = value.min(0x3FFF);
        self.update_pitch();
    }

    /// Replace the whole timbre with the preset's.
    pub fn program_change(&mut self, preset: &Preset) {
        debug!("channel {} program -> {}", self.index, preset.name);
        self.timbre = preset.timbre.clone();
    }

    /// Note-On wakes a free channel.
    pub fn arm(&mut self) {
        if self.activity == ChannelActivity::Free {
            self.activity = ChannelActivity::Standby;
        }
    }

    pub fn bus(&mut self) -> ChannelBus<'_> {
        ChannelBus {
            timbre: &self.timbre,
            gain: self.gain,
            pan: self.pan,
            pitch: self.pitch,
            left: &mut self.input_l,
            right: &mut self.input_r,
        }
    }

    /// Run this block's accumulated input through the delay and meters and
    /// add it to the master buffers. The input is cleared afterwards.
    pub fn mix_into(&mut self, master_l: &mut [f32], master_r: &mut [f32]) {
        if self.activity == ChannelActivity::Free {
            self.input_l.fill(0.0);
            self.input_r.fill(0.0);
            return;
        }

        let len = master_l.len().min(master_r.len()).min(self.input_l.len());
        for i in 0..len {
            let in_l = std::mem::take(&mut self.input_l[i]);
            let in_r = std::mem::take(&mut self.input_r[i]);
            let (l, r) = self.delay.next_sample(in_l, in_r, &self.timbre.delay);

            self.meter_l.push(l);
            self.meter_r.push(r);
            let (rms_l, rms_r) = (self.meter_l.rms(), self.meter_r.rms());

            match self.activity {
                ChannelActivity::Standby
                    if rms_l >= ACTIVE_THRESHOLD || rms_r >= ACTIVE_THRESHOLD =>
                {
                    self.activity = ChannelActivity::Active;
                }
                ChannelActivity::Active if rms_l < FREE_THRESHOLD && rms_r < FREE_THRESHOLD => {
                    self.activity = ChannelActivity::Free;
                    self.input_l.fill(0.0);
                    self.input_r.fill(0.0);
                    return;
                }
                _ => {}
            }

            master_l[i] += l;
            master_r[i] += r;
        }
    }
}
