// src/fx_components/chorus.rs

//! A chorus that reads the shared delay buffer at a slowly modulated offset.

use crate::fx_components::delay::DelayLine;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Center read offset in seconds.
const BASE_DELAY_SECONDS: f32 = 0.005;
/// Maximum LFO excursion around the center, in seconds.
const MOD_DEPTH_SECONDS: f32 = 0.002;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ChorusSettings {
    pub enabled: bool,
    /// LFO rate in Hz.
    pub rate: f32,
    /// LFO excursion scale, 0.0 to 1.0.
    pub depth: f32,
    /// Dry/wet blend, 0.0 to 1.0.
    pub wet_level: f32,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 0.5,
            depth: 0.3,
            wet_level: 0.3,
        }
    }
}

impl ChorusSettings {
    pub fn clamped(self) -> Self {
        Self {
            enabled: self.enabled,
            rate: self.rate.clamp(0.0, 20.0),
            depth: self.depth.clamp(0.0, 1.0),
            wet_level: self.wet_level.clamp(0.0, 1.0),
        }
    }
}

/// Sine LFO sweeping a 5 ms ± 2 ms read offset into the delay buffer. The
/// LFO phase only advances while the effect is enabled.
#[derive(Debug, Default)]
pub struct Chorus {
    pub settings: ChorusSettings,
    phase: f32,
}

impl Chorus {
    pub fn new(settings: ChorusSettings) -> Self {
        Self {
            settings,
            phase: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32, line: &DelayLine) -> f32 {
        if !self.settings.enabled {
            return input;
        }

        let ChorusSettings {
            rate,
            depth,
            wet_level,
            ..
        } = self.settings;

        self.phase += TAU * rate / line.sample_rate();
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        let lfo = self.phase.sin() * depth;
        let delay_samples =
            ((BASE_DELAY_SECONDS + lfo * MOD_DEPTH_SECONDS) * line.sample_rate()) as usize;
        let chorused = line.read(delay_samples);

        input * (1.0 - wet_level) + chorused * wet_level
    }
}
