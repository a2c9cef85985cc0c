// src/fx_components/distortion.rs

//! Soft-clip distortion with a one-pole tone stage.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DistortionSettings {
    pub enabled: bool,
    /// Drive amount, 0.0 to 10.0.
    pub drive: f32,
    /// Tone lowpass coefficient, 0.0 (open) to 1.0 (dark).
    pub tone: f32,
    /// Output level, 0.0 to 1.0.
    pub level: f32,
}

impl Default for DistortionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            drive: 2.0,
            tone: 0.5,
            level: 0.8,
        }
    }
}

impl DistortionSettings {
    pub fn clamped(self) -> Self {
        Self {
            enabled: self.enabled,
            drive: self.drive.clamp(0.0, 10.0),
            tone: self.tone.clamp(0.0, 1.0),
            level: self.level.clamp(0.0, 1.0),
        }
    }
}

/// `tanh(x * drive) / tanh(drive)` soft clipping followed by a persistent
/// one-pole lowpass. The normalization keeps unity gain as drive approaches
/// zero, where the curve degenerates to a straight line.
#[derive(Debug, Default)]
pub struct Distortion {
    pub settings: DistortionSettings,
    filter_state: f32,
}

impl Distortion {
    pub fn new(settings: DistortionSettings) -> Self {
        Self {
            settings,
            filter_state: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if !self.settings.enabled {
            return input;
        }

        let DistortionSettings {
            drive, tone, level, ..
        } = self.settings;

        // tanh(x*d)/tanh(d) -> x as d -> 0.
        let distorted = if drive > 1e-4 {
            (input * drive).tanh() / drive.tanh()
        } else {
            input
        };

        self.filter_state = self.filter_state * tone + distorted * (1.0 - tone);
        self.filter_state * level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_transparent() {
        let mut fx = Distortion::new(DistortionSettings::default());
        assert_eq!(fx.process(0.35), 0.35);
    }

    #[test]
    fn near_zero_drive_stays_near_unity() {
        let mut fx = Distortion::new(DistortionSettings {
            enabled: true,
            drive: 0.0,
            tone: 0.0,
            level: 1.0,
        });
        assert!((fx.process(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn output_is_bounded_by_level() {
        let mut fx = Distortion::new(DistortionSettings {
            enabled: true,
            drive: 10.0,
            tone: 0.0,
            level: 0.8,
        });
        for i in 0..1024 {
            let x = (i as f32 - 512.0) / 10.0;
            let y = fx.process(x);
            // tanh(x*d)/tanh(d) is bounded by 1/tanh(10) ~ 1.0.
            assert!(y.abs() <= 0.8 * 1.001);
        }
    }

    #[test]
    fn tone_stage_smooths_transients() {
        let mut fx = Distortion::new(DistortionSettings {
            enabled: true,
            drive: 1.0,
            tone: 0.9,
            level: 1.0,
        });
        // A unit step reaches the target gradually through the one-pole.
        let first = fx.process(1.0);
        let second = fx.process(1.0);
        assert!(first < second);
        assert!(second < 1.0);
    }
}
