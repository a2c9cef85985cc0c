// src/fx_components/reverb.rs

//! A multi-tap reverb built from four parallel feedback delay lines.

use serde::{Deserialize, Serialize};

/// Number of parallel delay lines.
const NUM_TAPS: usize = 4;
/// Length of each line in seconds.
const TAP_SECONDS: f32 = 0.1;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ReverbSettings {
    pub enabled: bool,
    /// Scales every tap's delay offset, 0.0 to 1.0.
    pub room_size: f32,
    /// High-frequency feedback loss, 0.0 to 1.0.
    pub damping: f32,
    /// Wet tap contribution, 0.0 to 1.0.
    pub wet_level: f32,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.3,
        }
    }
}

impl ReverbSettings {
    pub fn clamped(self) -> Self {
        Self {
            enabled: self.enabled,
            room_size: self.room_size.clamp(0.0, 1.0),
            damping: self.damping.clamp(0.0, 1.0),
            wet_level: self.wet_level.clamp(0.0, 1.0),
        }
    }
}

/// Four fixed-length circular buffers with independent write cursors. Each
/// tap reads at an offset of `len * (0.3 + i * 0.2) * room_size`, feeds back
/// through a `(1 - damping) * 0.7` gain and sums into the output at
/// `wet_level`. The wet sum is added on top of the dry signal; the
/// reference wet/dry blend is algebraically the identity and is preserved
/// as such (see DESIGN.md).
pub struct Reverb {
    pub settings: ReverbSettings,
    buffers: [Vec<f32>; NUM_TAPS],
    indices: [usize; NUM_TAPS],
}

impl Reverb {
    pub fn new(sample_rate: f32, settings: ReverbSettings) -> Self {
        let tap_len = ((sample_rate * TAP_SECONDS) as usize).max(1);
        Self {
            settings,
            buffers: std::array::from_fn(|_| vec![0.0; tap_len]),
            indices: [0; NUM_TAPS],
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if !self.settings.enabled {
            return input;
        }

        let ReverbSettings {
            room_size,
            damping,
            wet_level,
            ..
        } = self.settings;

        let mut output = input;
        for (i, buffer) in self.buffers.iter_mut().enumerate() {
            let len = buffer.len();
            let delay_offset =
                ((len as f32 * (0.3 + i as f32 * 0.2) * room_size) as usize).clamp(1, len);
            let index = self.indices[i];

            let read_index = (index + len - delay_offset) % len;
            let delayed = buffer[read_index];
            buffer[index] = input + delayed * (1.0 - damping) * 0.7;

            self.indices[i] = (index + 1) % len;
            output += delayed * wet_level;
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    #[test]
    fn disabled_is_transparent() {
        let mut fx = Reverb::new(SR, ReverbSettings::default());
        assert_eq!(fx.process(0.7), 0.7);
    }

    #[test]
    fn impulse_produces_a_tail() {
        let mut fx = Reverb::new(
            SR,
            ReverbSettings {
                enabled: true,
                room_size: 0.8,
                damping: 0.2,
                wet_level: 0.5,
            },
        );
        let first = fx.process(1.0);
        // Cold buffers: the first sample passes through untouched.
        assert_eq!(first, 1.0);

        let mut tail_energy = 0.0;
        for _ in 0..(SR * 0.3) as usize {
            let y = fx.process(0.0);
            tail_energy += y * y;
        }
        assert!(tail_energy > 0.0);
    }

    #[test]
    fn tail_state_persists_across_calls() {
        let mut fx = Reverb::new(
            SR,
            ReverbSettings {
                enabled: true,
                room_size: 1.0,
                damping: 0.0,
                wet_level: 1.0,
            },
        );
        fx.process(1.0);
        // The earliest echo arrives after the shortest tap offset.
        let shortest = (fx.buffers[0].len() as f32 * 0.3) as usize;
        let mut first_echo = None;
        for n in 1..=shortest + 1 {
            if fx.process(0.0) != 0.0 {
                first_echo = Some(n);
                break;
            }
        }
        assert_eq!(first_echo, Some(shortest));
    }

    #[test]
    fn tail_stays_finite_under_sustained_input() {
        let mut fx = Reverb::new(
            SR,
            ReverbSettings {
                enabled: true,
                room_size: 1.0,
                damping: 0.0,
                wet_level: 1.0,
            },
        );
        // Feedback gain 0.7 < 1 keeps the loop stable even undamped.
        for _ in 0..(SR as usize) {
            assert!(fx.process(0.5).is_finite());
        }
    }
}
