// src/synth.rs

//! Shared per-voice DSP building blocks: equal-temperament tuning, the ADSR
//! envelope state machine, and the multi-layer oscillator.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Texture layers summed on top of each oscillator's fundamental.
pub const TEXTURE_LAYERS: usize = 8;

/// Equal-temperament tuning: MIDI note 69 maps to 440 Hz exactly.
#[inline]
pub fn note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

// --- ADSR Envelope ---

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AdsrSettings {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for AdsrSettings {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.2,
        }
    }
}

impl AdsrSettings {
    /// Boundary validation: times are non-negative seconds, sustain is a level.
    pub fn clamped(self) -> Self {
        Self {
            attack: self.attack.max(0.0),
            decay: self.decay.max(0.0),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(0.0),
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum AdsrState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear-segment ADSR. Zero-duration segments transition instantaneously
/// instead of producing a non-finite rate. The release rate is captured at
/// `note_off` so the ramp stays linear and finishes on schedule.
#[derive(Clone, Copy, Debug)]
pub struct Adsr {
    pub settings: AdsrSettings,
    pub state: AdsrState,
    pub current_level: f32,
    sample_rate: f32,
    release_rate: f32,
}

impl Adsr {
    pub fn new(settings: AdsrSettings, sample_rate: f32) -> Self {
        Self {
            settings,
            state: AdsrState::Idle,
            current_level: 0.0,
            sample_rate,
            release_rate: 0.0,
        }
    }

    pub fn set_settings(&mut self, settings: AdsrSettings) {
        self.settings = settings;
    }

    /// Retriggers the attack stage from any state.
    pub fn note_on(&mut self) {
        self.state = AdsrState::Attack;
    }

    /// Enters the release stage; a no-op while already Idle. The ramp rate
    /// is fixed here from the level at gate close, so the release lasts the
    /// configured time regardless of where the envelope was.
    pub fn note_off(&mut self) {
        if self.state != AdsrState::Idle {
            self.state = AdsrState::Release;
            self.release_rate = if self.settings.release > 0.0 {
                self.current_level / (self.settings.release * self.sample_rate)
            } else {
                0.0
            };
        }
    }

    pub fn reset(&mut self) {
        self.state = AdsrState::Idle;
        self.current_level = 0.0;
    }

    /// Advances one sample and returns the current level in [0, 1].
    pub fn process(&mut self) -> f32 {
        match self.state {
            AdsrState::Idle => 0.0,
            AdsrState::Attack => {
                if self.settings.attack > 0.0 {
                    let attack_rate = 1.0 / (self.settings.attack * self.sample_rate);
                    self.current_level += attack_rate;
                } else {
                    self.current_level = 1.0;
                }

                if self.current_level >= 1.0 {
                    self.current_level = 1.0;
                    self.state = AdsrState::Decay;
                }
                self.current_level
            }
            AdsrState::Decay => {
                if self.settings.decay > 0.0 {
                    let decay_rate =
                        (1.0 - self.settings.sustain) / (self.settings.decay * self.sample_rate);
                    self.current_level -= decay_rate;
                } else {
                    self.current_level = self.settings.sustain;
                }

                if self.current_level <= self.settings.sustain {
                    self.current_level = self.settings.sustain;
                    self.state = AdsrState::Sustain;
                }
                self.current_level
            }
            AdsrState::Sustain => {
                self.current_level = self.settings.sustain;
                self.current_level
            }
            AdsrState::Release => {
                if self.settings.release > 0.0 {
                    self.current_level -= self.release_rate;
                } else {
                    self.current_level = 0.0;
                }

                if self.current_level <= 0.0 {
                    self.current_level = 0.0;
                    self.state = AdsrState::Idle;
                }
                self.current_level
            }
        }
    }
}

// --- Oscillator ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Saw,
    Triangle,
    WarmSine,
    Additive,
    Fm,
}

impl Waveform {
    pub const ALL: [Waveform; 7] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
        Waveform::WarmSine,
        Waveform::Additive,
        Waveform::Fm,
    ];
}

impl std::fmt::Display for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Waveform::Sine => write!(f, "Sine"),
            Waveform::Square => write!(f, "Square"),
            Waveform::Saw => write!(f, "Saw"),
            Waveform::Triangle => write!(f, "Triangle"),
            Waveform::WarmSine => write!(f, "Warm Sine"),
            Waveform::Additive => write!(f, "Additive"),
            Waveform::Fm => write!(f, "FM"),
        }
    }
}

/// Evaluates one cycle of `waveform` at `phase` in [0, 2π).
#[inline]
pub fn generate_wave(phase: f32, waveform: Waveform) -> f32 {
    match waveform {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if phase < PI {
                -1.0
            } else {
                1.0
            }
        }
        Waveform::Saw => (2.0 * phase / TAU) - 1.0,
        Waveform::Triangle => ((2.0 * phase / TAU) - 1.0).abs() * 2.0 - 1.0,
        Waveform::WarmSine => (3.0 * phase.sin()).tanh(),
        Waveform::Additive => {
            let mut sum = 0.0;
            for i in 1..=8 {
                sum += (phase * i as f32).sin() / i as f32;
            }
            sum * 0.3
        }
        Waveform::Fm => {
            let modulator = (phase * 2.1).sin() * 0.5;
            (phase + modulator).sin()
        }
    }
}

/// One detuned secondary oscillator summed with the fundamental.
#[derive(Clone, Copy, Debug)]
struct TextureLayer {
    phase: f32,
    /// Frequency ratio relative to the fundamental.
    ratio: f32,
    amplitude: f32,
    waveform: Waveform,
}

/// Phase-accumulator oscillator with a fixed bank of texture layers.
///
/// Layer phases are randomized once at construction for thickness and the
/// bank is never resized. The summed output is deliberately not
/// renormalized: total energy scales with the layer count.
pub struct Oscillator {
    sample_rate: f32,
    phase: f32,
    frequency: f32,
    pub waveform: Waveform,
    layers: [TextureLayer; TEXTURE_LAYERS],
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            frequency: 440.0,
            waveform: Waveform::Sine,
            layers: std::array::from_fn(|_| TextureLayer {
                phase: rand::random::<f32>() * TAU,
                ratio: 1.0,
                amplitude: 0.1,
                waveform: Waveform::Sine,
            }),
        }
    }

    pub fn set_frequency(&mut self, freq: f32) {
        self.frequency = freq;
    }

    /// Advances all phase accumulators one sample and returns
    /// `0.7 * fundamental + sum(layer amplitude * layer output)`.
    pub fn process(&mut self) -> f32 {
        let phase_inc = TAU * self.frequency / self.sample_rate;
        self.phase += phase_inc;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        let mut output = generate_wave(self.phase, self.waveform) * 0.7;

        for layer in self.layers.iter_mut() {
            layer.phase += TAU * self.frequency * layer.ratio / self.sample_rate;
            if layer.phase >= TAU {
                layer.phase -= TAU;
            }
            output += generate_wave(layer.phase, layer.waveform) * layer.amplitude;
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    #[test]
    fn concert_a_is_exact() {
        assert_eq!(note_to_freq(69), 440.0);
    }

    #[test]
    fn middle_c_is_within_a_cent() {
        assert!((note_to_freq(60) - 261.63).abs() < 1e-2);
    }

    #[test]
    fn attack_reaches_full_level_on_time() {
        let mut env = Adsr::new(
            AdsrSettings {
                attack: 0.01,
                decay: 0.1,
                sustain: 0.5,
                release: 0.2,
            },
            SR,
        );
        env.note_on();
        let attack_samples = (0.01 * SR) as usize;
        let mut reached_at = None;
        for i in 0..attack_samples + 2 {
            if env.process() >= 1.0 {
                reached_at = Some(i);
                break;
            }
        }
        let reached_at = reached_at.expect("attack never completed");
        assert!(reached_at.abs_diff(attack_samples - 1) <= 1);
        assert_eq!(env.state, AdsrState::Decay);
    }

    #[test]
    fn zero_attack_is_instantaneous() {
        let mut env = Adsr::new(
            AdsrSettings {
                attack: 0.0,
                decay: 0.0,
                sustain: 0.6,
                release: 0.0,
            },
            SR,
        );
        env.note_on();
        let level = env.process();
        assert_eq!(level, 1.0);
        assert!(level.is_finite());
        // Zero decay collapses to the sustain level on the next sample.
        assert_eq!(env.process(), 0.6);
        assert_eq!(env.state, AdsrState::Sustain);
    }

    #[test]
    fn release_drains_to_idle() {
        let mut env = Adsr::new(
            AdsrSettings {
                attack: 0.0,
                decay: 0.0,
                sustain: 0.8,
                release: 0.05,
            },
            SR,
        );
        env.note_on();
        env.process();
        env.process();
        assert_eq!(env.state, AdsrState::Sustain);

        env.note_off();
        let release_samples = (0.05 * SR) as usize;
        for _ in 0..release_samples + 2 {
            env.process();
        }
        assert_eq!(env.state, AdsrState::Idle);
        assert_eq!(env.current_level, 0.0);
    }

    #[test]
    fn note_off_while_idle_is_a_no_op() {
        let mut env = Adsr::new(AdsrSettings::default(), SR);
        env.note_off();
        assert_eq!(env.state, AdsrState::Idle);
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn stages_are_strictly_ordered() {
        // Attack must pass through Decay even when sustain is 1.0.
        let mut env = Adsr::new(
            AdsrSettings {
                attack: 0.0,
                decay: 0.1,
                sustain: 1.0,
                release: 0.1,
            },
            SR,
        );
        env.note_on();
        env.process();
        assert_eq!(env.state, AdsrState::Decay);
    }

    #[test]
    fn envelope_level_stays_bounded() {
        let mut env = Adsr::new(AdsrSettings::default(), SR);
        env.note_on();
        for _ in 0..10_000 {
            let level = env.process();
            assert!((0.0..=1.0).contains(&level));
        }
        env.note_off();
        for _ in 0..20_000 {
            let level = env.process();
            assert!((0.0..=1.0).contains(&level));
        }
    }

    #[test]
    fn oscillator_phase_stays_wrapped() {
        let mut osc = Oscillator::new(SR);
        osc.set_frequency(1000.0);
        for _ in 0..5000 {
            osc.process();
            assert!(osc.phase >= 0.0 && osc.phase < TAU);
        }
    }

    #[test]
    fn oscillator_output_scales_with_layer_count() {
        // 0.7 fundamental plus eight 0.1 layers: worst case 1.5 peak.
        let mut osc = Oscillator::new(SR);
        osc.set_frequency(440.0);
        for _ in 0..5000 {
            let s = osc.process();
            assert!(s.abs() <= 0.7 + TEXTURE_LAYERS as f32 * 0.1 + 1e-4);
        }
    }

    #[test]
    fn waveforms_stay_in_range() {
        for waveform in Waveform::ALL {
            for i in 0..256 {
                let phase = i as f32 / 256.0 * TAU;
                let s = generate_wave(phase, waveform);
                assert!(s.abs() <= 1.0 + 1e-4, "{waveform} out of range: {s}");
            }
        }
    }
}
