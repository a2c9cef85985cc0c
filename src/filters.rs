// src/filters.rs

//! Second-order filter algorithms available to each voice: a state-variable
//! topology with soft-saturated integrators and a Moog-style four-pole
//! ladder. Neither is oversampled; aliasing at high resonance and cutoff is
//! an accepted limitation.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterMode {
    pub const ALL: [FilterMode; 4] = [
        FilterMode::LowPass,
        FilterMode::HighPass,
        FilterMode::BandPass,
        FilterMode::Notch,
    ];
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::LowPass => write!(f, "Low Pass"),
            FilterMode::HighPass => write!(f, "High Pass"),
            FilterMode::BandPass => write!(f, "Band Pass"),
            FilterMode::Notch => write!(f, "Notch"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterModel {
    StateVariable,
    Ladder,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FilterSettings {
    pub model: FilterModel,
    pub mode: FilterMode,
    /// Cutoff frequency in Hz.
    pub cutoff: f32,
    /// Resonance amount, 0.0 to 1.0.
    pub resonance: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            model: FilterModel::StateVariable,
            mode: FilterMode::LowPass,
            cutoff: 2000.0,
            resonance: 0.2,
        }
    }
}

impl FilterSettings {
    /// Boundary validation for control-path updates.
    pub fn clamped(self) -> Self {
        Self {
            cutoff: self.cutoff.clamp(20.0, 20_000.0),
            resonance: self.resonance.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Persistent filter state for one voice. Cold-start state is all zeros.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filter {
    sample_rate: f32,
    // State-variable integrators.
    z1: f32,
    z2: f32,
    // Ladder stage inputs and outputs.
    stage_in: [f32; 4],
    stage_out: [f32; 4],
}

impl Filter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
        self.stage_in = [0.0; 4];
        self.stage_out = [0.0; 4];
    }

    /// Dispatches one sample through the selected algorithm.
    pub fn process(&mut self, input: f32, settings: FilterSettings) -> f32 {
        match settings.model {
            FilterModel::StateVariable => {
                self.svf(input, settings.cutoff, settings.resonance, settings.mode)
            }
            FilterModel::Ladder => self.ladder(input, settings.cutoff, settings.resonance),
        }
    }

    /// Chamberlin state-variable filter. Both integrators pass through a
    /// tanh soft saturator every sample for harmonic coloration.
    pub fn svf(&mut self, input: f32, freq: f32, res: f32, mode: FilterMode) -> f32 {
        let f = 2.0 * (PI * freq / self.sample_rate).sin();
        let q = res;

        self.z1 += f * (input - self.z1 - q * self.z2);
        self.z2 += f * self.z1;

        self.z1 = (self.z1 * 0.7).tanh() * 1.4;
        self.z2 = (self.z2 * 0.7).tanh() * 1.4;

        match mode {
            FilterMode::LowPass => self.z2,
            FilterMode::HighPass => input - self.z1 - self.z2,
            FilterMode::BandPass => self.z1,
            FilterMode::Notch => input - self.z1,
        }
    }

    /// Moog-style ladder: four cascaded one-pole stages with feedback
    /// resonance `k = 4 * res` and an exponential frequency compensation
    /// factor on the feedback tap.
    pub fn ladder(&mut self, input: f32, freq: f32, res: f32) -> f32 {
        let f = freq / (self.sample_rate * 0.5);
        let k = res * 4.0;
        let p = f * (1.8 - 0.8 * f);
        let scale = ((1.0 - p) * 1.386_249).exp();
        let r = res * scale;

        let mut x = input - r * self.stage_out[3];
        for i in 0..4 {
            let y = x * p + self.stage_in[i] * p - k * self.stage_out[i];
            self.stage_in[i] = x;
            self.stage_out[i] = y;
            x = y;
        }
        self.stage_out[3]
    }
}
