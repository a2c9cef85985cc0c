// src/engine.rs

//! The polyphonic render engine: a fixed voice pool, a name-keyed map of
//! shared sample buffers, the master effects chain and the final
//! mixdown/limiting stage.

use crate::fx_components::{
    ChorusSettings, DelaySettings, DistortionSettings, FxChain, ReverbSettings,
};
use crate::synth::{AdsrSettings, Waveform};
use crate::voice::Voice;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed constants forming the compatibility contract.
pub const SAMPLE_RATE: f32 = 44100.0;
pub const BLOCK_SIZE: usize = 4096;
pub const MAX_VOICES: usize = 64;

pub struct SynthEngine {
    voices: Vec<Voice>,
    samples: HashMap<String, Arc<Vec<f32>>>,
    pub fx: FxChain,
    master_volume: f32,
    sample_rate: f32,
}

impl SynthEngine {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: (0..MAX_VOICES).map(|_| Voice::new(sample_rate)).collect(),
            samples: HashMap::new(),
            fx: FxChain::new(sample_rate),
            master_volume: 0.7,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Triggers the first free voice, resolving `sample_key` against the
    /// sample map. When every voice is busy the note is silently dropped:
    /// no stealing, no queuing.
    pub fn note_on(&mut self, note: u8, velocity: u8, sample_key: Option<&str>) {
        let note = note.min(127);
        let velocity = velocity.min(127);
        let sample_data = sample_key.and_then(|key| self.samples.get(key).cloned());

        match self.voices.iter_mut().find(|v| !v.active) {
            Some(voice) => voice.note_on(note, velocity, sample_data),
            None => log::debug!("voice pool exhausted, dropping note {note}"),
        }
    }

    /// Releases every active voice holding `note`. A note with no active
    /// voice is a no-op.
    pub fn note_off(&mut self, note: u8) {
        let note = note.min(127);
        for voice in self.voices.iter_mut().filter(|v| v.active && v.note == note) {
            voice.note_off();
        }
    }

    /// Stores or overwrites a named immutable sample buffer. Voices already
    /// playing the previous buffer keep the `Arc` they captured at trigger
    /// time; there is no live swap.
    pub fn load_sample(&mut self, name: &str, channel_data: Vec<f32>) {
        log::info!("loaded sample {:?} ({} samples)", name, channel_data.len());
        self.samples.insert(name.to_string(), Arc::new(channel_data));
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Applies the envelope settings to every voice.
    pub fn set_adsr(&mut self, settings: AdsrSettings) {
        let settings = settings.clamped();
        for voice in &mut self.voices {
            voice.envelope.set_settings(settings);
        }
    }

    /// Selects the fundamental waveform for every voice's oscillator.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in &mut self.voices {
            voice.oscillator.waveform = waveform;
        }
    }

    pub fn set_distortion(&mut self, settings: DistortionSettings) {
        self.fx.distortion.settings = settings.clamped();
    }

    pub fn set_reverb(&mut self, settings: ReverbSettings) {
        self.fx.reverb.settings = settings.clamped();
    }

    pub fn set_delay(&mut self, settings: DelaySettings) {
        self.fx.delay.settings = settings.clamped();
    }

    pub fn set_chorus(&mut self, settings: ChorusSettings) {
        self.fx.chorus.settings = settings.clamped();
    }

    /// Renders one block in place. Total: never fails, never allocates.
    pub fn process(&mut self, output_buffer: &mut [f32]) {
        for out in output_buffer.iter_mut() {
            let mut sum = 0.0;
            for voice in self.voices.iter_mut() {
                if voice.active {
                    sum += voice.process();
                }
            }

            sum = self.fx.process(sum);
            sum *= self.master_volume;
            *out = soft_limit(sum);
        }
    }
}

/// Soft limiter bounding the mix to ±1.25 without hard clipping; inputs
/// below the knee pass through near unity (0.8 * 1.25 = 1).
#[inline]
pub fn soft_limit(input: f32) -> f32 {
    (input * 0.8).tanh() * 1.25
}
