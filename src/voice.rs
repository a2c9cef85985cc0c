// src/voice.rs

//! One monophonic sound-generating unit from the polyphonic pool. Each voice
//! owns an oscillator, an amplitude envelope and a filter, and optionally
//! holds a shared reference to a sample buffer captured at trigger time.

use crate::filters::Filter;
use crate::interp;
use crate::synth::{Adsr, AdsrSettings, AdsrState, Oscillator};
use std::sync::Arc;

pub struct Voice {
    pub note: u8,
    /// Normalized velocity, 0.0 to 1.0.
    pub velocity: f32,
    pub active: bool,
    pub oscillator: Oscillator,
    pub envelope: Adsr,
    /// Constructed per voice but not yet wired into the per-sample path;
    /// kept as the insertion point for a future always-on filter stage.
    pub filter: Filter,
    sample_data: Option<Arc<Vec<f32>>>,
    /// Fractional playback cursor into `sample_data`.
    sample_position: f32,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            note: 0,
            velocity: 0.0,
            active: false,
            oscillator: Oscillator::new(sample_rate),
            envelope: Adsr::new(AdsrSettings::default(), sample_rate),
            filter: Filter::new(sample_rate),
            sample_data: None,
            sample_position: 0.0,
        }
    }

    /// Triggers the voice. When `sample_data` is supplied the voice resamples
    /// it from position zero; otherwise it synthesizes at the note's
    /// equal-temperament frequency.
    pub fn note_on(&mut self, note: u8, velocity: u8, sample_data: Option<Arc<Vec<f32>>>) {
        self.note = note;
        self.velocity = velocity as f32 / 127.0;
        self.active = true;
        self.sample_data = sample_data;
        self.sample_position = 0.0;

        self.oscillator.set_frequency(crate::synth::note_to_freq(note));
        self.envelope.note_on();
        self.filter.reset();
    }

    /// Starts the envelope release. The voice stays active until the
    /// envelope drains to zero.
    pub fn note_off(&mut self) {
        self.envelope.note_off();
    }

    /// Renders one sample. Returns exactly 0.0 once the voice has returned
    /// to the free pool.
    pub fn process(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let env_level = self.envelope.process();
        if env_level <= 0.0 && self.envelope.state == AdsrState::Idle {
            self.active = false;
            return 0.0;
        }

        let output = match &self.sample_data {
            Some(sample) if !sample.is_empty() => {
                let pos = self.sample_position;
                let i = pos.floor() as isize;
                let frac = pos - pos.floor();

                // Neighbors outside the buffer read as silence.
                let tap = |idx: isize| -> f32 {
                    if idx < 0 {
                        0.0
                    } else {
                        sample.get(idx as usize).copied().unwrap_or(0.0)
                    }
                };
                let out = interp::hermite(frac, tap(i - 1), tap(i), tap(i + 1), tap(i + 2));

                // Resampling ratio is relative to middle C.
                let pitch_ratio = 2.0_f32.powf((self.note as f32 - 60.0) / 12.0);
                self.sample_position += pitch_ratio;
                if self.sample_position >= sample.len() as f32 {
                    self.sample_position = 0.0; // Loop
                }
                out
            }
            // Empty buffers fall through to synthesis.
            _ => self.oscillator.process(),
        };

        output * env_level * self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::AdsrState;

    const SR: f32 = 44100.0;

    fn gate_open_adsr() -> AdsrSettings {
        AdsrSettings {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
        }
    }

    #[test]
    fn inactive_voice_is_silent() {
        let mut voice = Voice::new(SR);
        assert_eq!(voice.process(), 0.0);
        assert!(!voice.active);
    }

    #[test]
    fn sample_playback_matches_hermite_resampling() {
        let mut voice = Voice::new(SR);
        voice.envelope.set_settings(gate_open_adsr());
        let data = Arc::new(vec![0.0, 1.0, 0.0, -1.0]);
        voice.note_on(60, 127, Some(data.clone()));

        // Pitch ratio is exactly 1 at note 60, so the cursor lands on
        // integer positions and Hermite reduces to the stored samples.
        for expected in [0.0, 1.0, 0.0, -1.0] {
            assert_eq!(voice.process(), expected);
        }
        // Cursor wrapped, playback loops.
        assert_eq!(voice.process(), 0.0);
        assert_eq!(voice.process(), 1.0);
    }

    #[test]
    fn empty_sample_falls_back_to_synthesis() {
        let mut voice = Voice::new(SR);
        voice.envelope.set_settings(gate_open_adsr());
        voice.note_on(69, 127, Some(Arc::new(Vec::new())));
        let mut any_nonzero = false;
        for _ in 0..200 {
            let s = voice.process();
            assert!(s.is_finite());
            any_nonzero |= s != 0.0;
        }
        assert!(any_nonzero);
    }

    #[test]
    fn velocity_scales_output_linearly() {
        let data = Arc::new(vec![1.0; 8]);

        let mut full = Voice::new(SR);
        full.envelope.set_settings(gate_open_adsr());
        full.note_on(60, 127, Some(data.clone()));

        let mut half = Voice::new(SR);
        half.envelope.set_settings(gate_open_adsr());
        half.note_on(60, 64, Some(data));

        let a = full.process();
        let b = half.process();
        assert!((b / a - 64.0 / 127.0).abs() < 1e-6);
    }

    #[test]
    fn voice_frees_itself_when_release_completes() {
        let mut voice = Voice::new(SR);
        voice.envelope.set_settings(AdsrSettings {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.001,
        });
        voice.note_on(64, 100, None);
        voice.process();
        voice.note_off();

        let mut samples = 0;
        while voice.active {
            voice.process();
            samples += 1;
            assert!(samples < 1000, "voice never deactivated");
        }
        assert_eq!(voice.envelope.state, AdsrState::Idle);
        assert_eq!(voice.envelope.current_level, 0.0);
        assert_eq!(voice.process(), 0.0);
    }

    #[test]
    fn retrigger_restarts_sample_cursor() {
        let mut voice = Voice::new(SR);
        voice.envelope.set_settings(gate_open_adsr());
        let data = Arc::new(vec![0.5, -0.5, 0.25, -0.25]);
        voice.note_on(60, 127, Some(data.clone()));
        voice.process();
        voice.process();
        voice.note_on(60, 127, Some(data));
        assert_eq!(voice.process(), 0.5);
    }
}
