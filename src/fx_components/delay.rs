// src/fx_components/delay.rs

//! A feedback delay over a single circular buffer. The buffer is shared
//! with the chorus, which reads it at an LFO-modulated offset.

use serde::{Deserialize, Serialize};

/// Capacity of the shared delay buffer in seconds.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DelaySettings {
    pub enabled: bool,
    /// Delay time in seconds, 0.0 to 2.0.
    pub time: f32,
    /// Feedback amount, 0.0 to 1.0.
    pub feedback: f32,
    /// Dry/wet blend, 0.0 to 1.0.
    pub wet_level: f32,
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            time: 0.25,
            feedback: 0.3,
            wet_level: 0.2,
        }
    }
}

impl DelaySettings {
    pub fn clamped(self) -> Self {
        Self {
            enabled: self.enabled,
            time: self.time.clamp(0.0, MAX_DELAY_SECONDS),
            feedback: self.feedback.clamp(0.0, 1.0),
            wet_level: self.wet_level.clamp(0.0, 1.0),
        }
    }
}

/// Fixed-capacity circular buffer with a single write cursor.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    sample_rate: f32,
}

impl DelayLine {
    pub fn new(max_delay_seconds: f32, sample_rate: f32) -> Self {
        let len = ((max_delay_seconds * sample_rate) as usize).max(1);
        Self {
            buffer: vec![0.0; len],
            write_pos: 0,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Stores one sample and advances the write cursor.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads the sample written `delay_samples` ago.
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let read_pos = (self.write_pos + len - delay_samples.clamp(1, len)) % len;
        self.buffer[read_pos]
    }
}

/// Writes `input + tap * feedback` into the shared line and blends the tap
/// with the dry signal. When disabled it neither writes nor advances the
/// cursor, freezing the buffer for any downstream reader.
#[derive(Debug, Default)]
pub struct Delay {
    pub settings: DelaySettings,
}

impl Delay {
    pub fn new(settings: DelaySettings) -> Self {
        Self { settings }
    }

    #[inline]
    pub fn process(&mut self, input: f32, line: &mut DelayLine) -> f32 {
        if !self.settings.enabled {
            return input;
        }

        let DelaySettings {
            time,
            feedback,
            wet_level,
            ..
        } = self.settings;

        let delay_samples = (time * line.sample_rate()) as usize;
        let delayed = line.read(delay_samples);
        line.write(input + delayed * feedback);

        input * (1.0 - wet_level) + delayed * wet_level
    }
}
