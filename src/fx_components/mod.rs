// src/fx_components/mod.rs

//! Master-bus effect components and the fixed-order chain that owns them.

pub mod chorus;
pub mod delay;
pub mod distortion;
pub mod reverb;

pub use chorus::{Chorus, ChorusSettings};
pub use delay::{Delay, DelayLine, DelaySettings, MAX_DELAY_SECONDS};
pub use distortion::{Distortion, DistortionSettings};
pub use reverb::{Reverb, ReverbSettings};

/// The engine's master effects chain, applied to the mono voice sum in the
/// fixed order Distortion -> Reverb -> Delay -> Chorus. The delay line is
/// owned here because the chorus taps the same buffer the delay writes.
pub struct FxChain {
    pub distortion: Distortion,
    pub reverb: Reverb,
    pub delay: Delay,
    pub chorus: Chorus,
    delay_line: DelayLine,
}

impl FxChain {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            distortion: Distortion::new(DistortionSettings::default()),
            reverb: Reverb::new(sample_rate, ReverbSettings::default()),
            delay: Delay::new(DelaySettings::default()),
            chorus: Chorus::new(ChorusSettings::default()),
            delay_line: DelayLine::new(MAX_DELAY_SECONDS, sample_rate),
        }
    }

    /// Threads one sample through every enabled effect in chain order.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut sample = input;
        sample = self.distortion.process(sample);
        sample = self.reverb.process(sample);
        sample = self.delay.process(sample, &mut self.delay_line);
        sample = self.chorus.process(sample, &self.delay_line);
        sample
    }
}
