//! A polyphonic software-synthesizer render engine: a 64-voice pool mixing
//! sample playback (Hermite-resampled) and multi-layer oscillator synthesis
//! through a master effects chain and a soft limiter, driven by a lock-free
//! command queue from the control thread.

pub mod audio_engine;
pub mod audio_io;
pub mod engine;
pub mod filters;
pub mod fx_components;
pub mod interp;
pub mod synth;
pub mod voice;

pub use audio_engine::{engine_pair, AudioCommand, AudioEngine, EngineController};
pub use engine::{SynthEngine, BLOCK_SIZE, MAX_VOICES, SAMPLE_RATE};
pub use synth::{AdsrSettings, Waveform, TEXTURE_LAYERS};
