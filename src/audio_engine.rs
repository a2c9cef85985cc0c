// src/audio_engine.rs

//! Real-time wrapper around [`SynthEngine`]: control-thread calls are
//! validated, turned into [`AudioCommand`]s and pushed onto a lock-free SPSC
//! queue that the audio thread drains once at the top of every block. The
//! render path never locks and never sees a half-applied parameter update.

use crate::engine::SynthEngine;
use crate::fx_components::{ChorusSettings, DelaySettings, DistortionSettings, ReverbSettings};
use crate::synth::{AdsrSettings, Waveform};
use anyhow::Result;
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Capacity of the control-to-audio command queue.
const COMMAND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum AudioCommand {
    NoteOn {
        note: u8,
        velocity: u8,
        sample_key: Option<String>,
    },
    NoteOff {
        note: u8,
    },
    LoadSample {
        name: String,
        audio_data: Vec<f32>,
    },
    SetMasterVolume(f32),
    SetAdsr(AdsrSettings),
    SetWaveform(Waveform),
    SetDistortion(DistortionSettings),
    SetReverb(ReverbSettings),
    SetDelay(DelaySettings),
    SetChorus(ChorusSettings),
}

/// Builds the paired control handle and audio-thread engine.
pub fn engine_pair(sample_rate: f32) -> (EngineController, AudioEngine) {
    let (producer, consumer) = HeapRb::<AudioCommand>::new(COMMAND_QUEUE_CAPACITY).split();
    (
        EngineController {
            command_producer: producer,
        },
        AudioEngine {
            command_consumer: consumer,
            synth: SynthEngine::new(sample_rate),
        },
    )
}

/// The audio-thread side: owns the synth and the consumer end of the queue.
pub struct AudioEngine {
    command_consumer: HeapConsumer<AudioCommand>,
    pub synth: SynthEngine,
}

impl AudioEngine {
    /// Drains every pending command. Called once per callback, before
    /// rendering, so parameter updates land on block boundaries.
    pub fn handle_commands(&mut self) {
        while let Some(command) = self.command_consumer.pop() {
            match command {
                AudioCommand::NoteOn {
                    note,
                    velocity,
                    sample_key,
                } => self.synth.note_on(note, velocity, sample_key.as_deref()),
                AudioCommand::NoteOff { note } => self.synth.note_off(note),
                AudioCommand::LoadSample { name, audio_data } => {
                    self.synth.load_sample(&name, audio_data);
                }
                AudioCommand::SetMasterVolume(volume) => self.synth.set_master_volume(volume),
                AudioCommand::SetAdsr(settings) => self.synth.set_adsr(settings),
                AudioCommand::SetWaveform(waveform) => self.synth.set_waveform(waveform),
                AudioCommand::SetDistortion(settings) => self.synth.set_distortion(settings),
                AudioCommand::SetReverb(settings) => self.synth.set_reverb(settings),
                AudioCommand::SetDelay(settings) => self.synth.set_delay(settings),
                AudioCommand::SetChorus(settings) => self.synth.set_chorus(settings),
            }
        }
    }

    /// One driver callback: drain commands, then render the block in place.
    pub fn process_buffer(&mut self, output_buffer: &mut [f32]) {
        self.handle_commands();
        self.synth.process(output_buffer);
    }
}

/// The control-thread handle. All inputs are clamped or validated here,
/// before they cross into the render context.
pub struct EngineController {
    command_producer: HeapProducer<AudioCommand>,
}

impl EngineController {
    pub fn note_on(&mut self, note: u8, velocity: u8, sample_key: Option<&str>) {
        self.send(AudioCommand::NoteOn {
            note: note.min(127),
            velocity: velocity.min(127),
            sample_key: sample_key.map(str::to_string),
        });
    }

    pub fn note_off(&mut self, note: u8) {
        self.send(AudioCommand::NoteOff { note: note.min(127) });
    }

    /// Validates and enqueues a sample buffer. Malformed data (non-finite
    /// samples) is the one boundary fault reported to the caller.
    pub fn load_sample(&mut self, name: &str, channel_data: Vec<f32>) -> Result<()> {
        if let Some(pos) = channel_data.iter().position(|s| !s.is_finite()) {
            anyhow::bail!("sample {name:?} has a non-finite value at index {pos}");
        }
        self.send(AudioCommand::LoadSample {
            name: name.to_string(),
            audio_data: channel_data,
        });
        Ok(())
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.send(AudioCommand::SetMasterVolume(volume.clamp(0.0, 1.0)));
    }

    pub fn set_adsr(&mut self, settings: AdsrSettings) {
        self.send(AudioCommand::SetAdsr(settings.clamped()));
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.send(AudioCommand::SetWaveform(waveform));
    }

    pub fn set_distortion(&mut self, settings: DistortionSettings) {
        self.send(AudioCommand::SetDistortion(settings.clamped()));
    }

    pub fn set_reverb(&mut self, settings: ReverbSettings) {
        self.send(AudioCommand::SetReverb(settings.clamped()));
    }

    pub fn set_delay(&mut self, settings: DelaySettings) {
        self.send(AudioCommand::SetDelay(settings.clamped()));
    }

    pub fn set_chorus(&mut self, settings: ChorusSettings) {
        self.send(AudioCommand::SetChorus(settings.clamped()));
    }

    fn send(&mut self, command: AudioCommand) {
        if self.command_producer.push(command).is_err() {
            log::warn!("command queue full, dropping control message");
        }
    }
}
