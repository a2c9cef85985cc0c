// src/audio_io.rs

//! Output-stream plumbing: hands the [`AudioEngine`] to the device callback
//! and adapts the engine's mono render to the device's channel layout and
//! sample format. Also hosts the WAV import helper used at the control
//! boundary.

use crate::audio_engine::AudioEngine;
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, Stream, StreamConfig};
use std::path::Path;

/// Opens the default output device and starts a playing stream driven by
/// `engine`. Returns the stream (keep it alive) and the device sample rate.
pub fn init_and_run_output(engine: AudioEngine) -> Result<(Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No default output device"))?;
    log::info!("using output device: {}", device.name()?);

    let default_config = device.default_output_config()?;
    let sample_format = default_config.sample_format();
    let config: StreamConfig = default_config.into();
    let sample_rate = config.sample_rate.0;

    let stream = match sample_format {
        SampleFormat::F32 => build_output_stream::<f32>(&device, &config, engine)?,
        SampleFormat::I16 => build_output_stream::<i16>(&device, &config, engine)?,
        SampleFormat::U16 => build_output_stream::<u16>(&device, &config, engine)?,
        format => return Err(anyhow::anyhow!("Unsupported sample format {}", format)),
    };
    stream.play()?;
    log::info!("output stream running at {} Hz", sample_rate);

    Ok((stream, sample_rate))
}

fn build_output_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut engine: AudioEngine,
) -> Result<Stream>
where
    T: Sample + cpal::SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err| log::error!("output stream error: {err}");
    let mut mono_buffer: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            mono_buffer.resize(frames, 0.0);
            engine.process_buffer(&mut mono_buffer);

            for (frame, &sample) in data.chunks_mut(channels).zip(mono_buffer.iter()) {
                for out in frame.iter_mut() {
                    *out = T::from_sample(sample);
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Reads a WAV file and folds it down to a mono `f32` buffer suitable for
/// `load_sample`. Integer formats are scaled to [-1, 1]; multi-channel files
/// are averaged.
pub fn read_wav_mono(path: &Path) -> Result<Vec<f32>> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok(mono)
}
