use anyhow::Result;
use polysynth::audio_engine::engine_pair;
use polysynth::audio_io;
use polysynth::engine::SAMPLE_RATE;
use polysynth::fx_components::ReverbSettings;
use polysynth::synth::{AdsrSettings, Waveform};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let (mut controller, engine) = engine_pair(SAMPLE_RATE);
    // Keep the stream alive for the duration of the demo.
    let (_stream, device_rate) = audio_io::init_and_run_output(engine)?;
    if device_rate as f32 != SAMPLE_RATE {
        log::warn!("device runs at {device_rate} Hz, engine renders at {SAMPLE_RATE} Hz");
    }

    // Optional: play a WAV file instead of the oscillator.
    let sample_key = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let data = audio_io::read_wav_mono(&path)?;
            controller.load_sample("demo", data)?;
            Some("demo")
        }
        None => None,
    };

    controller.set_waveform(Waveform::WarmSine);
    controller.set_adsr(AdsrSettings {
        attack: 0.01,
        decay: 0.15,
        sustain: 0.6,
        release: 0.4,
    });
    controller.set_reverb(ReverbSettings {
        enabled: true,
        room_size: 0.6,
        damping: 0.4,
        wet_level: 0.25,
    });

    // A short arpeggio up a C minor triad.
    for note in [48, 51, 55, 60, 55, 51] {
        controller.note_on(note, 100, sample_key);
        thread::sleep(Duration::from_millis(250));
        controller.note_off(note);
    }

    // Let the last release and the reverb tail ring out.
    thread::sleep(Duration::from_millis(1500));
    Ok(())
}
