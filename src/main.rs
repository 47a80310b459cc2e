//! Sonoform headless driver
//!
//! Feeds a WAV file (or a synthetic test signal) through the spectrum
//! analyser and the frame engine at a fixed tick rate, logging progress and
//! optionally writing PNG frames.

use std::time::Instant;

use clap::Parser;

use sonoform::audio::{load_wav_mono, synthetic_test_signal, PcmClip, SpectrumAnalyser};
use sonoform::cli::Args;
use sonoform::frame::FrameEngine;
use sonoform::model::{ActiveModel, MotionModel};
use sonoform::params::SimulationConfig;
use sonoform::snapshot::{prepare_output, save_frame, Stroke};

const SYNTHETIC_SECONDS: f32 = 12.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.simulation_config();
    let recording = args.recording_config();

    let clip = match &args.input {
        Some(path) => {
            let clip = load_wav_mono(path)?;
            log::info!(
                "Loaded {} ({:.1}s at {} Hz)",
                path.display(),
                clip.duration_s(),
                clip.sample_rate
            );
            clip
        }
        None => {
            log::info!("No input given, using synthetic test signal");
            synthetic_test_signal(config.audio.sample_rate_hz as u32, SYNTHETIC_SECONDS)
        }
    };

    let audio_config = config.audio.for_sample_rate(clip.sample_rate as usize);
    let mut analyser = SpectrumAnalyser::new(&audio_config);
    let mut engine = FrameEngine::new(SimulationConfig {
        audio: audio_config,
        ..config
    });

    if let Some(recording) = &recording {
        prepare_output(recording)?;
        log::info!("Recording frames to {}", recording.frames_dir().display());
    }

    let dt = args.dt();
    let duration = args.seconds.unwrap_or_else(|| clip.duration_s()).max(0.0);
    let total_ticks = (duration / dt).round() as usize;
    let ticks_per_second = args.fps.max(1) as usize;
    let stroke = Stroke::for_model(engine.model());
    let started = Instant::now();

    log::info!("Running {} ticks ({:.1}s at {} fps)", total_ticks, duration, args.fps);

    let mut written = 0usize;
    for tick in 0..total_ticks {
        let time_s = (tick + 1) as f32 * dt;
        let frame = engine.tick(spectrum_at(&mut analyser, &clip, time_s), dt);

        if let Some(recording) = &recording {
            if recording.should_capture(tick) {
                save_frame(&frame, stroke, recording, &recording.frame_path(written))?;
                written += 1;
            }
        }

        if (tick + 1) % ticks_per_second == 0 {
            let bands = frame.bands;
            log::info!(
                "t={:5.1}s  bands=({:.2}, {:.2}, {:.2})  {}",
                time_s,
                bands.low,
                bands.mid,
                bands.high,
                summarize(engine.model())
            );
        }
    }

    log::info!(
        "Done: {} ticks in {:.2}s, {} frames written, {} non-finite recoveries",
        total_ticks,
        started.elapsed().as_secs_f64(),
        written,
        engine.model().recoveries()
    );
    Ok(())
}

/// Samples feeding the analyser at `time_s`; `None` once the clip has ended
fn audio_window(clip: &PcmClip, time_s: f32, len: usize) -> Option<&[f32]> {
    if time_s > clip.duration_s() {
        return None;
    }
    Some(clip.window_ending_at(time_s, len))
}

/// Analyse the clip at `time_s`; `None` once the clip has ended
fn spectrum_at<'a>(
    analyser: &'a mut SpectrumAnalyser,
    clip: &PcmClip,
    time_s: f32,
) -> Option<&'a [u8]> {
    let window = audio_window(clip, time_s, analyser.fft_size())?;
    Some(analyser.analyse(window))
}

fn summarize(model: &ActiveModel) -> String {
    match model {
        ActiveModel::Swarm(swarm) => format!(
            "particles={}  kinetic={:.3}",
            swarm.particles().len(),
            swarm.total_kinetic_energy()
        ),
        ActiveModel::String(string) => format!(
            "points={}  peak={:.3}  kinetic={:.4}",
            string.num_points(),
            string.peak_displacement(),
            string.kinetic_energy()
        ),
        ActiveModel::Harmonic(line) => {
            format!("points={}  peak={:.3}", line.num_points(), line.peak_displacement())
        }
    }
}
