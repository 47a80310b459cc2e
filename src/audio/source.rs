//! PCM sources for the headless driver.

use std::f32::consts::PI;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::AudioSourceError;

/// Mono PCM clip in `[-1, 1]`
#[derive(Debug, Clone)]
pub struct PcmClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmClip {
    /// Clip duration (seconds)
    pub fn duration_s(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate.max(1) as f32
    }

    /// The `len` samples ending at `time_s` (shorter near the start of the clip)
    pub fn window_ending_at(&self, time_s: f32, len: usize) -> &[f32] {
        let end = ((time_s.max(0.0) * self.sample_rate as f32) as usize).min(self.samples.len());
        &self.samples[end.saturating_sub(len)..end]
    }
}

/// Read a WAV file and mix all channels down to mono `f32`
pub fn load_wav_mono(path: &Path) -> Result<PcmClip, AudioSourceError> {
    let wav_err = |source| AudioSourceError::Wav {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_err)?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioSourceError::UnsupportedFormat {
                    bits: spec.bits_per_sample,
                });
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(wav_err)?
        }
    };

    if interleaved.is_empty() {
        return Err(AudioSourceError::Empty {
            path: path.to_path_buf(),
        });
    }

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect::<Vec<_>>();

    log::info!(
        "Loaded {}: {} Hz, {} ch, {:.1}s",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len() as f32 / spec.sample_rate.max(1) as f32
    );

    Ok(PcmClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Deterministic test signal: silence, bass pulses, a pad, then dense transients.
///
/// Exercises the quiet/settle path as well as the bass-explosion path.
pub fn synthetic_test_signal(sample_rate: u32, seconds: f32) -> PcmClip {
    let sr = sample_rate.max(1) as f32;
    let n = (seconds.max(0.0) * sr).round() as usize;
    let section = seconds.max(1e-3) / 4.0;

    let samples = (0..n)
        .map(|i| {
            let t = i as f32 / sr;
            match (t / section) as usize {
                0 => 0.0,
                1 => {
                    // 120 BPM kick-like pulses
                    let phase = (t / 0.5).fract();
                    let env = (1.0 - phase / 0.15).max(0.0).powf(2.4);
                    (2.0 * PI * 60.0 * t).sin() * 0.9 * env
                }
                2 => {
                    let a = (2.0 * PI * 110.0 * t).sin() * 0.45;
                    let b = (2.0 * PI * 220.0 * t).sin() * 0.25;
                    let c = (2.0 * PI * 440.0 * t).sin() * 0.12;
                    (a + b + c) * 0.65
                }
                _ => {
                    let phase = (t / (60.0 / 160.0)).fract();
                    let hit = if phase < 0.06 { 1.0 } else { 0.0 };
                    let low = (2.0 * PI * 55.0 * t).sin() * (0.45 + 0.45 * hit);
                    let mid = (2.0 * PI * 330.0 * t).sin() * 0.22;
                    let hat = (2.0 * PI * 5_500.0 * t).sin() * (0.05 + 0.25 * hit);
                    (low + mid + hat).clamp(-1.0, 1.0)
                }
            }
        })
        .collect();

    PcmClip {
        samples,
        sample_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_signal_shape() {
        let clip = synthetic_test_signal(8_000, 4.0);
        assert_eq!(clip.samples.len(), 32_000);
        assert!((clip.duration_s() - 4.0).abs() < 1e-4);

        // First quarter is silent, the rest is not
        assert!(clip.samples[..8_000].iter().all(|&s| s == 0.0));
        assert!(clip.samples[8_000..].iter().any(|&s| s.abs() > 0.1));
        assert!(clip.samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_window_ending_at() {
        let clip = PcmClip {
            samples: (0..100).map(|i| i as f32).collect(),
            sample_rate: 10,
        };
        assert_eq!(clip.window_ending_at(0.0, 8), &[] as &[f32]);
        assert_eq!(clip.window_ending_at(0.5, 8), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(clip.window_ending_at(5.0, 3), &[47.0, 48.0, 49.0]);
        assert_eq!(clip.window_ending_at(50.0, 2), &[98.0, 99.0]);
    }

    #[test]
    fn test_wav_round_trip_mixes_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(i16::MAX / 2).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let clip = load_wav_mono(&path).unwrap();
        assert_eq!(clip.sample_rate, 8_000);
        assert_eq!(clip.samples.len(), 10);
        assert!((clip.samples[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_missing_wav_is_error() {
        let err = load_wav_mono(Path::new("/nonexistent/input.wav")).unwrap_err();
        assert!(matches!(err, AudioSourceError::Wav { .. }));
    }
}
