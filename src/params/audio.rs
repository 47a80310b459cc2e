//! Audio analysis configuration and band mapping.

use std::ops::Range;

use serde::Deserialize;

use super::{clamp_count, clamp_param};

/// Lowest sample rate the band mapping accepts (Hz)
pub const MIN_SAMPLE_RATE_HZ: usize = 8_000;

/// Highest sample rate the band mapping accepts (Hz)
pub const MAX_SAMPLE_RATE_HZ: usize = 192_000;

/// How the magnitude array is divided into low/mid/high bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSplit {
    /// Map the configured band frequencies to bin indices
    #[default]
    Frequencies,

    /// Split the index range into three equal thirds
    Thirds,
}

/// Spectrum analysis and feature extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Band split strategy
    pub split: BandSplit,

    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// FFT window size (power of 2); the magnitude array holds `fft_size / 2` bins
    pub fft_size: usize,

    /// Bass frequency range (Hz)
    pub bass_range_hz: (f32, f32),

    /// Mid frequency range (Hz)
    pub mid_range_hz: (f32, f32),

    /// High frequency range (Hz)
    pub high_range_hz: (f32, f32),

    /// Exponent `p` in `pow(mean / 255, p) * k`
    /// Reference values: 2.0 or 1.5
    pub exponent: f32,

    /// Gain `k` in `pow(mean / 255, p) * k`
    /// Reference values: 10.0 or 5.0
    pub gain: f32,

    /// Exponential smoothing factor α (0 = off, 0.8 = heavy)
    pub smoothing: f32,

    /// Magnitude mapped to byte 0 (dB)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dB)
    pub max_decibels: f32,

    /// Time smoothing applied to raw FFT magnitudes before dB conversion
    pub analyser_smoothing: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            split: BandSplit::Frequencies,
            sample_rate_hz: 44100,
            fft_size: 1024,
            bass_range_hz: (20.0, 200.0),
            mid_range_hz: (200.0, 1000.0),
            high_range_hz: (1000.0, 4000.0),
            exponent: 2.0,
            gain: 10.0,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
            analyser_smoothing: 0.8,
        }
    }
}

impl FeatureConfig {
    /// Convert frequency (Hz) to FFT bin index: `floor(hz / (sample_rate / fft_size))`
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        let resolution = self.sample_rate_hz as f32 / self.fft_size as f32;
        (hz.max(0.0) / resolution).floor() as usize
    }

    /// Whether `hz` survives [`FeatureConfig::sanitized`] unchanged
    pub fn supports_sample_rate(hz: usize) -> bool {
        (MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ).contains(&hz)
    }

    /// This config retargeted at audio recorded at `hz`.
    ///
    /// An unsupported rate is clamped, which shifts every band to the wrong
    /// bins; that case is logged as a warning.
    pub fn for_sample_rate(&self, hz: usize) -> Self {
        if !Self::supports_sample_rate(hz) {
            log::warn!(
                "Sample rate {} Hz is outside {}-{} Hz; band frequencies will be misplaced",
                hz,
                MIN_SAMPLE_RATE_HZ,
                MAX_SAMPLE_RATE_HZ
            );
        }
        Self {
            sample_rate_hz: hz,
            ..self.clone()
        }
        .sanitized()
    }

    /// Number of magnitude bins produced per analysis frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Bin ranges for (low, mid, high) over an array of `len` magnitudes.
    ///
    /// Ranges are clipped to `len` and never inverted, so an empty or short
    /// array yields empty ranges rather than panicking on slice.
    pub fn band_ranges(&self, len: usize) -> [Range<usize>; 3] {
        let clip = |r: Range<usize>| {
            let start = r.start.min(len);
            let end = r.end.min(len).max(start);
            start..end
        };
        match self.split {
            BandSplit::Thirds => {
                let a = len / 3;
                let b = 2 * len / 3;
                [0..a, a..b, b..len]
            }
            BandSplit::Frequencies => [
                clip(self.hz_to_bin(self.bass_range_hz.0)..self.hz_to_bin(self.bass_range_hz.1)),
                clip(self.hz_to_bin(self.mid_range_hz.0)..self.hz_to_bin(self.mid_range_hz.1)),
                clip(self.hz_to_bin(self.high_range_hz.0)..self.hz_to_bin(self.high_range_hz.1)),
            ],
        }
    }

    /// Clamp every field into its valid range
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let fft_size = clamp_count("fft_size", self.fft_size, 32, 32768).next_power_of_two();
        let min_decibels = clamp_param("min_decibels", self.min_decibels, -200.0, -1.0, d.min_decibels);
        let max_decibels = clamp_param(
            "max_decibels",
            self.max_decibels,
            min_decibels + 1.0,
            0.0,
            d.max_decibels,
        );
        let range = |name: &str, r: (f32, f32), fallback: (f32, f32)| {
            let lo = clamp_param(name, r.0, 0.0, 96_000.0, fallback.0);
            let hi = clamp_param(name, r.1, lo, 96_000.0, fallback.1.max(lo));
            (lo, hi)
        };
        Self {
            split: self.split,
            sample_rate_hz: clamp_count(
                "sample_rate_hz",
                self.sample_rate_hz,
                MIN_SAMPLE_RATE_HZ,
                MAX_SAMPLE_RATE_HZ,
            ),
            fft_size,
            bass_range_hz: range("bass_range_hz", self.bass_range_hz, d.bass_range_hz),
            mid_range_hz: range("mid_range_hz", self.mid_range_hz, d.mid_range_hz),
            high_range_hz: range("high_range_hz", self.high_range_hz, d.high_range_hz),
            exponent: clamp_param("exponent", self.exponent, 0.1, 4.0, d.exponent),
            gain: clamp_param("gain", self.gain, 0.0, 100.0, d.gain),
            smoothing: clamp_param("smoothing", self.smoothing, 0.0, 0.99, d.smoothing),
            min_decibels,
            max_decibels,
            analyser_smoothing: clamp_param(
                "analyser_smoothing",
                self.analyser_smoothing,
                0.0,
                0.99,
                d.analyser_smoothing,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hz_to_bin() {
        let config = FeatureConfig::default();

        // At 44100 Hz sample rate and 1024 FFT size:
        // Bin resolution = 44100 / 1024 ≈ 43.07 Hz per bin
        assert_eq!(config.hz_to_bin(0.0), 0);
        assert_eq!(config.hz_to_bin(43.1), 1);
        assert_eq!(config.hz_to_bin(100.0), 2);
        assert_eq!(config.hz_to_bin(-50.0), 0);
    }

    #[test]
    fn test_band_ranges_are_ordered() {
        let config = FeatureConfig::default();
        let [bass, mid, high] = config.band_ranges(config.bin_count());

        assert!(bass.end <= 10);
        assert!(mid.start >= bass.end);
        assert!(high.start >= mid.end);
        assert!(high.end <= 100);
    }

    #[test]
    fn test_band_ranges_clip_to_short_input() {
        let config = FeatureConfig::default();
        let [bass, mid, high] = config.band_ranges(3);
        assert!(bass.end <= 3 && mid.end <= 3 && high.end <= 3);
        assert!(high.is_empty());
    }

    #[test]
    fn test_thirds_split() {
        let config = FeatureConfig {
            split: BandSplit::Thirds,
            ..Default::default()
        };
        assert_eq!(config.band_ranges(9), [0..3, 3..6, 6..9]);
        assert_eq!(config.band_ranges(0), [0..0, 0..0, 0..0]);
    }

    #[test]
    fn test_sanitized_rounds_fft_size_and_clamps() {
        let config = FeatureConfig {
            fft_size: 1000,
            smoothing: 1.5,
            exponent: f32::NAN,
            sample_rate_hz: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.smoothing, 0.99);
        assert_eq!(config.exponent, 2.0);
        assert_eq!(config.sample_rate_hz, 8_000);
    }

    #[test]
    fn test_for_sample_rate() {
        let base = FeatureConfig::default();
        assert!(FeatureConfig::supports_sample_rate(48_000));
        assert_eq!(base.for_sample_rate(48_000).sample_rate_hz, 48_000);

        // Below the floor the rate is clamped and flagged as unsupported
        assert!(!FeatureConfig::supports_sample_rate(4_000));
        assert_eq!(base.for_sample_rate(4_000).sample_rate_hz, MIN_SAMPLE_RATE_HZ);
        assert!(!FeatureConfig::supports_sample_rate(384_000));
    }
}
