//! Three-band feature extraction from byte-range magnitudes.

use super::AudioBands;
use crate::params::FeatureConfig;

/// Largest value a magnitude bin can hold
const MAX_MAGNITUDE: f32 = 255.0;

/// Stateful band-energy extractor with optional exponential smoothing
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    smoothed: AudioBands,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config: config.sanitized(),
            smoothed: AudioBands::ZERO,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Replace the configuration; the smoothing state is kept
    pub fn set_config(&mut self, config: FeatureConfig) {
        self.config = config.sanitized();
    }

    /// Most recent output
    pub fn current(&self) -> AudioBands {
        self.smoothed
    }

    /// Raw (unsmoothed) band energies of one magnitude array.
    ///
    /// For each band: `pow(sum / (count * 255), p) * k`. Empty bands are zero.
    pub fn band_energies(&self, magnitudes: &[u8]) -> AudioBands {
        let [low, mid, high] = self.config.band_ranges(magnitudes.len());
        let energy = |range: std::ops::Range<usize>| -> f32 {
            let band = &magnitudes[range];
            if band.is_empty() {
                return 0.0;
            }
            let sum: u32 = band.iter().map(|&m| m as u32).sum();
            let normalized = sum as f32 / (band.len() as f32 * MAX_MAGNITUDE);
            normalized.powf(self.config.exponent) * self.config.gain
        };
        AudioBands::new(energy(low), energy(mid), energy(high))
    }

    /// Extract and smooth one frame
    pub fn extract(&mut self, magnitudes: &[u8]) -> AudioBands {
        let raw = self.band_energies(magnitudes);
        self.push_raw(raw)
    }

    /// Advance the smoother with no input (upstream audio unavailable)
    pub fn silence(&mut self) -> AudioBands {
        self.push_raw(AudioBands::ZERO)
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed = AudioBands::ZERO;
    }

    fn push_raw(&mut self, raw: AudioBands) -> AudioBands {
        let alpha = self.config.smoothing;
        self.smoothed = if alpha > 0.0 {
            raw.smoothed_against(&self.smoothed, alpha)
        } else {
            raw
        };
        self.smoothed
    }
}
