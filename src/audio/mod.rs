//! Audio feature extraction.
//!
//! Reduces a byte-range magnitude spectrum to a three-band energy vector
//! that drives every motion model. The analyser and sources produce that
//! spectrum from PCM for the headless driver.

mod analyser;
mod features;
mod source;

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// Re-export public types
pub use analyser::{hann_window, SpectrumAnalyser};
pub use features::FeatureExtractor;
pub use source::{load_wav_mono, synthetic_test_signal, PcmClip};

/// Audio frequency band energies
///
/// Non-negative and unbounded above: the normalization formula can exceed 1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub low: f32,  // Bass
    pub mid: f32,  // Mids
    pub high: f32, // Highs
}

impl AudioBands {
    pub const ZERO: Self = Self {
        low: 0.0,
        mid: 0.0,
        high: 0.0,
    };

    pub fn new(low: f32, mid: f32, high: f32) -> Self {
        Self { low, mid, high }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.low, self.mid, self.high]
    }

    /// Unweighted mean of the three bands
    pub fn mean(&self) -> f32 {
        (self.low + self.mid + self.high) / 3.0
    }

    /// Mean weighted by `weights`; weights are normalized by their sum
    pub fn weighted_mean(&self, weights: [f32; 3]) -> f32 {
        let total = weights[0] + weights[1] + weights[2];
        if total <= f32::EPSILON {
            return self.mean();
        }
        (self.low * weights[0] + self.mid * weights[1] + self.high * weights[2]) / total
    }

    /// Replace negative or non-finite bands with zero
    pub fn sanitized(&self) -> Self {
        let fix = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            low: fix(self.low),
            mid: fix(self.mid),
            high: fix(self.high),
        }
    }

    /// `alpha * previous + (1 - alpha) * self`
    pub fn smoothed_against(&self, previous: &Self, alpha: f32) -> Self {
        *previous * alpha + *self * (1.0 - alpha)
    }
}

impl Add for AudioBands {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.low + rhs.low, self.mid + rhs.mid, self.high + rhs.high)
    }
}

impl Sub for AudioBands {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.low - rhs.low, self.mid - rhs.mid, self.high - rhs.high)
    }
}

impl AddAssign for AudioBands {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for AudioBands {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for AudioBands {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.low * rhs, self.mid * rhs, self.high * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_weighted_mean() {
        let bands = AudioBands::new(3.0, 0.0, 0.0);
        assert!((bands.mean() - 1.0).abs() < 1e-6);
        assert!((bands.weighted_mean([2.0, 1.0, 1.0]) - 1.5).abs() < 1e-6);
        // Degenerate weights fall back to the plain mean
        assert!((bands.weighted_mean([0.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sanitized_drops_bad_values() {
        let bands = AudioBands::new(f32::NAN, -1.0, 2.0).sanitized();
        assert_eq!(bands, AudioBands::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_smoothing() {
        let prev = AudioBands::new(1.0, 1.0, 1.0);
        let raw = AudioBands::ZERO;
        let s = raw.smoothed_against(&prev, 0.8);
        assert!((s.low - 0.8).abs() < 1e-6);
    }
}
