//! Spectrum analyser producing byte-range magnitude snapshots.
//!
//! Mirrors a browser analyser node: Hann window, FFT, magnitude smoothing
//! over time, conversion to decibels, then a linear map of
//! `[min_decibels, max_decibels]` onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::params::FeatureConfig;

/// Windowed FFT analyser with preallocated buffers
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    time_smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
}

impl SpectrumAnalyser {
    pub fn new(config: &FeatureConfig) -> Self {
        let config = config.sanitized();
        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            fft,
            fft_size,
            window: (0..fft_size).map(|i| hann_window(i, fft_size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; fft_size / 2],
            bytes: vec![0; fft_size / 2],
            time_smoothing: config.analyser_smoothing,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Latest byte snapshot (`fft_size / 2` bins)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Analyse the most recent `fft_size` samples of `samples`.
    ///
    /// Shorter input is zero-padded at the front; non-finite samples count as silence.
    pub fn analyse(&mut self, samples: &[f32]) -> &[u8] {
        let n = self.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let range = self.max_decibels - self.min_decibels;
        let tau = self.time_smoothing;
        let bins = self.smoothed.iter_mut().zip(self.bytes.iter_mut());
        for (k, (smoothed, byte)) in bins.enumerate() {
            let magnitude = self.buffer[k].norm() / n as f32;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            let db = if *smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = 255.0 * (db - self.min_decibels) / range;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }

        &self.bytes
    }

    /// Clear the temporal smoothing state
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}
