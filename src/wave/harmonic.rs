//! Harmonic wave line: directly synthesized waveform plus a multi-pass
//! low-pass filter.
//!
//! Where the modal string integrates a force model, this variant builds a
//! target shape from a fixed harmonic series each tick, smooths it with a
//! distance-weighted sliding window, attenuates it toward the ends and lets
//! the displayed line follow the target exponentially.

use std::f32::consts::{PI, TAU};

use crate::audio::AudioBands;
use crate::noise::NoiseGenerator;
use crate::params::HarmonicLineParams;

/// Harmonic numbers of the synthesized waveform
pub const HARMONICS: [u32; 7] = [1, 2, 3, 5, 8, 13, 21];

const MAX_DT_S: f32 = 0.1;

/// Line of points whose shape is a smoothed harmonic series
pub struct HarmonicLine {
    params: HarmonicLineParams,
    noise: NoiseGenerator,
    along: Vec<f32>,
    /// `sin(uπ)^p` per point
    edge_gain: Vec<f32>,
    target: Vec<f32>,
    scratch: Vec<f32>,
    displacement: Vec<f32>,
    positions: Vec<[f32; 3]>,
    /// Wrapped to one period; harmonics are integer multiples
    phase: f32,
    time_s: f32,
    recoveries: u64,
}

impl HarmonicLine {
    pub fn new(params: HarmonicLineParams) -> Self {
        let params = params.sanitized();
        let mut line = Self {
            noise: NoiseGenerator::new(params.noise_seed),
            params,
            along: Vec::new(),
            edge_gain: Vec::new(),
            target: Vec::new(),
            scratch: Vec::new(),
            displacement: Vec::new(),
            positions: Vec::new(),
            phase: 0.0,
            time_s: 0.0,
            recoveries: 0,
        };
        line.rebuild_points();
        line
    }

    pub fn params(&self) -> &HarmonicLineParams {
        &self.params
    }

    pub fn set_params(&mut self, params: HarmonicLineParams) {
        let params = params.sanitized();
        let rebuild = params.num_points != self.params.num_points
            || params.length_m != self.params.length_m
            || params.edge_exponent != self.params.edge_exponent;
        if params.noise_seed != self.params.noise_seed {
            self.noise = NoiseGenerator::new(params.noise_seed);
        }
        self.params = params;
        if rebuild {
            log::debug!("Harmonic line rebuilt with {} points", self.params.num_points);
            self.rebuild_points();
        }
    }

    fn rebuild_points(&mut self) {
        let n = self.params.num_points;
        let last = (n - 1).max(1) as f32;
        let length = self.params.length_m;
        let exponent = self.params.edge_exponent;

        self.along = (0..n).map(|i| i as f32 / last).collect();
        self.edge_gain = self
            .along
            .iter()
            .map(|u| (u * PI).sin().max(0.0).powf(exponent))
            .collect();
        self.target = vec![0.0; n];
        self.scratch = vec![0.0; n];
        self.displacement = vec![0.0; n];
        self.positions = self.along.iter().map(|u| [(u - 0.5) * length, 0.0, 0.0]).collect();
    }

    pub fn num_points(&self) -> usize {
        self.displacement.len()
    }

    pub fn displacements(&self) -> &[f32] {
        &self.displacement
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn recoveries(&self) -> u64 {
        self.recoveries
    }

    pub fn time_s(&self) -> f32 {
        self.time_s
    }

    pub fn peak_displacement(&self) -> f32 {
        self.displacement.iter().fold(0.0f32, |m, y| m.max(y.abs()))
    }

    /// Advance one tick. Non-positive or non-finite `dt` is ignored.
    pub fn update(&mut self, audio: &AudioBands, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            log::debug!("Ignoring harmonic tick with dt = {}", dt);
            return;
        }
        let dt = dt.min(MAX_DT_S);
        let audio = audio.sanitized();
        self.phase = (self.phase + dt * self.params.phase_speed) % TAU;
        self.time_s += dt;

        self.synthesize(audio);
        for _ in 0..self.params.smoothing_passes {
            smooth_pass(&self.target, &mut self.scratch, self.params.smoothing_radius);
            std::mem::swap(&mut self.target, &mut self.scratch);
        }
        for (t, g) in self.target.iter_mut().zip(self.edge_gain.iter()) {
            *t *= g;
        }

        let follow = 1.0 - (-dt / self.params.response_time_s).exp();
        let mut reset = 0usize;
        for (y, &t) in self.displacement.iter_mut().zip(self.target.iter()) {
            *y += (t - *y) * follow;
            if !y.is_finite() {
                *y = 0.0;
                reset += 1;
            }
        }
        if reset > 0 {
            self.recoveries += reset as u64;
            log::warn!("Reset {} non-finite wave point(s) at t={:.2}s", reset, self.time_s);
        }

        for (position, &y) in self.positions.iter_mut().zip(self.displacement.iter()) {
            position[1] = y;
        }
    }

    /// Fill `target` with the raw harmonic waveform
    fn synthesize(&mut self, audio: AudioBands) {
        let scale = self.params.amplitude_scale;
        let mut amplitudes = [0.0f32; HARMONICS.len()];
        for (amp, &h) in amplitudes.iter_mut().zip(HARMONICS.iter()) {
            // Low harmonics follow the bass, the highest ones the treble
            let band = match h {
                1 | 2 => audio.low,
                3 | 5 => audio.mid,
                _ => audio.high,
            };
            *amp = scale * band / (h as f32).sqrt();
        }

        let level = audio.mean().min(1.0);
        let excitation = self.params.excitability * level;
        let phase = self.phase;
        let noise_t = (self.time_s * self.params.phase_speed) as f64;

        for (t, &u) in self.target.iter_mut().zip(self.along.iter()) {
            let mut y = 0.0;
            for (&amp, &h) in amplitudes.iter().zip(HARMONICS.iter()) {
                let h = h as f32;
                y += amp * (2.0 * PI * h * u - phase * h).sin();
            }
            if excitation > 0.0 {
                y += self.noise.sample_2d((u * 8.0) as f64, noise_t) * excitation;
            }
            *t = y;
        }
    }
}

/// One distance-weighted sliding-window average from `input` into `output`.
///
/// Weights fall off linearly: `1 - |j - i| / (radius + 1)`. The window is
/// truncated at the ends and renormalized.
fn smooth_pass(input: &[f32], output: &mut [f32], radius: usize) {
    let n = input.len();
    let span = (radius + 1) as f32;
    for (i, out) in output.iter_mut().enumerate().take(n) {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius).min(n - 1);
        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for (j, &v) in input.iter().enumerate().take(hi + 1).skip(lo) {
            let w = 1.0 - (j as f32 - i as f32).abs() / span;
            sum += v * w;
            weight_sum += w;
        }
        *out = sum / weight_sum;
    }
}
