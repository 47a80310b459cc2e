//! String and wave-line physics parameters.

use serde::Deserialize;

use super::{clamp_count, clamp_param};

/// Modal string simulation parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StringPhysics {
    /// Number of points along the string
    pub num_points: usize,

    /// String length (meters); rest x-positions span `[-L/2, L/2]`
    pub length_m: f32,

    /// String tension (N)
    pub tension: f32,

    /// Linear mass density (kg/m); `wave_speed = sqrt(tension / density)`
    pub linear_density: f32,

    /// Scale applied to the weighted band mean before driving the modes
    pub amplitude_scale: f32,

    /// Damping applied to every point each tick (fraction of velocity)
    pub base_damping: f32,

    /// Extra damping at the ends: `edge_factor * edge_damping_gain`
    pub edge_damping_gain: f32,

    /// Noise excitation amplitude
    pub excitability: f32,

    /// Noise excitation that remains in silence (0 = line relaxes fully)
    pub idle_excitation: f32,

    /// Spatial scale of the excitation noise (1/m)
    pub noise_scale: f32,

    /// Temporal scale of the excitation noise (1/s)
    pub noise_time_scale: f32,

    /// Gain of the direct (unaveraged) band forcing
    pub audio_drive: f32,

    /// Weights of the (low, mid, high) bands in the total amplitude
    pub band_weights: [f32; 3],

    /// Time constant of the global displacement decay τ (seconds)
    pub decay_time_s: f32,

    /// Seed of the excitation noise field
    pub noise_seed: u32,
}

impl Default for StringPhysics {
    fn default() -> Self {
        Self {
            num_points: 100,
            length_m: 10.0,
            tension: 1.0,
            linear_density: 0.01,
            amplitude_scale: 1.0,
            base_damping: 0.02,
            edge_damping_gain: 1.0,
            excitability: 0.2,
            idle_excitation: 0.0,
            noise_scale: 0.5,
            noise_time_scale: 0.5,
            audio_drive: 0.5,
            band_weights: [0.5, 0.3, 0.2],
            decay_time_s: 1.0,
            noise_seed: 7,
        }
    }
}

impl StringPhysics {
    /// Transverse wave speed `sqrt(tension / linear_density)` (m/s)
    pub fn wave_speed(&self) -> f32 {
        (self.tension / self.linear_density).sqrt()
    }

    /// Clamp every field into its valid range
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let mut band_weights = [
            clamp_param("band_weights", self.band_weights[0], 0.0, 10.0, d.band_weights[0]),
            clamp_param("band_weights", self.band_weights[1], 0.0, 10.0, d.band_weights[1]),
            clamp_param("band_weights", self.band_weights[2], 0.0, 10.0, d.band_weights[2]),
        ];
        if band_weights.iter().sum::<f32>() <= f32::EPSILON {
            band_weights = d.band_weights;
        }
        Self {
            num_points: clamp_count("num_points", self.num_points, 2, 20_000),
            length_m: clamp_param("length_m", self.length_m, 0.1, 1000.0, d.length_m),
            tension: clamp_param("tension", self.tension, 0.01, 1000.0, d.tension),
            linear_density: clamp_param("linear_density", self.linear_density, 1e-4, 100.0, d.linear_density),
            amplitude_scale: clamp_param("amplitude_scale", self.amplitude_scale, 0.0, 100.0, d.amplitude_scale),
            base_damping: clamp_param("base_damping", self.base_damping, 0.0, 1.0, d.base_damping),
            edge_damping_gain: clamp_param(
                "edge_damping_gain",
                self.edge_damping_gain,
                0.0,
                1.0,
                d.edge_damping_gain,
            ),
            excitability: clamp_param("excitability", self.excitability, 0.0, 10.0, d.excitability),
            idle_excitation: clamp_param("idle_excitation", self.idle_excitation, 0.0, 1.0, d.idle_excitation),
            noise_scale: clamp_param("noise_scale", self.noise_scale, 0.0, 100.0, d.noise_scale),
            noise_time_scale: clamp_param(
                "noise_time_scale",
                self.noise_time_scale,
                0.0,
                100.0,
                d.noise_time_scale,
            ),
            audio_drive: clamp_param("audio_drive", self.audio_drive, 0.0, 100.0, d.audio_drive),
            band_weights,
            decay_time_s: clamp_param("decay_time_s", self.decay_time_s, 0.01, 100.0, d.decay_time_s),
            noise_seed: self.noise_seed,
        }
    }
}

/// Harmonic wave-line parameters (synthesized waveform + smoothing filter)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarmonicLineParams {
    /// Number of points along the line
    pub num_points: usize,

    /// Line length (meters)
    pub length_m: f32,

    /// Peak displacement per unit band energy (meters)
    pub amplitude_scale: f32,

    /// Phase speed of the travelling harmonics (rad/s for harmonic 1)
    pub phase_speed: f32,

    /// Number of neighbour-averaging passes
    pub smoothing_passes: usize,

    /// Half-width of the averaging window (points)
    pub smoothing_radius: usize,

    /// Exponent `p` in the edge attenuation `sin(u·π)^p`
    pub edge_exponent: f32,

    /// Time constant with which the line follows the synthesized target (seconds)
    pub response_time_s: f32,

    /// Noise wobble amplitude added to the target (meters)
    pub excitability: f32,

    /// Seed of the wobble noise field
    pub noise_seed: u32,
}

impl Default for HarmonicLineParams {
    fn default() -> Self {
        Self {
            num_points: 200,
            length_m: 10.0,
            amplitude_scale: 0.25,
            phase_speed: 1.2,
            smoothing_passes: 3,
            smoothing_radius: 3,
            edge_exponent: 1.5,
            response_time_s: 0.08,
            excitability: 0.05,
            noise_seed: 11,
        }
    }
}

impl HarmonicLineParams {
    /// Clamp every field into its valid range
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            num_points: clamp_count("num_points", self.num_points, 2, 20_000),
            length_m: clamp_param("length_m", self.length_m, 0.1, 1000.0, d.length_m),
            amplitude_scale: clamp_param("amplitude_scale", self.amplitude_scale, 0.0, 100.0, d.amplitude_scale),
            phase_speed: clamp_param("phase_speed", self.phase_speed, 0.0, 100.0, d.phase_speed),
            smoothing_passes: clamp_count("smoothing_passes", self.smoothing_passes, 0, 16),
            smoothing_radius: clamp_count("smoothing_radius", self.smoothing_radius, 1, 32),
            edge_exponent: clamp_param("edge_exponent", self.edge_exponent, 0.0, 8.0, d.edge_exponent),
            response_time_s: clamp_param(
                "response_time_s",
                self.response_time_s,
                0.001,
                10.0,
                d.response_time_s,
            ),
            excitability: clamp_param("excitability", self.excitability, 0.0, 10.0, d.excitability),
            noise_seed: self.noise_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_speed() {
        let p = StringPhysics {
            tension: 4.0,
            linear_density: 1.0,
            ..Default::default()
        };
        assert!((p.wave_speed() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_tension_is_clamped() {
        let p = StringPhysics {
            tension: 0.0,
            base_damping: -0.5,
            num_points: 0,
            ..Default::default()
        }
        .sanitized();
        assert!(p.tension > 0.0);
        assert!(p.wave_speed().is_finite());
        assert_eq!(p.base_damping, 0.0);
        assert_eq!(p.num_points, 2);
    }

    #[test]
    fn test_all_zero_band_weights_fall_back() {
        let p = StringPhysics {
            band_weights: [0.0, 0.0, 0.0],
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.band_weights, StringPhysics::default().band_weights);
    }

    #[test]
    fn test_harmonic_radius_at_least_one() {
        let p = HarmonicLineParams {
            smoothing_radius: 0,
            smoothing_passes: 100,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.smoothing_radius, 1);
        assert_eq!(p.smoothing_passes, 16);
    }
}
