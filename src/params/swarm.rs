//! Particle swarm physics parameters.

use serde::Deserialize;

use super::{clamp_count, clamp_param};

/// Particle swarm simulation parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwarmPhysics {
    /// Number of particles in the pool
    pub particle_count: usize,

    /// Seed from which every particle's generator is derived
    pub seed: u64,

    /// Containment sphere radius around the swarm center (meters)
    pub boundary_radius_m: f32,

    /// Upper bound of the random slack added to the boundary each tick (meters)
    pub boundary_variation_m: f32,

    /// Fraction of the boundary radius used for initial placement
    pub spawn_radius_fraction: f32,

    /// Mean center-seeking speed; each particle draws `base_speed * [0.5, 1.5)`
    pub base_speed: f32,

    /// Lower energy bound
    pub min_energy: f32,

    /// Upper energy bound
    pub max_energy: f32,

    /// Energy above which the center pull engages; at or below it the particle settles
    pub rest_threshold: f32,

    /// Energy gained per second per unit audio level
    pub energy_rate: f32,

    /// Energy lost per second regardless of audio
    pub energy_decay: f32,

    /// Deceleration gain applied while settling (1/s)
    pub settle_rate: f32,

    /// Per-band force weights (low, mid, high); low is weighted highest
    pub band_weights: [f32; 3],

    /// Per-axis oscillation frequencies for the audio force (rad/s)
    pub oscillation_freqs: [f32; 3],

    /// Range each particle's per-band sensitivity is drawn from
    pub sensitivity_range: (f32, f32),

    /// Averaged low-band energy above which the bass explosion fires
    pub bass_threshold: f32,

    /// Explosion impulse gain
    pub explosion_gain: f32,

    /// Random perturbation of the explosion direction (fraction of unit length)
    pub explosion_jitter: f32,

    /// Noise acceleration strength at zero audio level and unit energy
    pub noise_strength: f32,

    /// Exponent `n` in `(1 - audio_level)^n`
    pub noise_exponent: f32,

    /// Spatial scale of the noise field (1/m)
    pub noise_scale: f32,

    /// Temporal scroll rate of the noise field (1/s)
    pub noise_time_scale: f32,

    /// Vertical wave acceleration amplitude (m/s²)
    pub wave_amplitude: f32,

    /// Vertical wave temporal frequency (rad/s)
    pub wave_frequency: f32,

    /// Vertical wave spatial frequency along x (rad/m)
    pub wave_spatial_frequency: f32,

    /// How strongly audio level scales the wave: `(1 + level * gain)`
    pub wave_audio_gain: f32,

    /// Velocity retained after reflecting off the boundary (Open Question: 0.5 or 0.8)
    pub restitution: f32,

    /// Energy multiplier applied on boundary impact
    pub impact_energy_loss: f32,
}

impl Default for SwarmPhysics {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            seed: 42,
            boundary_radius_m: 5.0,
            boundary_variation_m: 0.5,
            spawn_radius_fraction: 0.6,
            base_speed: 1.0,
            min_energy: 0.0,
            max_energy: 1.0,
            rest_threshold: 0.3,
            energy_rate: 1.0,
            energy_decay: 0.35,
            settle_rate: 3.0,
            band_weights: [1.5, 1.0, 0.6],
            oscillation_freqs: [0.7, 1.1, 1.7],
            sensitivity_range: (0.5, 1.5),
            bass_threshold: 1.0,
            explosion_gain: 0.5,
            explosion_jitter: 0.2,
            noise_strength: 0.6,
            noise_exponent: 2.0,
            noise_scale: 0.4,
            noise_time_scale: 0.25,
            wave_amplitude: 0.5,
            wave_frequency: 1.5,
            wave_spatial_frequency: 0.8,
            wave_audio_gain: 2.0,
            restitution: 0.8,
            impact_energy_loss: 0.5,
        }
    }
}

impl SwarmPhysics {
    /// Clamp every field into its valid range
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let boundary_radius_m =
            clamp_param("boundary_radius_m", self.boundary_radius_m, 0.1, 1000.0, d.boundary_radius_m);
        let min_energy = clamp_param("min_energy", self.min_energy, 0.0, 100.0, d.min_energy);
        let max_energy = clamp_param(
            "max_energy",
            self.max_energy,
            min_energy + 1e-3,
            1000.0,
            d.max_energy.max(min_energy + 1e-3),
        );
        let rest_threshold = clamp_param(
            "rest_threshold",
            self.rest_threshold,
            1e-3,
            max_energy,
            d.rest_threshold.clamp(1e-3, max_energy),
        );
        let sens_lo = clamp_param("sensitivity_range", self.sensitivity_range.0, 0.0, 10.0, 0.5);
        let sens_hi = clamp_param("sensitivity_range", self.sensitivity_range.1, sens_lo, 10.0, sens_lo);
        let per_band = |name: &str, v: [f32; 3], fallback: [f32; 3], hi: f32| {
            [
                clamp_param(name, v[0], 0.0, hi, fallback[0]),
                clamp_param(name, v[1], 0.0, hi, fallback[1]),
                clamp_param(name, v[2], 0.0, hi, fallback[2]),
            ]
        };

        Self {
            particle_count: clamp_count("particle_count", self.particle_count, 1, 50_000),
            seed: self.seed,
            boundary_radius_m,
            boundary_variation_m: clamp_param(
                "boundary_variation_m",
                self.boundary_variation_m,
                0.0,
                boundary_radius_m,
                d.boundary_variation_m.min(boundary_radius_m),
            ),
            spawn_radius_fraction: clamp_param(
                "spawn_radius_fraction",
                self.spawn_radius_fraction,
                0.0,
                1.0,
                d.spawn_radius_fraction,
            ),
            base_speed: clamp_param("base_speed", self.base_speed, 0.0, 100.0, d.base_speed),
            min_energy,
            max_energy,
            rest_threshold,
            energy_rate: clamp_param("energy_rate", self.energy_rate, 0.0, 100.0, d.energy_rate),
            energy_decay: clamp_param("energy_decay", self.energy_decay, 0.0, 100.0, d.energy_decay),
            settle_rate: clamp_param("settle_rate", self.settle_rate, 0.0, 100.0, d.settle_rate),
            band_weights: per_band("band_weights", self.band_weights, d.band_weights, 10.0),
            oscillation_freqs: per_band("oscillation_freqs", self.oscillation_freqs, d.oscillation_freqs, 100.0),
            sensitivity_range: (sens_lo, sens_hi),
            bass_threshold: clamp_param("bass_threshold", self.bass_threshold, 0.0, 100.0, d.bass_threshold),
            explosion_gain: clamp_param("explosion_gain", self.explosion_gain, 0.0, 100.0, d.explosion_gain),
            explosion_jitter: clamp_param("explosion_jitter", self.explosion_jitter, 0.0, 1.0, d.explosion_jitter),
            noise_strength: clamp_param("noise_strength", self.noise_strength, 0.0, 100.0, d.noise_strength),
            noise_exponent: clamp_param("noise_exponent", self.noise_exponent, 0.0, 8.0, d.noise_exponent),
            noise_scale: clamp_param("noise_scale", self.noise_scale, 0.0, 100.0, d.noise_scale),
            noise_time_scale: clamp_param(
                "noise_time_scale",
                self.noise_time_scale,
                0.0,
                100.0,
                d.noise_time_scale,
            ),
            wave_amplitude: clamp_param("wave_amplitude", self.wave_amplitude, 0.0, 100.0, d.wave_amplitude),
            wave_frequency: clamp_param("wave_frequency", self.wave_frequency, 0.0, 100.0, d.wave_frequency),
            wave_spatial_frequency: clamp_param(
                "wave_spatial_frequency",
                self.wave_spatial_frequency,
                0.0,
                100.0,
                d.wave_spatial_frequency,
            ),
            wave_audio_gain: clamp_param("wave_audio_gain", self.wave_audio_gain, 0.0, 100.0, d.wave_audio_gain),
            restitution: clamp_param("restitution", self.restitution, 0.0, 1.0, d.restitution),
            impact_energy_loss: clamp_param(
                "impact_energy_loss",
                self.impact_energy_loss,
                0.0,
                1.0,
                d.impact_energy_loss,
            ),
        }
    }

    /// Largest distance from the center a particle may occupy after boundary enforcement
    pub fn max_extent_m(&self) -> f32 {
        self.boundary_radius_m + self.boundary_variation_m
    }
}
