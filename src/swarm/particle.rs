//! A single swarm particle and its owned random sources.

use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::history::AudioHistory;
use crate::audio::AudioBands;
use crate::noise::NoiseGenerator;
use crate::params::SwarmPhysics;

/// Particle state; exclusively owned by the swarm
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Accumulated within a tick, cleared after integration
    pub acceleration: Vec3,
    pub mass: f32,
    pub base_speed: f32,
    pub energy: f32,
    /// Per-band response multipliers
    pub sensitivity: AudioBands,
    pub history: AudioHistory,
    rng: StdRng,
    noise: NoiseGenerator,
}

impl Particle {
    /// Create particle `index` of a swarm seeded with `swarm_seed`.
    ///
    /// The particle's generator depends only on `(swarm_seed, index)`, so
    /// resizing or reordering the pool never perturbs another particle.
    pub fn spawn(index: usize, swarm_seed: u64, physics: &SwarmPhysics, center: Vec3) -> Self {
        let mix = swarm_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = StdRng::seed_from_u64(mix);

        let spawn_radius = physics.boundary_radius_m * physics.spawn_radius_fraction;
        let position = center + random_in_unit_sphere(&mut rng) * spawn_radius;

        let (lo, hi) = physics.sensitivity_range;
        let mut sensitivity = || lo + rng.gen::<f32>() * (hi - lo);
        let sensitivity = AudioBands::new(sensitivity(), sensitivity(), sensitivity());

        let energy_span = physics.max_energy - physics.min_energy;
        let energy = physics.min_energy + rng.gen::<f32>() * 0.5 * energy_span;
        let noise = NoiseGenerator::new(rng.gen());

        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            mass: rng.gen_range(0.8f32..1.2),
            base_speed: physics.base_speed * rng.gen_range(0.5f32..1.5),
            energy,
            sensitivity,
            history: AudioHistory::new(),
            rng,
            noise,
        }
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn noise(&self) -> &NoiseGenerator {
        &self.noise
    }

    /// `0.5 * m * |v|²`
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Whether position, velocity and energy are all finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.energy.is_finite()
    }

    /// Carry spawn-time draws over to new physics.
    ///
    /// The per-particle speed factor and each sensitivity's position within
    /// its range are kept, so a retuned swarm matches a freshly spawned one.
    pub fn retune(&mut self, old: &SwarmPhysics, new: &SwarmPhysics) {
        self.base_speed = if old.base_speed > 0.0 {
            self.base_speed * (new.base_speed / old.base_speed)
        } else {
            new.base_speed
        };

        let (old_lo, old_hi) = old.sensitivity_range;
        let (lo, hi) = new.sensitivity_range;
        let old_span = old_hi - old_lo;
        let remap = |s: f32| {
            let t = if old_span > 0.0 {
                ((s - old_lo) / old_span).clamp(0.0, 1.0)
            } else {
                0.5
            };
            lo + t * (hi - lo)
        };
        self.sensitivity = AudioBands::new(
            remap(self.sensitivity.low),
            remap(self.sensitivity.mid),
            remap(self.sensitivity.high),
        );
    }

    /// Put the particle at `center` at rest
    pub fn reset_to(&mut self, center: Vec3, energy: f32) {
        self.position = center;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.energy = energy;
        self.history.clear();
    }
}

/// Uniform sample inside the unit ball
pub fn random_in_unit_sphere(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if v.length_squared() <= 1.0 {
            return v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_is_deterministic_per_index() {
        let physics = SwarmPhysics::default();
        let a = Particle::spawn(3, 42, &physics, Vec3::ZERO);
        let b = Particle::spawn(3, 42, &physics, Vec3::ZERO);
        let c = Particle::spawn(4, 42, &physics, Vec3::ZERO);

        assert_eq!(a.position, b.position);
        assert_eq!(a.noise().seed(), b.noise().seed());
        assert_ne!(a.position, c.position);
    }

    #[test]
    fn test_spawn_within_radius_and_ranges() {
        let physics = SwarmPhysics::default();
        let center = Vec3::new(1.0, -2.0, 3.0);
        for i in 0..100 {
            let p = Particle::spawn(i, 9, &physics, center);
            let limit = physics.boundary_radius_m * physics.spawn_radius_fraction;
            assert!(p.position.distance(center) <= limit + 1e-4);
            assert!(p.energy >= physics.min_energy && p.energy <= physics.max_energy);
            assert!(p.sensitivity.low >= physics.sensitivity_range.0);
            assert!(p.sensitivity.high <= physics.sensitivity_range.1);
            assert_eq!(p.velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_retune_matches_fresh_spawn() {
        let old = SwarmPhysics::default();
        let new = SwarmPhysics {
            base_speed: 3.0,
            sensitivity_range: (2.0, 4.0),
            ..Default::default()
        };
        let mut p = Particle::spawn(7, 11, &old, Vec3::ZERO);
        p.retune(&old, &new);
        let fresh = Particle::spawn(7, 11, &new, Vec3::ZERO);

        assert!((p.base_speed - fresh.base_speed).abs() < 1e-5);
        for (a, b) in p.sensitivity.as_array().iter().zip(fresh.sensitivity.as_array()) {
            assert!((a - b).abs() < 1e-5, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_reset_to_center() {
        let physics = SwarmPhysics::default();
        let mut p = Particle::spawn(0, 1, &physics, Vec3::ONE);
        p.position = Vec3::new(f32::NAN, 0.0, 0.0);
        p.velocity = Vec3::splat(f32::INFINITY);
        assert!(!p.is_finite());

        p.reset_to(Vec3::new(4.0, 0.0, -1.0), 0.0);
        assert!(p.is_finite());
        assert_eq!(p.position, Vec3::new(4.0, 0.0, -1.0));
        assert!(p.history.is_empty());
        assert_eq!(p.kinetic_energy(), 0.0);
    }
}
