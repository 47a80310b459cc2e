//! Particle swarm simulator: per-tick forces, integration and containment.

use glam::Vec3;
use rand::Rng;

use super::particle::{random_in_unit_sphere, Particle};
use crate::audio::AudioBands;
use crate::params::{Palette, SwarmPhysics};
use crate::wave::lerp_color;

/// Longest step the integrator accepts; longer frame gaps are split off
const MAX_DT_S: f32 = 0.1;

/// Swarm of independently seeded particles around a moving center
pub struct ParticleSwarm {
    physics: SwarmPhysics,
    palette: Palette,
    particles: Vec<Particle>,
    /// Live output, one entry per particle
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    center: Vec3,
    time_s: f32,
    recoveries: u64,
}

impl ParticleSwarm {
    /// Create a swarm centered on the origin
    pub fn new(physics: SwarmPhysics, palette: Palette) -> Self {
        let physics = physics.sanitized();
        let particles = (0..physics.particle_count)
            .map(|i| Particle::spawn(i, physics.seed, &physics, Vec3::ZERO))
            .collect::<Vec<_>>();

        let mut swarm = Self {
            positions: vec![[0.0; 3]; particles.len()],
            colors: vec![[0.0; 3]; particles.len()],
            physics,
            palette: palette.sanitized(),
            particles,
            center: Vec3::ZERO,
            time_s: 0.0,
            recoveries: 0,
        };
        swarm.write_outputs();
        swarm
    }

    pub fn physics(&self) -> &SwarmPhysics {
        &self.physics
    }

    /// Replace physics parameters at runtime.
    ///
    /// Changing the seed respawns every particle; changing the count keeps
    /// existing particles and spawns or drops the tail. Survivors take on the
    /// new base speed and sensitivity range.
    pub fn set_physics(&mut self, physics: SwarmPhysics) {
        let physics = physics.sanitized();
        if physics.seed != self.physics.seed {
            self.particles.clear();
        }
        for particle in &mut self.particles {
            particle.retune(&self.physics, &physics);
        }
        let count = physics.particle_count;
        if count < self.particles.len() {
            self.particles.truncate(count);
        } else {
            let start = self.particles.len();
            self.particles
                .extend((start..count).map(|i| Particle::spawn(i, physics.seed, &physics, self.center)));
        }
        self.positions.resize(count, [0.0; 3]);
        self.colors.resize(count, [0.0; 3]);
        log::debug!("Swarm reconfigured: {} particles", count);

        self.physics = physics;
        self.write_outputs();
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette.sanitized();
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Center used by the fixed-signature tick
    pub fn set_center(&mut self, center: Vec3) {
        if center.is_finite() {
            self.center = center;
        }
    }

    /// Accumulated simulation time (seconds)
    pub fn time_s(&self) -> f32 {
        self.time_s
    }

    /// Total number of non-finite resets since creation
    pub fn recoveries(&self) -> u64 {
        self.recoveries
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Positions as a flat `3×N` float buffer
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Per-particle colour derived from energy
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Sum of particle kinetic energies
    pub fn total_kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Advance every particle one tick.
    ///
    /// # Arguments
    /// * `audio` - Current band energies
    /// * `center` - Swarm center for this tick
    /// * `time_s` - Absolute simulation time in seconds
    /// * `dt` - Step in seconds; non-positive or non-finite steps are ignored
    pub fn update_around(&mut self, audio: &AudioBands, center: Vec3, time_s: f32, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            log::debug!("Ignoring swarm tick with dt = {}", dt);
            return;
        }
        let dt = dt.min(MAX_DT_S);
        let audio = audio.sanitized();
        let center = if center.is_finite() { center } else { self.center };
        let time_s = if time_s.is_finite() { time_s } else { self.time_s };
        self.center = center;
        self.time_s = time_s;

        let mut reset = 0usize;
        for particle in &mut self.particles {
            if advance_particle(particle, &self.physics, audio, center, time_s, dt) {
                reset += 1;
            }
        }
        if reset > 0 {
            self.recoveries += reset as u64;
            log::warn!(
                "Reset {} non-finite particle(s) at t={:.2}s",
                reset,
                time_s
            );
        }

        self.write_outputs();
    }

    fn write_outputs(&mut self) {
        let span = self.physics.max_energy - self.physics.min_energy;
        for ((particle, position), color) in self
            .particles
            .iter()
            .zip(self.positions.iter_mut())
            .zip(self.colors.iter_mut())
        {
            *position = particle.position.to_array();
            let t = (particle.energy - self.physics.min_energy) / span;
            *color = lerp_color(self.palette.min_color, self.palette.max_color, t);
        }
    }
}

/// One tick of one particle. Returns `true` when a non-finite state was reset.
fn advance_particle(
    p: &mut Particle,
    physics: &SwarmPhysics,
    audio: AudioBands,
    center: Vec3,
    time_s: f32,
    dt: f32,
) -> bool {
    let audio_level = audio.mean();

    // Energy: audio charges, time drains
    p.energy += (audio_level * physics.energy_rate - physics.energy_decay) * dt;
    p.energy = p.energy.clamp(physics.min_energy, physics.max_energy);

    let audio_force = audio_force(p, physics, audio, center, time_s);
    let center_force = center_force(p, physics, center, dt);
    p.velocity += (audio_force + center_force) * dt;

    // Noise dominates when quiet and fades as audio rises
    let quiet = (1.0 - audio_level).max(0.0);
    let noise_strength = physics.noise_strength * quiet.powf(physics.noise_exponent) * p.energy;
    if noise_strength > 0.0 {
        let at = p.position * physics.noise_scale + Vec3::splat(time_s * physics.noise_time_scale);
        p.acceleration += p.noise().sample_vec3(at) * noise_strength;
    }

    // Vertical travelling wave
    let drive = (1.0 + audio_level * physics.wave_audio_gain) * p.energy;
    let amplitude = physics.wave_amplitude * drive;
    let frequency = physics.wave_frequency * drive;
    p.acceleration.y +=
        (time_s * frequency + p.position.x * physics.wave_spatial_frequency).sin() * amplitude;

    p.velocity += p.acceleration * dt;
    p.acceleration = Vec3::ZERO;

    p.position += p.velocity * dt;

    enforce_boundary(p, physics, center);

    if !p.is_finite() {
        p.reset_to(center, physics.min_energy);
        return true;
    }
    false
}

/// Oscillatory per-axis force from the averaged audio history, plus the bass explosion
fn audio_force(
    p: &mut Particle,
    physics: &SwarmPhysics,
    audio: AudioBands,
    center: Vec3,
    time_s: f32,
) -> Vec3 {
    p.history.push(audio);
    let avg = p.history.average();

    let radius = physics.boundary_radius_m;
    let w = physics.band_weights;
    let force_low = avg.low * p.sensitivity.low * radius * w[0];
    let force_mid = avg.mid * p.sensitivity.mid * radius * w[1];
    let force_high = avg.high * p.sensitivity.high * radius * w[2];

    let f = physics.oscillation_freqs;
    let mut force = Vec3::new(
        (time_s * f[0] + p.position.x).sin() * force_low,
        (time_s * f[1] + p.position.y).cos() * force_mid,
        (time_s * f[2] + p.position.z).sin() * force_high,
    );

    if avg.low > physics.bass_threshold {
        let magnitude = force_low * physics.explosion_gain * (avg.low - physics.bass_threshold);
        let outward = (p.position - center).normalize_or_zero();
        let rng = p.rng_mut();
        let jitter = random_in_unit_sphere(rng) * physics.explosion_jitter;
        let mut direction = (outward + jitter).normalize_or_zero();
        if direction == Vec3::ZERO {
            // Sitting exactly on the center: pick any direction
            direction = random_in_unit_sphere(rng).normalize_or_zero();
        }
        let spread = random_in_unit_sphere(rng);
        force += direction * magnitude + spread * magnitude;
    }

    force
}

/// Energy-gated pull toward the center, or settling deceleration when at rest
fn center_force(p: &Particle, physics: &SwarmPhysics, center: Vec3, dt: f32) -> Vec3 {
    let rest = physics.rest_threshold;
    if p.energy > rest {
        let to_center = center - p.position;
        let distance = to_center.length();
        let reach = (distance / physics.max_extent_m()) * (p.energy - rest);
        let speed = p.base_speed * reach * reach;
        to_center.normalize_or_zero() * speed
    } else {
        let deficit = (rest - p.energy) / rest;
        // Never remove more than the current velocity in one step
        let rate = (physics.settle_rate * deficit).min(1.0 / dt);
        -p.velocity * rate
    }
}

/// Clamp to the (randomly slackened) boundary sphere and reflect off it
fn enforce_boundary(p: &mut Particle, physics: &SwarmPhysics, center: Vec3) {
    let slack = if physics.boundary_variation_m > 0.0 {
        p.rng_mut().gen_range(0.0..physics.boundary_variation_m)
    } else {
        0.0
    };
    let limit = physics.boundary_radius_m + slack;

    let offset = p.position - center;
    let distance = offset.length();
    if distance > limit {
        let normal = offset / distance;
        p.position = center + normal * limit;

        let outward = p.velocity.dot(normal);
        if outward > 0.0 {
            p.velocity -= normal * (2.0 * outward);
        }
        p.velocity *= physics.restitution;
        p.energy = (p.energy * physics.impact_energy_loss).clamp(physics.min_energy, physics.max_energy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_swarm(count: usize) -> ParticleSwarm {
        ParticleSwarm::new(
            SwarmPhysics {
                particle_count: count,
                ..Default::default()
            },
            Palette::default(),
        )
    }

    #[test]
    fn test_swarm_creation() {
        let swarm = small_swarm(64);
        assert_eq!(swarm.particles().len(), 64);
        assert_eq!(swarm.positions().len(), 64);
        assert_eq!(swarm.positions_flat().len(), 64 * 3);
        assert_eq!(swarm.colors().len(), 64);
    }

    #[test]
    fn test_energy_rises_with_audio_and_stays_bounded() {
        let mut swarm = small_swarm(16);
        let loud = AudioBands::new(4.0, 4.0, 4.0);
        for i in 0..600 {
            swarm.update_around(&loud, Vec3::ZERO, i as f32 / 60.0, 1.0 / 60.0);
            for p in swarm.particles() {
                assert!(p.energy >= swarm.physics().min_energy);
                assert!(p.energy <= swarm.physics().max_energy);
            }
        }
    }

    #[test]
    fn test_boundary_clamp_reflects_and_drains_energy() {
        let physics = SwarmPhysics::default();
        let mut p = Particle::spawn(0, 5, &physics, Vec3::ZERO);
        p.position = Vec3::new(physics.boundary_radius_m * 3.0, 0.0, 0.0);
        p.velocity = Vec3::new(2.0, 0.0, 0.0);
        p.energy = 0.8;

        enforce_boundary(&mut p, &physics, Vec3::ZERO);

        assert!(p.position.length() <= physics.max_extent_m() + 1e-4);
        assert!(p.velocity.x < 0.0, "velocity should point back inward");
        assert!((p.velocity.x + 2.0 * physics.restitution).abs() < 1e-5);
        assert!((p.energy - 0.8 * physics.impact_energy_loss).abs() < 1e-6);
    }

    #[test]
    fn test_inward_velocity_is_not_flipped() {
        let physics = SwarmPhysics {
            boundary_variation_m: 0.0,
            ..Default::default()
        };
        let mut p = Particle::spawn(0, 5, &physics, Vec3::ZERO);
        p.position = Vec3::new(physics.boundary_radius_m + 1.0, 0.0, 0.0);
        p.velocity = Vec3::new(-1.0, 0.0, 0.0);

        enforce_boundary(&mut p, &physics, Vec3::ZERO);
        assert!((p.position.x - physics.boundary_radius_m).abs() < 1e-5);
        assert!(p.velocity.x < 0.0);
    }

    #[test]
    fn test_settling_decelerates() {
        let physics = SwarmPhysics::default();
        let mut p = Particle::spawn(0, 5, &physics, Vec3::ZERO);
        p.energy = physics.min_energy;
        p.velocity = Vec3::new(1.0, 0.0, 0.0);

        let force = center_force(&p, &physics, Vec3::ZERO, 1.0 / 60.0);
        assert!(force.x < 0.0);
        assert!(force.dot(p.velocity) < 0.0);
    }

    #[test]
    fn test_energetic_particle_is_pulled_in() {
        let physics = SwarmPhysics::default();
        let mut p = Particle::spawn(0, 5, &physics, Vec3::ZERO);
        p.energy = physics.max_energy;
        p.position = Vec3::new(4.0, 0.0, 0.0);

        let force = center_force(&p, &physics, Vec3::ZERO, 1.0 / 60.0);
        assert!(force.x < 0.0);
        assert!(force.y.abs() < 1e-6 && force.z.abs() < 1e-6);
    }

    #[test]
    fn test_bass_explosion_pushes_outward() {
        let physics = SwarmPhysics {
            explosion_jitter: 0.0,
            ..Default::default()
        };
        let mut quiet = Particle::spawn(0, 5, &physics, Vec3::ZERO);
        quiet.position = Vec3::new(2.0, 0.0, 0.0);
        let mut loud = quiet.clone();

        let below = audio_force(&mut quiet, &physics, AudioBands::new(0.5, 0.0, 0.0), Vec3::ZERO, 0.0);
        let above = audio_force(&mut loud, &physics, AudioBands::new(8.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert!(above.length() > below.length());
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut swarm = small_swarm(4);
        let before = swarm.positions().to_vec();
        swarm.update_around(&AudioBands::ZERO, Vec3::ZERO, 0.0, 0.0);
        swarm.update_around(&AudioBands::ZERO, Vec3::ZERO, 0.0, -1.0);
        swarm.update_around(&AudioBands::ZERO, Vec3::ZERO, 0.0, f32::NAN);
        assert_eq!(swarm.positions(), &before[..]);
    }

    #[test]
    fn test_non_finite_state_is_recovered() {
        let mut swarm = small_swarm(4);
        swarm.particles_mut()[2].velocity = Vec3::new(f32::INFINITY, 0.0, 0.0);
        swarm.update_around(&AudioBands::ZERO, Vec3::ZERO, 0.0, 1.0 / 60.0);

        assert_eq!(swarm.recoveries(), 1);
        assert_eq!(swarm.particles()[2].position, Vec3::ZERO);
        assert_eq!(swarm.particles()[2].velocity, Vec3::ZERO);
        assert!(swarm.positions_flat().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_non_finite_particle_resets_to_offset_center() {
        let mut swarm = small_swarm(2);
        let physics = swarm.physics().clone();
        let center = Vec3::new(100.0, 0.0, 0.0);
        swarm.particles_mut()[0].velocity = Vec3::splat(f32::NAN);

        swarm.update_around(&AudioBands::ZERO, center, 0.1, 1.0 / 60.0);

        assert_eq!(swarm.recoveries(), 1);
        let distance = swarm.particles()[0].position.distance(center);
        assert!(distance <= physics.max_extent_m(), "distance {}", distance);
        assert_eq!(swarm.positions()[0], center.to_array());
    }

    #[test]
    fn test_set_physics_resizes_without_touching_survivors() {
        let mut swarm = small_swarm(8);
        let first = swarm.particles()[0].position;

        swarm.set_physics(SwarmPhysics {
            particle_count: 12,
            ..Default::default()
        });
        assert_eq!(swarm.particles().len(), 12);
        assert_eq!(swarm.positions().len(), 12);
        assert_eq!(swarm.particles()[0].position, first);

        swarm.set_physics(SwarmPhysics {
            particle_count: 3,
            ..Default::default()
        });
        assert_eq!(swarm.colors().len(), 3);
    }

    #[test]
    fn test_set_physics_retunes_survivors() {
        let mut swarm = small_swarm(6);
        let speeds: Vec<f32> = swarm.particles().iter().map(|p| p.base_speed).collect();

        swarm.set_physics(SwarmPhysics {
            particle_count: 6,
            base_speed: 2.0,
            sensitivity_range: (3.0, 3.5),
            ..Default::default()
        });

        for (p, before) in swarm.particles().iter().zip(&speeds) {
            assert!((p.base_speed - before * 2.0).abs() < 1e-5);
            for s in p.sensitivity.as_array() {
                assert!((3.0..=3.5).contains(&s), "sensitivity {}", s);
            }
        }
    }
}
