//! Modal string: standing-wave superposition driven by the audio bands.
//!
//! Stylized rather than physically exact. Each tick sums the first few
//! vibration modes of a pinned string, adds noise and direct audio forcing,
//! then integrates with a tension restoring force and edge-weighted damping.
//! Excitation is a function of the distance to the nearest end, so the
//! profile stays mirror-symmetric about the center.

use std::f32::consts::PI;

use crate::audio::AudioBands;
use crate::noise::NoiseGenerator;
use crate::params::StringPhysics;

/// Number of standing-wave modes summed per point
pub const MODE_COUNT: usize = 5;

/// Upper bound on `stiffness * dt` per step
const MAX_STIFFNESS_STEP: f32 = 0.5;

const MAX_DT_S: f32 = 0.1;

/// Vibrating string of `num_points` points spanning `length_m`, centered on x = 0
pub struct StringWave {
    physics: StringPhysics,
    noise: NoiseGenerator,
    /// Rest x-coordinate of each point
    rest_x: Vec<f32>,
    /// Distance to the nearest end as a fraction of the length, in `[0, 0.5]`
    mirrored: Vec<f32>,
    displacement: Vec<f32>,
    velocity: Vec<f32>,
    /// Quadratic in distance from the center: 0 at the middle, 1 at the ends
    edge_damping: Vec<f32>,
    positions: Vec<[f32; 3]>,
    time_s: f32,
    recoveries: u64,
}

impl StringWave {
    pub fn new(physics: StringPhysics) -> Self {
        let physics = physics.sanitized();
        let mut string = Self {
            noise: NoiseGenerator::new(physics.noise_seed),
            physics,
            rest_x: Vec::new(),
            mirrored: Vec::new(),
            displacement: Vec::new(),
            velocity: Vec::new(),
            edge_damping: Vec::new(),
            positions: Vec::new(),
            time_s: 0.0,
            recoveries: 0,
        };
        string.rebuild_points();
        string
    }

    pub fn physics(&self) -> &StringPhysics {
        &self.physics
    }

    /// Replace parameters; point buffers are only rebuilt when the point
    /// count or length changes.
    pub fn set_physics(&mut self, physics: StringPhysics) {
        let physics = physics.sanitized();
        let rebuild =
            physics.num_points != self.physics.num_points || physics.length_m != self.physics.length_m;
        if physics.noise_seed != self.physics.noise_seed {
            self.noise = NoiseGenerator::new(physics.noise_seed);
        }
        self.physics = physics;
        if rebuild {
            log::debug!("String rebuilt with {} points", self.physics.num_points);
            self.rebuild_points();
        }
    }

    fn rebuild_points(&mut self) {
        let n = self.physics.num_points;
        let length = self.physics.length_m;
        let last = (n - 1).max(1);

        self.rest_x = (0..n).map(|i| (i as f32 / last as f32 - 0.5) * length).collect();
        self.mirrored = (0..n)
            .map(|i| i.min(last.saturating_sub(i)) as f32 / last as f32)
            .collect();
        self.edge_damping = self
            .mirrored
            .iter()
            .map(|m| {
                let from_center = 1.0 - 2.0 * m;
                from_center * from_center
            })
            .collect();
        self.displacement = vec![0.0; n];
        self.velocity = vec![0.0; n];
        self.positions = self.rest_x.iter().map(|&x| [x, 0.0, 0.0]).collect();
    }

    pub fn num_points(&self) -> usize {
        self.displacement.len()
    }

    pub fn rest_x(&self) -> &[f32] {
        &self.rest_x
    }

    pub fn displacements(&self) -> &[f32] {
        &self.displacement
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocity
    }

    pub fn edge_damping(&self) -> &[f32] {
        &self.edge_damping
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn time_s(&self) -> f32 {
        self.time_s
    }

    pub fn recoveries(&self) -> u64 {
        self.recoveries
    }

    /// Sum of `0.5 * v²` over all points
    pub fn kinetic_energy(&self) -> f32 {
        self.velocity.iter().map(|v| 0.5 * v * v).sum()
    }

    /// Largest absolute displacement
    pub fn peak_displacement(&self) -> f32 {
        self.displacement.iter().fold(0.0f32, |m, y| m.max(y.abs()))
    }

    /// Advance one tick. Non-positive or non-finite `dt` is ignored.
    pub fn update(&mut self, audio: &AudioBands, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            log::debug!("Ignoring string tick with dt = {}", dt);
            return;
        }
        let dt = dt.min(MAX_DT_S);
        self.time_s += dt;

        let p = &self.physics;
        let audio = audio.sanitized();
        let total_amplitude = audio.weighted_mean(p.band_weights);
        let scaled_amplitude = total_amplitude * p.amplitude_scale;

        let length = p.length_m;
        let wave_speed = p.wave_speed();
        let time = self.time_s;

        // Per-mode weight and temporal phase are shared by all points
        let mut mode_weight = [0.0f32; MODE_COUNT];
        for (k, weight) in mode_weight.iter_mut().enumerate() {
            let n = (k + 1) as f32;
            let omega = n * PI * wave_speed / length;
            *weight = scaled_amplitude * (-n * 0.5).exp() * (omega * time).cos();
        }

        let excitation = p.excitability * (p.idle_excitation + total_amplitude.min(1.0));
        let w = p.band_weights;
        let drive = [
            p.audio_drive * audio.low * w[0],
            p.audio_drive * audio.mid * w[1],
            p.audio_drive * audio.high * w[2],
        ];

        let stiffness = 1.0 + p.tension / length;
        let stiffness_dt = (stiffness * dt).min(MAX_STIFFNESS_STEP);
        let decay = (-dt / p.decay_time_s).exp();
        let noise_t = (time * p.noise_time_scale) as f64;

        let last = self.displacement.len() - 1;
        let mut reset = 0usize;
        for i in 0..=last {
            // Pinned ends
            if i == 0 || i == last {
                self.displacement[i] = 0.0;
                self.velocity[i] = 0.0;
                continue;
            }

            // Odd modes are already symmetric; even modes are folded about the center
            let m = self.mirrored[i];
            let from_end = m * length;

            let mut modes = 0.0;
            for (k, weight) in mode_weight.iter().enumerate() {
                let n = (k + 1) as f32;
                modes += weight * (n * PI * m).sin();
            }

            let noise = if excitation > 0.0 {
                self.noise.sample_2d((from_end * p.noise_scale) as f64, noise_t) * excitation
            } else {
                0.0
            };

            // Low drives the fundamental, mid and high the next symmetric modes
            let audio_force = drive[0] * (PI * m).sin()
                + drive[1] * (3.0 * PI * m).sin()
                + drive[2] * (5.0 * PI * m).sin();

            let y = self.displacement[i];
            let forcing = modes + noise + audio_force;
            let mut v = self.velocity[i] + forcing * dt - y * stiffness_dt;

            let damping = (p.base_damping + self.edge_damping[i] * p.edge_damping_gain).clamp(0.0, 1.0);
            v *= 1.0 - damping;

            let mut y = (y + v) * decay;
            if !(y.is_finite() && v.is_finite()) {
                y = 0.0;
                v = 0.0;
                reset += 1;
            }
            self.displacement[i] = y;
            self.velocity[i] = v;
        }

        if reset > 0 {
            self.recoveries += reset as u64;
            log::warn!("Reset {} non-finite string point(s) at t={:.2}s", reset, time);
        }

        for (position, &y) in self.positions.iter_mut().zip(self.displacement.iter()) {
            position[1] = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics(n: usize) -> StringPhysics {
        StringPhysics {
            num_points: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_rest_layout() {
        let string = StringWave::new(physics(11));
        let x = string.rest_x();
        assert_eq!(x.len(), 11);
        assert!((x[0] + 5.0).abs() < 1e-5);
        assert!((x[10] - 5.0).abs() < 1e-5);
        assert!(x[5].abs() < 1e-5);
    }

    #[test]
    fn test_edge_damping_profile() {
        let string = StringWave::new(physics(101));
        let d = string.edge_damping();
        assert!((d[0] - 1.0).abs() < 1e-6);
        assert!((d[100] - 1.0).abs() < 1e-6);
        assert!(d[50].abs() < 1e-6);
        assert!(d[25] < d[10]);
    }

    #[test]
    fn test_profile_is_mirror_symmetric() {
        let mut string = StringWave::new(physics(100));
        let drive = AudioBands::new(0.5, 0.3, 0.2);
        for _ in 0..60 {
            string.update(&drive, 1.0 / 60.0);
        }
        let y = string.displacements();
        let peak = string.peak_displacement();
        assert!(peak > 0.0);
        for i in 0..50 {
            let mirror = 99 - i;
            assert!(
                (y[i] - y[mirror]).abs() <= peak * 1e-3,
                "y[{}]={} y[{}]={}",
                i,
                y[i],
                mirror,
                y[mirror]
            );
        }
    }

    #[test]
    fn test_ends_stay_pinned() {
        let mut string = StringWave::new(physics(50));
        let loud = AudioBands::new(2.0, 1.0, 1.0);
        for _ in 0..120 {
            string.update(&loud, 1.0 / 60.0);
        }
        let y = string.displacements();
        assert_eq!(y[0], 0.0);
        assert_eq!(y[49], 0.0);
        assert!(string.peak_displacement() > 0.0);
    }

    #[test]
    fn test_silence_stays_flat() {
        let mut string = StringWave::new(physics(64));
        for _ in 0..60 {
            string.update(&AudioBands::ZERO, 1.0 / 60.0);
        }
        assert_eq!(string.peak_displacement(), 0.0);
    }

    #[test]
    fn test_silence_relaxes_excited_line() {
        let mut string = StringWave::new(physics(64));
        let loud = AudioBands::new(1.0, 0.5, 0.5);
        for _ in 0..60 {
            string.update(&loud, 1.0 / 60.0);
        }
        let excited = string.peak_displacement();
        assert!(excited > 0.0);

        for _ in 0..600 {
            string.update(&AudioBands::ZERO, 1.0 / 60.0);
        }
        assert!(string.peak_displacement() < excited * 0.01);
    }

    #[test]
    fn test_extreme_parameters_stay_finite() {
        let mut string = StringWave::new(StringPhysics {
            tension: 1000.0,
            linear_density: 1e-4,
            amplitude_scale: 100.0,
            base_damping: 0.0,
            ..Default::default()
        });
        for _ in 0..300 {
            string.update(&AudioBands::new(10.0, 10.0, 10.0), 0.1);
        }
        assert!(string.positions_flat().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_set_physics_resizes() {
        let mut string = StringWave::new(physics(10));
        string.set_physics(physics(25));
        assert_eq!(string.num_points(), 25);
        assert_eq!(string.positions().len(), 25);
    }
}
