//! Seeded noise fields for procedural perturbation.
//!
//! Using OpenSimplex noise for smooth, artifact-free fields. Each entity that
//! needs noise owns its own generator so that entities never share state.

use glam::Vec3;
use noise::{NoiseFn, OpenSimplex};

/// Offsets that decorrelate the three components of a vector sample
const AXIS_OFFSETS: [[f64; 3]; 3] = [
    [0.0, 0.0, 0.0],
    [31.416, -47.853, 12.734],
    [-19.191, 73.119, -58.527],
];

/// Noise generator owned by a single entity
#[derive(Clone)]
pub struct NoiseGenerator {
    simplex: OpenSimplex,
    seed: u32,
}

impl NoiseGenerator {
    /// Create new noise generator with seed
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: OpenSimplex::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample 2D simplex noise at position
    ///
    /// Returns value in range [-1, 1]
    pub fn sample_2d(&self, x: f64, y: f64) -> f32 {
        self.simplex.get([x, y]) as f32
    }

    /// Sample 3D simplex noise at position
    ///
    /// Returns value in range [-1, 1]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f32 {
        self.simplex.get([x, y, z]) as f32
    }

    /// Sample a vector-valued field: one decorrelated scalar sample per axis
    pub fn sample_vec3(&self, p: Vec3) -> Vec3 {
        let base = [p.x as f64, p.y as f64, p.z as f64];
        let axis = |o: [f64; 3]| self.sample_3d(base[0] + o[0], base[1] + o[1], base[2] + o[2]);
        Vec3::new(
            axis(AXIS_OFFSETS[0]),
            axis(AXIS_OFFSETS[1]),
            axis(AXIS_OFFSETS[2]),
        )
    }
}

impl std::fmt::Debug for NoiseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseGenerator")
            .field("seed", &self.seed)
            .finish()
    }
}
