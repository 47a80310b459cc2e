//! Audio-reactive particle swarm.

mod history;
mod particle;
mod system;

// Re-export public types
pub use history::{AudioHistory, HISTORY_CAPACITY};
pub use particle::Particle;
pub use system::ParticleSwarm;
