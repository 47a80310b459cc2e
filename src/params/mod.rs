//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers are extracted here with:
//! - Physical units (meters, seconds, Hz, etc.)
//! - Documented ranges and meanings
//! - A `sanitized()` pass that clamps every field into its valid range

mod audio;
mod config;
mod render;
mod swarm;
mod trail;
mod wave;

// Re-export all types
pub use audio::{BandSplit, FeatureConfig};
pub use config::{ModelKind, SimulationConfig};
pub use render::RecordingConfig;
pub use swarm::SwarmPhysics;
pub use trail::{OpacityFalloff, Palette, TrailConfig};
pub use wave::{HarmonicLineParams, StringPhysics};

/// Clamp a float parameter into `[lo, hi]`, replacing non-finite input with `fallback`.
///
/// Logs at debug level whenever the value had to change.
pub(crate) fn clamp_param(name: &str, value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    let clamped = if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    };
    if clamped != value {
        log::debug!("{} = {} out of range [{}, {}], using {}", name, value, lo, hi, clamped);
    }
    clamped
}

/// Integer counterpart of [`clamp_param`]
pub(crate) fn clamp_count(name: &str, value: usize, lo: usize, hi: usize) -> usize {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::debug!("{} = {} out of range [{}, {}], using {}", name, value, lo, hi, clamped);
    }
    clamped
}

/// Clamp each RGB channel into `[0, 1]`
pub(crate) fn clamp_color(name: &str, rgb: [f32; 3], fallback: [f32; 3]) -> [f32; 3] {
    [
        clamp_param(name, rgb[0], 0.0, 1.0, fallback[0]),
        clamp_param(name, rgb[1], 0.0, 1.0, fallback[1]),
        clamp_param(name, rgb[2], 0.0, 1.0, fallback[2]),
    ]
}
