//! Trail and colour configuration.

use serde::Deserialize;

use super::{clamp_color, clamp_count, clamp_param};

/// How slot opacity falls off with slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpacityFalloff {
    /// `base * (1 - i / k)`
    #[default]
    Linear,

    /// `base * (1 - (i + 1) / (k + 1))`, so even slot 0 is dimmer than the live line
    Stepped,
}

/// Motion trail configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Number of prior snapshots kept (0 disables the trail)
    pub depth: usize,

    /// Opacity of the most recent snapshot
    pub base_opacity: f32,

    /// Opacity falloff across slots
    pub falloff: OpacityFalloff,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            depth: 8,
            base_opacity: 0.6,
            falloff: OpacityFalloff::Linear,
        }
    }
}

impl TrailConfig {
    /// Clamp every field into its valid range
    pub fn sanitized(&self) -> Self {
        Self {
            depth: clamp_count("trail depth", self.depth, 0, 64),
            base_opacity: clamp_param("base_opacity", self.base_opacity, 0.0, 1.0, 0.6),
            falloff: self.falloff,
        }
    }
}

/// Colour range and line width mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Colour at zero intensity (linear RGB)
    pub min_color: [f32; 3],

    /// Colour at full intensity (linear RGB)
    pub max_color: [f32; 3],

    /// Line width with no high-band energy
    pub base_line_width: f32,

    /// Formula: line_width = base_line_width + high * width_gain
    pub width_gain: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            min_color: [0.10, 0.25, 0.65],
            max_color: [1.00, 0.35, 0.55],
            base_line_width: 1.0,
            width_gain: 0.3,
        }
    }
}

impl Palette {
    /// Clamp every field into its valid range
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            min_color: clamp_color("min_color", self.min_color, d.min_color),
            max_color: clamp_color("max_color", self.max_color, d.max_color),
            base_line_width: clamp_param("base_line_width", self.base_line_width, 0.1, 50.0, d.base_line_width),
            width_gain: clamp_param("width_gain", self.width_gain, 0.0, 50.0, d.width_gain),
        }
    }
}
