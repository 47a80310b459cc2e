//! Top-level simulation config, loadable from TOML.

use std::path::Path;

use serde::Deserialize;

use super::{FeatureConfig, HarmonicLineParams, Palette, StringPhysics, SwarmPhysics, TrailConfig};
use crate::error::ConfigError;

/// Which motion model drives the output points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Particle swarm
    #[default]
    Swarm,

    /// Modal vibrating string
    String,

    /// Harmonic wave-line with smoothing filter
    Harmonic,
}

impl ModelKind {
    /// Parse a model name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "swarm" | "particles" => Some(Self::Swarm),
            "string" | "modal" => Some(Self::String),
            "harmonic" | "wave" => Some(Self::Harmonic),
            _ => None,
        }
    }
}

/// Complete configuration surface of the engine
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub model: ModelKind,
    pub audio: FeatureConfig,
    pub swarm: SwarmPhysics,
    pub string: StringPhysics,
    pub harmonic: HarmonicLineParams,
    pub trail: TrailConfig,
    pub palette: Palette,
}

impl SimulationConfig {
    /// Parse a config from TOML text; omitted tables and keys keep their defaults
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Clamp every group into its valid range
    pub fn sanitized(&self) -> Self {
        Self {
            model: self.model,
            audio: self.audio.sanitized(),
            swarm: self.swarm.sanitized(),
            string: self.string.sanitized(),
            harmonic: self.harmonic.sanitized(),
            trail: self.trail.sanitized(),
            palette: self.palette.sanitized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            model = "string"

            [string]
            tension = 2.5

            [trail]
            depth = 4
            falloff = "stepped"
        "#;
        let config = SimulationConfig::from_toml_str(text, Path::new("inline.toml")).unwrap();

        assert_eq!(config.model, ModelKind::String);
        assert_eq!(config.string.tension, 2.5);
        assert_eq!(config.string.num_points, StringPhysics::default().num_points);
        assert_eq!(config.trail.depth, 4);
        assert_eq!(config.swarm.particle_count, SwarmPhysics::default().particle_count);
    }

    #[test]
    fn test_band_ranges_parse_from_arrays() {
        let text = r#"
            [audio]
            split = "thirds"
            bass_range_hz = [30.0, 150.0]
        "#;
        let config = SimulationConfig::from_toml_str(text, Path::new("inline.toml")).unwrap();
        assert_eq!(config.audio.bass_range_hz, (30.0, 150.0));
        assert_eq!(config.audio.split, super::super::BandSplit::Thirds);
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = SimulationConfig::from_toml_str("model = 3", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[swarm]\nparticle_count = 12").unwrap();

        let config = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(config.swarm.particle_count, 12);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimulationConfig::load(Path::new("/nonexistent/sonoform.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_model_kind_parse() {
        assert_eq!(ModelKind::parse("Swarm"), Some(ModelKind::Swarm));
        assert_eq!(ModelKind::parse("modal"), Some(ModelKind::String));
        assert_eq!(ModelKind::parse("HARMONIC"), Some(ModelKind::Harmonic));
        assert_eq!(ModelKind::parse("ocean"), None);
    }
}
