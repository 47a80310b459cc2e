//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{ModelKind, RecordingConfig, SimulationConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sonoform")]
#[command(about = "Headless audio-reactive particle and string simulation", long_about = None)]
pub struct Args {
    /// Motion model: swarm (default), string, harmonic
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// WAV file to drive the simulation (synthetic test signal if omitted)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// TOML config file; missing keys keep their defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write PNG frames into DIR/frames
    #[arg(long, value_name = "DIR")]
    pub record: Option<PathBuf>,

    /// Simulated duration (seconds); defaults to the clip length
    #[arg(long, value_name = "SECONDS")]
    pub seconds: Option<f32>,

    /// Simulation ticks per second
    #[arg(long, value_name = "FPS", default_value = "60")]
    pub fps: u32,

    /// Record every Nth tick
    #[arg(long, value_name = "N", default_value = "2")]
    pub frame_stride: usize,

    /// Override the swarm particle count
    #[arg(long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// Override the trail depth
    #[arg(long, value_name = "SLOTS")]
    pub trail_depth: Option<usize>,
}

impl Args {
    /// Resolve the motion model, falling back to `fallback` on unknown names
    pub fn parse_model(&self, fallback: ModelKind) -> ModelKind {
        let Some(name) = &self.model else {
            return fallback;
        };
        match ModelKind::parse(name) {
            Some(kind) => {
                log::info!("Model: {:?}", kind);
                kind
            }
            None => {
                log::warn!("Unknown model '{}', using {:?}", name, fallback);
                fallback
            }
        }
    }

    /// Load the config file (if any) and apply command-line overrides.
    ///
    /// An unreadable config file is not fatal: defaults are used instead.
    pub fn simulation_config(&self) -> SimulationConfig {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path).unwrap_or_else(|e| {
                log::warn!("{}; using default config", e);
                SimulationConfig::default()
            }),
            None => SimulationConfig::default(),
        };

        config.model = self.parse_model(config.model);
        if let Some(count) = self.particles {
            config.swarm.particle_count = count;
        }
        if let Some(depth) = self.trail_depth {
            config.trail.depth = depth;
        }
        config.sanitized()
    }

    /// Simulation step (seconds)
    pub fn dt(&self) -> f32 {
        1.0 / self.fps.clamp(1, 1000) as f32
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.as_ref().map(|dir| RecordingConfig {
            frame_stride: self.frame_stride.max(1),
            ..RecordingConfig::new(dir)
        })
    }
}
