//! Per-frame orchestration: features, active model, trail.
//!
//! One call to [`FrameEngine::tick`] per display frame. The engine extracts
//! the audio bands, advances the active motion model, pushes the live points
//! into the trail and hands everything back as a borrowed [`FrameOutput`].

use crate::audio::{AudioBands, FeatureExtractor};
use crate::model::{ActiveModel, MotionModel};
use crate::params::{ModelKind, SimulationConfig};
use crate::trail::TrailBuffer;
use crate::wave::{line_style, LineStyle};

/// Everything the renderer needs for one frame
pub struct FrameOutput<'a> {
    pub bands: AudioBands,
    /// Live points, `[x, y, z]` per entity
    pub positions: &'a [[f32; 3]],
    /// Per-entity colours (swarm only)
    pub colors: Option<&'a [[f32; 3]]>,
    pub style: LineStyle,
    pub trail: &'a TrailBuffer,
}

impl FrameOutput<'_> {
    /// Positions as a flat `3×N` float buffer
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(self.positions)
    }
}

pub struct FrameEngine {
    config: SimulationConfig,
    extractor: FeatureExtractor,
    model: ActiveModel,
    trail: TrailBuffer,
    bands: AudioBands,
    style: LineStyle,
    time_s: f32,
    frame_index: u64,
}

impl FrameEngine {
    pub fn new(config: SimulationConfig) -> Self {
        let config = config.sanitized();
        let model = ActiveModel::from_config(config.model, &config);
        let trail = TrailBuffer::new(config.trail.clone(), model.positions());
        let style = line_style(&AudioBands::ZERO, &config.palette);
        log::info!(
            "Frame engine ready: {:?} model, {} points, trail depth {}",
            config.model,
            model.positions().len(),
            trail.depth()
        );

        Self {
            extractor: FeatureExtractor::new(config.audio.clone()),
            model,
            trail,
            bands: AudioBands::ZERO,
            style,
            time_s: 0.0,
            frame_index: 0,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn model(&self) -> &ActiveModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ActiveModel {
        &mut self.model
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn bands(&self) -> AudioBands {
        self.bands
    }

    pub fn time_s(&self) -> f32 {
        self.time_s
    }

    /// Number of ticks actually simulated
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Advance one frame from a byte spectrum snapshot.
    ///
    /// `None` means audio is unavailable; the extractor then decays toward
    /// silence and the models keep their idle motion.
    pub fn tick(&mut self, spectrum: Option<&[u8]>, dt: f32) -> FrameOutput<'_> {
        if !valid_dt(dt) {
            log::debug!("Skipping frame with dt = {}", dt);
            return self.output();
        }
        let bands = match spectrum {
            Some(bytes) => self.extractor.extract(bytes),
            None => self.extractor.silence(),
        };
        self.tick_with_bands(bands, dt)
    }

    /// Advance one frame from already extracted band energies
    pub fn tick_with_bands(&mut self, bands: AudioBands, dt: f32) -> FrameOutput<'_> {
        if !valid_dt(dt) {
            log::debug!("Skipping frame with dt = {}", dt);
            return self.output();
        }
        self.bands = bands.sanitized();
        self.model.update(&self.bands, dt);

        self.style = line_style(&self.bands, &self.config.palette);
        self.trail.push(self.model.positions());
        self.trail.refresh_style(self.style);

        self.time_s += dt;
        self.frame_index += 1;
        self.output()
    }

    /// Current frame without advancing
    pub fn output(&self) -> FrameOutput<'_> {
        FrameOutput {
            bands: self.bands,
            positions: self.model.positions(),
            colors: self.model.colors(),
            style: self.style,
            trail: &self.trail,
        }
    }

    /// Swap the active model. The new model starts fresh and the trail is
    /// refilled with its initial points.
    pub fn set_model(&mut self, kind: ModelKind) {
        if kind == self.model.kind() {
            return;
        }
        log::debug!("Switching model {:?} -> {:?}", self.model.kind(), kind);
        self.config.model = kind;
        self.model = ActiveModel::from_config(kind, &self.config);
        self.trail.reset(self.model.positions());
    }

    /// Apply a new configuration to the running engine.
    ///
    /// Parameters flow into the live model; a different model kind switches
    /// models.
    pub fn set_config(&mut self, config: SimulationConfig) {
        let config = config.sanitized();
        let kind = config.model;
        self.extractor.set_config(config.audio.clone());
        self.trail.set_config(config.trail.clone());
        self.config = config;

        if kind == self.model.kind() {
            self.model.reconfigure(&self.config);
            if self.model.positions().len() != self.trail.point_count() {
                self.trail.reset(self.model.positions());
            }
        } else {
            self.set_model(kind);
        }
    }
}

fn valid_dt(dt: f32) -> bool {
    dt > 0.0 && dt.is_finite()
}
