//! Interchangeable motion models behind a single update interface.

use glam::Vec3;

use crate::audio::AudioBands;
use crate::params::{ModelKind, SimulationConfig};
use crate::swarm::ParticleSwarm;
use crate::wave::{HarmonicLine, StringWave};

/// A simulation that turns one audio frame and a time step into points
pub trait MotionModel {
    /// Advance one tick
    fn update(&mut self, audio: &AudioBands, dt: f32);

    /// Live points, one `[x, y, z]` per entity
    fn positions(&self) -> &[[f32; 3]];

    /// Per-entity colours, if the model has them
    fn colors(&self) -> Option<&[[f32; 3]]> {
        None
    }

    /// Number of non-finite resets so far
    fn recoveries(&self) -> u64;
}

impl MotionModel for ParticleSwarm {
    fn update(&mut self, audio: &AudioBands, dt: f32) {
        let time_s = self.time_s() + dt;
        self.update_around(audio, self.center(), time_s, dt);
    }

    fn positions(&self) -> &[[f32; 3]] {
        ParticleSwarm::positions(self)
    }

    fn colors(&self) -> Option<&[[f32; 3]]> {
        Some(ParticleSwarm::colors(self))
    }

    fn recoveries(&self) -> u64 {
        ParticleSwarm::recoveries(self)
    }
}

impl MotionModel for StringWave {
    fn update(&mut self, audio: &AudioBands, dt: f32) {
        StringWave::update(self, audio, dt);
    }

    fn positions(&self) -> &[[f32; 3]] {
        StringWave::positions(self)
    }

    fn recoveries(&self) -> u64 {
        StringWave::recoveries(self)
    }
}

impl MotionModel for HarmonicLine {
    fn update(&mut self, audio: &AudioBands, dt: f32) {
        HarmonicLine::update(self, audio, dt);
    }

    fn positions(&self) -> &[[f32; 3]] {
        HarmonicLine::positions(self)
    }

    fn recoveries(&self) -> u64 {
        HarmonicLine::recoveries(self)
    }
}

/// The one model a frame engine drives
pub enum ActiveModel {
    Swarm(ParticleSwarm),
    String(StringWave),
    Harmonic(HarmonicLine),
}

impl ActiveModel {
    /// Build the model named by `kind` from its config group
    pub fn from_config(kind: ModelKind, config: &SimulationConfig) -> Self {
        match kind {
            ModelKind::Swarm => {
                ActiveModel::Swarm(ParticleSwarm::new(config.swarm.clone(), config.palette.clone()))
            }
            ModelKind::String => ActiveModel::String(StringWave::new(config.string.clone())),
            ModelKind::Harmonic => ActiveModel::Harmonic(HarmonicLine::new(config.harmonic.clone())),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ActiveModel::Swarm(_) => ModelKind::Swarm,
            ActiveModel::String(_) => ModelKind::String,
            ActiveModel::Harmonic(_) => ModelKind::Harmonic,
        }
    }

    /// Push new parameters into the running model without rebuilding it
    pub fn reconfigure(&mut self, config: &SimulationConfig) {
        match self {
            ActiveModel::Swarm(swarm) => {
                swarm.set_physics(config.swarm.clone());
                swarm.set_palette(config.palette.clone());
            }
            ActiveModel::String(string) => string.set_physics(config.string.clone()),
            ActiveModel::Harmonic(line) => line.set_params(config.harmonic.clone()),
        }
    }

    /// Move the swarm center; lines ignore it
    pub fn set_center(&mut self, center: Vec3) {
        if let ActiveModel::Swarm(swarm) = self {
            swarm.set_center(center);
        }
    }

    fn inner(&self) -> &dyn MotionModel {
        match self {
            ActiveModel::Swarm(m) => m,
            ActiveModel::String(m) => m,
            ActiveModel::Harmonic(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn MotionModel {
        match self {
            ActiveModel::Swarm(m) => m,
            ActiveModel::String(m) => m,
            ActiveModel::Harmonic(m) => m,
        }
    }
}

impl MotionModel for ActiveModel {
    fn update(&mut self, audio: &AudioBands, dt: f32) {
        self.inner_mut().update(audio, dt);
    }

    fn positions(&self) -> &[[f32; 3]] {
        self.inner().positions()
    }

    fn colors(&self) -> Option<&[[f32; 3]]> {
        self.inner().colors()
    }

    fn recoveries(&self) -> u64 {
        self.inner().recoveries()
    }
}
