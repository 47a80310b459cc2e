//! Motion trail: fixed-depth history of point-array snapshots.
//!
//! Slot 0 holds the most recent snapshot. Every push moves each snapshot one
//! slot older and copies the live points into slot 0. Slot buffers are
//! allocated once and recycled, so steady-state pushes never allocate.

use crate::params::{OpacityFalloff, TrailConfig};
use crate::wave::LineStyle;

pub struct TrailBuffer {
    config: TrailConfig,
    slots: Vec<Vec<[f32; 3]>>,
    /// Fixed per slot, decreasing with age
    opacities: Vec<f32>,
    style: Option<LineStyle>,
}

impl TrailBuffer {
    /// Create a trail whose slots all start as copies of `initial`
    pub fn new(config: TrailConfig, initial: &[[f32; 3]]) -> Self {
        let config = config.sanitized();
        let depth = config.depth;
        Self {
            opacities: slot_opacities(&config),
            slots: vec![initial.to_vec(); depth],
            config,
            style: None,
        }
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Number of slots
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Points per slot
    pub fn point_count(&self) -> usize {
        self.slots.first().map_or(0, Vec::len)
    }

    pub fn slots(&self) -> &[Vec<[f32; 3]>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&[[f32; 3]]> {
        self.slots.get(index).map(Vec::as_slice)
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    /// Colour shared by all slots, refreshed each tick from the live line
    pub fn style(&self) -> Option<LineStyle> {
        self.style
    }

    pub fn refresh_style(&mut self, style: LineStyle) {
        self.style = Some(style);
    }

    /// Shift every snapshot one slot older and copy `live` into slot 0.
    ///
    /// A change in point count refills every slot with `live`.
    pub fn push(&mut self, live: &[[f32; 3]]) {
        if self.slots.is_empty() {
            return;
        }
        if self.point_count() != live.len() {
            self.reset(live);
            return;
        }
        self.slots.rotate_right(1);
        self.slots[0].copy_from_slice(live);
    }

    /// Refill every slot with `points`
    pub fn reset(&mut self, points: &[[f32; 3]]) {
        for slot in &mut self.slots {
            slot.clear();
            slot.extend_from_slice(points);
        }
    }

    /// Apply a new configuration; slots are rebuilt from slot 0 when the
    /// depth changes.
    pub fn set_config(&mut self, config: TrailConfig) {
        let config = config.sanitized();
        if config.depth != self.slots.len() {
            let seed = self.slots.first().cloned().unwrap_or_default();
            self.slots = vec![seed; config.depth];
        }
        self.opacities = slot_opacities(&config);
        self.config = config;
    }
}

/// `base * (1 - i/k)` for linear falloff, `base * (1 - (i+1)/(k+1))` for stepped
fn slot_opacities(config: &TrailConfig) -> Vec<f32> {
    let k = config.depth as f32;
    (0..config.depth)
        .map(|i| {
            let i = i as f32;
            let fade = match config.falloff {
                OpacityFalloff::Linear => 1.0 - i / k,
                OpacityFalloff::Stepped => 1.0 - (i + 1.0) / (k + 1.0),
            };
            config.base_opacity * fade
        })
        .collect()
}
