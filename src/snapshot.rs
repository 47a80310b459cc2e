//! Headless PNG rasteriser for recorded frames.
//!
//! Orthographic front view (x right, y up; z ignored). Trail slots are drawn
//! oldest first with their opacity, then the live points on top.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::SnapshotError;
use crate::frame::FrameOutput;
use crate::model::ActiveModel;
use crate::params::RecordingConfig;

const BACKGROUND: [u8; 3] = [8, 8, 14];

/// How points are joined on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    /// Independent dots (particle swarm)
    Points,
    /// Consecutive points joined by segments (string and wave line)
    Polyline,
}

impl Stroke {
    pub fn for_model(model: &ActiveModel) -> Self {
        match model {
            ActiveModel::Swarm(_) => Stroke::Points,
            ActiveModel::String(_) | ActiveModel::Harmonic(_) => Stroke::Polyline,
        }
    }
}

/// Maps world coordinates onto pixels
struct Viewport {
    width: u32,
    height: u32,
    scale: f32,
}

impl Viewport {
    fn new(config: &RecordingConfig) -> Self {
        let half = (config.width.min(config.height) as f32) * 0.5;
        Self {
            width: config.width,
            height: config.height,
            scale: half / config.view_extent_m.max(1e-3),
        }
    }

    fn project(&self, p: [f32; 3]) -> (f32, f32) {
        (
            self.width as f32 * 0.5 + p[0] * self.scale,
            self.height as f32 * 0.5 - p[1] * self.scale,
        )
    }
}

/// Rasterise one frame
pub fn render_frame(frame: &FrameOutput<'_>, stroke: Stroke, config: &RecordingConfig) -> RgbImage {
    let view = Viewport::new(config);
    let mut img = RgbImage::from_pixel(config.width, config.height, Rgb(BACKGROUND));

    let trail_color = frame.trail.style().unwrap_or(frame.style).color;
    let slots = frame.trail.slots().iter().zip(frame.trail.opacities());
    // Slot 0 duplicates the live points; skip it
    for (slot, &opacity) in slots.skip(1).rev() {
        draw(&mut img, &view, slot, stroke, |_| trail_color, opacity * 0.6);
    }

    let live = frame.style.color;
    match frame.colors {
        Some(colors) => draw(&mut img, &view, frame.positions, stroke, |i| colors[i], 1.0),
        None => draw(&mut img, &view, frame.positions, stroke, |_| live, 1.0),
    }
    img
}

/// Rasterise and save one frame as PNG
pub fn save_frame(
    frame: &FrameOutput<'_>,
    stroke: Stroke,
    config: &RecordingConfig,
    path: &Path,
) -> Result<(), SnapshotError> {
    let img = render_frame(frame, stroke, config);
    img.save(path).map_err(|source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Create the frames directory for a recording
pub fn prepare_output(config: &RecordingConfig) -> Result<(), SnapshotError> {
    let dir = config.frames_dir();
    std::fs::create_dir_all(&dir).map_err(|source| SnapshotError::CreateDir { path: dir, source })
}

fn draw(
    img: &mut RgbImage,
    view: &Viewport,
    points: &[[f32; 3]],
    stroke: Stroke,
    color_of: impl Fn(usize) -> [f32; 3],
    alpha: f32,
) {
    match stroke {
        Stroke::Points => {
            for (i, &p) in points.iter().enumerate() {
                let (x, y) = view.project(p);
                blend(img, x, y, color_of(i), alpha);
            }
        }
        Stroke::Polyline => {
            for (i, pair) in points.windows(2).enumerate() {
                let (x0, y0) = view.project(pair[0]);
                let (x1, y1) = view.project(pair[1]);
                let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().clamp(1.0, 4096.0) as usize;
                for s in 0..=steps {
                    let t = s as f32 / steps as f32;
                    blend(img, x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, color_of(i), alpha);
                }
            }
        }
    }
}

/// Alpha-blend a colour into the pixel under `(x, y)`; off-screen is ignored
fn blend(img: &mut RgbImage, x: f32, y: f32, color: [f32; 3], alpha: f32) {
    if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
        return;
    }
    let (px, py) = (x as u32, y as u32);
    if px >= img.width() || py >= img.height() {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let pixel = img.get_pixel_mut(px, py);
    for (channel, &c) in pixel.0.iter_mut().zip(color.iter()) {
        let src = c.clamp(0.0, 1.0) * 255.0;
        let dst = *channel as f32;
        *channel = (dst + (src - dst) * alpha).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameEngine;
    use crate::params::{ModelKind, SimulationConfig, SwarmPhysics};

    fn recording(dir: &Path) -> RecordingConfig {
        RecordingConfig {
            width: 64,
            height: 48,
            ..RecordingConfig::new(dir)
        }
    }

    #[test]
    fn test_polyline_draws_pixels() {
        let engine = FrameEngine::new(SimulationConfig {
            model: ModelKind::String,
            ..Default::default()
        });
        let config = recording(Path::new("unused"));
        let img = render_frame(&engine.output(), Stroke::Polyline, &config);
        assert_eq!(img.dimensions(), (64, 48));
        let lit = img.pixels().filter(|p| p.0 != BACKGROUND).count();
        assert!(lit > 0, "flat string should draw a horizontal line");
    }

    #[test]
    fn test_save_frame_writes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = recording(dir.path());
        prepare_output(&config).expect("create frames dir");

        let mut engine = FrameEngine::new(SimulationConfig {
            swarm: SwarmPhysics {
                particle_count: 20,
                ..Default::default()
            },
            ..Default::default()
        });
        let stroke = Stroke::for_model(engine.model());
        let path = config.frame_path(0);
        let frame = engine.tick(None, 1.0 / 60.0);
        save_frame(&frame, stroke, &config, &path).expect("save frame");

        let loaded = image::open(&path).expect("open png");
        assert_eq!(loaded.width(), 64);
        assert_eq!(loaded.height(), 48);
    }

    #[test]
    fn test_blend_ignores_offscreen() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb(BACKGROUND));
        blend(&mut img, -1.0, 2.0, [1.0, 1.0, 1.0], 1.0);
        blend(&mut img, 9.0, 2.0, [1.0, 1.0, 1.0], 1.0);
        blend(&mut img, f32::NAN, 2.0, [1.0, 1.0, 1.0], 1.0);
        assert!(img.pixels().all(|p| p.0 == BACKGROUND));

        blend(&mut img, 1.5, 1.5, [1.0, 1.0, 1.0], 1.0);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255]);
    }
}
