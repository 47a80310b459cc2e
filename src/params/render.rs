//! Headless recording configuration.

use std::path::PathBuf;

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Output directory for frames
    pub output_dir: PathBuf,

    /// Write one PNG every `frame_stride` ticks
    pub frame_stride: usize,

    /// Frame width (pixels)
    pub width: u32,

    /// Frame height (pixels)
    pub height: u32,

    /// Half-extent of the world region mapped onto the frame (meters)
    pub view_extent_m: f32,
}

impl RecordingConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            frame_stride: 1,
            width: 640,
            height: 360,
            view_extent_m: 6.0,
        }
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Path of the PNG written for `frame_index`
    pub fn frame_path(&self, frame_index: usize) -> PathBuf {
        self.frames_dir().join(format!("frame_{:06}.png", frame_index))
    }

    /// Whether `frame_index` falls on the recording stride
    pub fn should_capture(&self, frame_index: usize) -> bool {
        frame_index % self.frame_stride.max(1) == 0
    }
}
