//! Line-shaped motion models: the modal string and the harmonic wave line.

mod harmonic;
mod modal;
mod style;

// Re-export public types
pub use harmonic::{HarmonicLine, HARMONICS};
pub use modal::{StringWave, MODE_COUNT};
pub use style::{lerp_color, line_style, LineStyle};
