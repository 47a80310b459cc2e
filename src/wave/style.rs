//! Colour and line width as a pure function of the audio bands.

use crate::audio::AudioBands;
use crate::params::Palette;

/// Display attributes of a line for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: [f32; 3],
    pub line_width: f32,
    /// Mean band intensity clamped to `[0, 1]`
    pub intensity: f32,
}

/// Derive the line style from the current band energies.
///
/// Colour interpolates `min_color → max_color` by `sqrt(mean intensity)`;
/// width grows with the high band.
pub fn line_style(audio: &AudioBands, palette: &Palette) -> LineStyle {
    let audio = audio.sanitized();
    let intensity = audio.mean().clamp(0.0, 1.0);
    LineStyle {
        color: lerp_color(palette.min_color, palette.max_color, intensity.powf(0.5)),
        line_width: palette.base_line_width + audio.high.min(10.0) * palette.width_gain,
        intensity,
    }
}

/// Linear RGB interpolation, `t` clamped to `[0, 1]`
pub fn lerp_color(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_uses_min_color() {
        let palette = Palette::default();
        let style = line_style(&AudioBands::ZERO, &palette);
        assert_eq!(style.color, palette.min_color);
        assert_eq!(style.line_width, palette.base_line_width);
        assert_eq!(style.intensity, 0.0);
    }

    #[test]
    fn test_loud_saturates_at_max_color() {
        let palette = Palette::default();
        let style = line_style(&AudioBands::new(10.0, 10.0, 10.0), &palette);
        for (c, m) in style.color.iter().zip(palette.max_color.iter()) {
            assert!((c - m).abs() < 1e-6);
        }
        assert!(style.line_width > palette.base_line_width);
    }

    #[test]
    fn test_style_is_pure() {
        let palette = Palette::default();
        let bands = AudioBands::new(0.3, 0.2, 0.1);
        assert_eq!(line_style(&bands, &palette), line_style(&bands, &palette));
    }

    #[test]
    fn test_lerp_color_clamps() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 1.0, 1.0];
        assert_eq!(lerp_color(a, b, 2.0), b);
        assert_eq!(lerp_color(a, b, -1.0), a);
        assert_eq!(lerp_color(a, b, f32::NAN), a);
    }
}
