//! Color helpers for the terminal user interface.

use ratatui::style::Color;

use crate::config::Theme;

/// Toast styles.
pub const TOAST_PENDING: Color = Color::Yellow;
pub const TOAST_SUCCESS: Color = Color::Green;
pub const TOAST_FAILURE: Color = Color::Red;

/// Tint for an entity hue, `hsl(hue, 80%, 60%)` on the color wheel. Entities
/// without a hue fall back to a theme-dependent neutral: white on a dark
/// theme, black on a light one.
pub fn tint_from_hue(hue: Option<f64>, theme: Theme) -> Color {
    match hue {
        Some(hue) => {
            let (r, g, b) = hsl_to_rgb(hue, 0.8, 0.6);
            Color::Rgb(r, g, b)
        }
        None => match theme {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        },
    }
}

/// Standard HSL to RGB conversion. Hue in degrees, saturation and lightness
/// in [0, 1].
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_zero_is_a_red_tint() {
        assert_eq!(tint_from_hue(Some(0.0), Theme::Dark), Color::Rgb(235, 71, 71));
    }

    #[test]
    fn test_hue_120_is_a_green_tint() {
        assert_eq!(tint_from_hue(Some(120.0), Theme::Dark), Color::Rgb(71, 235, 71));
    }

    #[test]
    fn test_missing_hue_falls_back_per_theme() {
        assert_eq!(tint_from_hue(None, Theme::Dark), Color::White);
        assert_eq!(tint_from_hue(None, Theme::Light), Color::Black);
    }
}
