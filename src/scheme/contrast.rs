//! Readable text color for a primary.

use crate::color::Color;

/// Brightness multiplier applied to the inverse of a dark primary.
const DARK_BASE_BRIGHTNESS: f64 = 1.88;
/// Brightness multiplier applied to the inverse of a light primary.
const LIGHT_BASE_BRIGHTNESS: f64 = 0.16;
/// Text is always close to neutral.
const TEXT_SATURATION: f64 = 0.1;

/// Derive the text color for `base`: invert it, then push the inverse towards
/// light (dark base) or dark (light base) with a fixed low saturation.
pub fn generate_text_color(base: Color) -> Color {
    let brightness_mod = if base.is_dark() {
        DARK_BASE_BRIGHTNESS
    } else {
        LIGHT_BASE_BRIGHTNESS
    };

    let mut hsv = base.inverted().to_hsv();
    hsv.v = (hsv.v * brightness_mod).min(1.0);
    hsv.s = TEXT_SATURATION;
    hsv.to_color()
}
