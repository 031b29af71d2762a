//! Color codec: hex <-> RGB <-> HSV, alpha-tagged strings and dark/light polarity.
//!
//! The canonical external form of a color is six uppercase hex digits without a
//! leading `#` (e.g. `3366CC`). Conversions back from floating point channels
//! truncate toward zero, which is what every `.dcol` descriptor in the wild was
//! produced with; changing that would shift accents by one step.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

/// Luminance threshold below which a color counts as dark.
const DARK_THRESHOLD: f64 = 0.5;

/// Immutable 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Normalized HSV triple; every component lives in `[0, 1]` (`h` in `[0, 1)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Theme polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Dark,
    Light,
}

/// Polarity as requested by the caller; `Auto` defers to the extracted colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModeRequest {
    #[default]
    Auto,
    Dark,
    Light,
}

impl ModeRequest {
    pub const fn explicit(self) -> Option<Mode> {
        match self {
            Self::Auto => None,
            Self::Dark => Some(Mode::Dark),
            Self::Light => Some(Mode::Light),
        }
    }
}

/// Malformed hex input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColorFormat(pub String);

impl fmt::Display for InvalidColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid color format '{}' (expected 6 hex digits)", self.0)
    }
}

impl std::error::Error for InvalidColorFormat {}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB` (either case).
    pub fn from_hex(input: &str) -> Result<Self, InvalidColorFormat> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let bytes = digits.as_bytes();
        if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_hexdigit) {
            return Err(InvalidColorFormat(input.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| InvalidColorFormat(input.to_string()))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Build from channels in `[0, 1]`. Out of range values are clamped, then
    /// scaled to `[0, 255]` and truncated.
    pub fn from_unit_rgb(r: f64, g: f64, b: f64) -> Self {
        let scale = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;
        Self::new(scale(r), scale(g), scale(b))
    }

    /// Six uppercase hex digits, no `#`.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// `rgba(r,g,b,alpha)` with alpha in its shortest decimal form.
    pub fn rgba(self, alpha: f64) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, alpha)
    }

    /// Channel-wise inverse.
    pub const fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    fn unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    /// Relative luminance (Rec. 709 weights on non-linearized channels).
    pub fn luminance(self) -> f64 {
        let (r, g, b) = self.unit();
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    pub fn is_dark(self) -> bool {
        Mode::of(self) == Mode::Dark
    }

    pub fn to_hsv(self) -> Hsv {
        let (r, g, b) = self.unit();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let v = max;
        if max == min {
            return Hsv { h: 0.0, s: 0.0, v };
        }

        let delta = max - min;
        let s = delta / max;
        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;
        let h = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        Hsv {
            h: (h / 6.0).rem_euclid(1.0),
            s,
            v,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Hsv {
    pub fn to_color(self) -> Color {
        let Self { h, s, v } = self;
        if s == 0.0 {
            return Color::from_unit_rgb(v, v, v);
        }

        let sextant = (h * 6.0).floor();
        let f = h * 6.0 - sextant;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        match (sextant as i64).rem_euclid(6) {
            0 => Color::from_unit_rgb(v, t, p),
            1 => Color::from_unit_rgb(q, v, p),
            2 => Color::from_unit_rgb(p, v, t),
            3 => Color::from_unit_rgb(p, q, v),
            4 => Color::from_unit_rgb(t, p, v),
            _ => Color::from_unit_rgb(v, p, q),
        }
    }
}

impl Mode {
    /// Classify a color by its relative luminance.
    pub fn of(color: Color) -> Self {
        Self::from_luminance(color.luminance())
    }

    /// Strictly below the threshold is dark; the threshold itself is light.
    pub fn from_luminance(luminance: f64) -> Self {
        if luminance < DARK_THRESHOLD {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
