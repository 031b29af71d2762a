//! Accent curves and the accent generator.
//!
//! A curve is an ordered list of `(brightness%, saturation%)` control points.
//! Every accent of a primary keeps the primary's hue and takes brightness and
//! saturation straight from one control point. The four named tables below are
//! consumed by other tooling through the generated keys, so their values must
//! not drift.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

use crate::color::{Color, Hsv, Mode};

/// One `(brightness%, saturation%)` control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CurvePoint {
    pub brightness: u8,
    pub saturation: u8,
}

impl CurvePoint {
    pub const fn new(brightness: u8, saturation: u8) -> Self {
        Self {
            brightness,
            saturation,
        }
    }
}

/// Ordered control points of a named style.
pub type Curve = [CurvePoint];

const fn p(brightness: u8, saturation: u8) -> CurvePoint {
    CurvePoint::new(brightness, saturation)
}

static DEFAULT: [CurvePoint; 9] = [
    p(32, 50),
    p(42, 46),
    p(49, 40),
    p(56, 39),
    p(64, 38),
    p(76, 37),
    p(90, 33),
    p(94, 29),
    p(100, 20),
];

static VIBRANT: [CurvePoint; 9] = [
    p(18, 99),
    p(32, 97),
    p(48, 95),
    p(55, 90),
    p(70, 80),
    p(80, 70),
    p(88, 60),
    p(94, 40),
    p(99, 24),
];

static PASTEL: [CurvePoint; 9] = [
    p(10, 99),
    p(17, 66),
    p(24, 49),
    p(39, 41),
    p(51, 37),
    p(58, 34),
    p(72, 30),
    p(84, 26),
    p(99, 22),
];

static NEUTRAL: [CurvePoint; 9] = [
    p(10, 0),
    p(17, 0),
    p(24, 0),
    p(39, 0),
    p(51, 0),
    p(58, 0),
    p(72, 0),
    p(84, 0),
    p(99, 0),
];

/// Named accent style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaletteStyle {
    #[default]
    Default,
    Vibrant,
    Pastel,
    Neutral,
}

impl PaletteStyle {
    pub fn curve(self) -> &'static Curve {
        match self {
            Self::Default => &DEFAULT,
            Self::Vibrant => &VIBRANT,
            Self::Pastel => &PASTEL,
            Self::Neutral => &NEUTRAL,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Vibrant => "vibrant",
            Self::Pastel => "pastel",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for PaletteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate one accent per curve point from the hue of `base`.
///
/// Dark themes walk the curve from dim to bright, light themes from bright to
/// dim, so accent 1 always sits closest to the background tone.
pub fn generate_accents(base: Color, curve: &Curve, mode: Mode) -> Vec<Color> {
    let h = base.to_hsv().h;

    let mut points = curve.to_vec();
    points.sort();
    if mode == Mode::Light {
        points.reverse();
    }

    points
        .into_iter()
        .map(|point| {
            Hsv {
                h,
                s: f64::from(point.saturation) / 100.0,
                v: f64::from(point.brightness) / 100.0,
            }
            .to_color()
        })
        .collect()
}
