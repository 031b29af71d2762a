//! Theme derivation: primaries, text colors and accent ladders.

pub mod contrast;
pub mod curve;
pub mod descriptor;
pub mod palette;

use std::fmt;

use crate::color::InvalidColorFormat;

pub use curve::PaletteStyle;
pub use descriptor::ThemeDescriptor;
pub use palette::{Selection, assemble};

/// Failures while turning extractor output into a descriptor.
#[derive(Debug)]
pub enum SchemeError {
    InvalidColor(InvalidColorFormat),
    /// Extractor output parsed, but lacks what selection needs.
    MissingColors(String),
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(e) => write!(f, "{e}"),
            Self::MissingColors(msg) => write!(f, "Extractor output lacks colors: {msg}"),
        }
    }
}

impl std::error::Error for SchemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidColor(e) => Some(e),
            Self::MissingColors(_) => None,
        }
    }
}

impl From<InvalidColorFormat> for SchemeError {
    fn from(e: InvalidColorFormat) -> Self {
        Self::InvalidColor(e)
    }
}
