//! One image in, one descriptor out.
//!
//! Steps:
//! 1. Check the image exists (before anything is spawned).
//! 2. Run the extractor and wait for it.
//! 3. Assemble the palette.
//! 4. Write `<image>.dcol` atomically, or hand the text back for stdout.
//!
//! Nothing is written unless every step succeeds.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::color::{InvalidColorFormat, ModeRequest};
use crate::extractor::{ColorExtractor, ExtractError};
use crate::scheme::descriptor::{descriptor_path, write_descriptor};
use crate::scheme::{PaletteStyle, SchemeError, Selection, ThemeDescriptor, assemble};

/// Where the descriptor goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// `<image>.dcol` next to the image.
    #[default]
    File,
    Stdout,
}

/// Everything needed for a single run.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub image: PathBuf,
    pub style: PaletteStyle,
    pub mode: ModeRequest,
    pub selection: Selection,
    pub alpha: f64,
    pub target: OutputTarget,
}

/// A successfully generated descriptor.
#[derive(Debug, Clone)]
pub struct Generated {
    pub descriptor: ThemeDescriptor,
    pub text: String,
    /// Set when the descriptor was written to disk.
    pub written_to: Option<PathBuf>,
}

/// Fatal run failures.
#[derive(Debug)]
pub enum RunError {
    MissingImage(PathBuf),
    InvalidColorFormat(InvalidColorFormat),
    ExtractorInvocationFailed(ExtractError),
    ExtractorOutputMalformed(String),
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingImage(p) => write!(f, "Image not found: {}", p.display()),
            Self::InvalidColorFormat(e) => write!(f, "{e}"),
            Self::ExtractorInvocationFailed(e) => write!(f, "{e}"),
            Self::ExtractorOutputMalformed(msg) => {
                write!(f, "Malformed extractor output: {msg}")
            }
            Self::Output { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidColorFormat(e) => Some(e),
            Self::ExtractorInvocationFailed(e) => Some(e),
            Self::Output { source, .. } => Some(source),
            Self::MissingImage(_) | Self::ExtractorOutputMalformed(_) => None,
        }
    }
}

impl From<ExtractError> for RunError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Malformed(msg) => Self::ExtractorOutputMalformed(msg),
            other => Self::ExtractorInvocationFailed(other),
        }
    }
}

impl From<SchemeError> for RunError {
    fn from(e: SchemeError) -> Self {
        match e {
            SchemeError::InvalidColor(c) => Self::InvalidColorFormat(c),
            SchemeError::MissingColors(msg) => Self::ExtractorOutputMalformed(msg),
        }
    }
}

/// Generate the descriptor for `params.image` using `extractor`.
pub fn generate(
    params: &GenerateParams,
    extractor: &dyn ColorExtractor,
) -> Result<Generated, RunError> {
    info!(
        "Generating {} palette for {} (mode: {:?}, selection: {:?})",
        params.style,
        params.image.display(),
        params.mode,
        params.selection
    );

    ensure_image(&params.image)?;

    let output = extractor.extract(&params.image, params.mode).map_err(|e| {
        error!("Extraction failed: {e}");
        RunError::from(e)
    })?;

    let descriptor = assemble(&output, params.style, params.mode, params.selection)?;
    let text = descriptor.render(params.alpha);

    let written_to = match params.target {
        OutputTarget::Stdout => None,
        OutputTarget::File => {
            let path = descriptor_path(&params.image);
            write_descriptor(&path, &text).map_err(|source| RunError::Output {
                path: path.clone(),
                source,
            })?;
            info!("Descriptor written to {}", path.display());
            Some(path)
        }
    };

    Ok(Generated {
        descriptor,
        text,
        written_to,
    })
}

fn ensure_image(image: &Path) -> Result<(), RunError> {
    if image.is_file() {
        Ok(())
    } else {
        Err(RunError::MissingImage(image.to_path_buf()))
    }
}
