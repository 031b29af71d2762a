//! Color extraction collaborator.
//!
//! The engine never looks at pixels. An external tool (matugen by default)
//! turns the image into a set of named color roles; this module runs it,
//! waits for it, and parses its JSON output into a typed `ExtractorOutput`.
//!
//! The `ColorExtractor` trait is the seam: the CLI plugs in
//! `MatugenExtractor`, tests plug in fixtures and never spawn a process.
//!
//! Accepted role value shapes (all equivalent):
//! - `"#3366CC"`
//! - `{ "hex": "#3366CC" }`
//! - `{ "default": { "hex": "#3366CC" }, "dark": { .. }, "light": { .. } }`
//!
//! Tonal palettes and any other fields the tool emits are ignored.

use std::fmt;
use std::path::Path;
use std::process::Command;

use log::{debug, info};
use serde::Deserialize;

use crate::color::{Mode, ModeRequest};

/// Known color roles, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Secondary,
    Tertiary,
    Error,
    Background,
    SurfaceBright,
    Surface,
    Outline,
}

impl Role {
    /// Priority order used when picking primaries.
    pub const PRIORITY: [Self; 8] = [
        Self::Primary,
        Self::Secondary,
        Self::Tertiary,
        Self::Error,
        Self::Background,
        Self::SurfaceBright,
        Self::Surface,
        Self::Outline,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Error => "error",
            Self::Background => "background",
            Self::SurfaceBright => "surface_bright",
            Self::Surface => "surface",
            Self::Outline => "outline",
        }
    }
}

/// A single role value as emitted by the extractor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RoleValue {
    Hex(String),
    Tagged {
        hex: String,
    },
    Schemes {
        #[serde(default)]
        default: Option<Box<RoleValue>>,
        #[serde(default)]
        dark: Option<Box<RoleValue>>,
        #[serde(default)]
        light: Option<Box<RoleValue>>,
    },
}

impl RoleValue {
    /// Hex string for this role. Scheme maps prefer `default`, then the
    /// variant matching `mode`, then whatever is present.
    pub fn hex(&self, mode: Option<Mode>) -> Option<&str> {
        match self {
            Self::Hex(s) | Self::Tagged { hex: s } => Some(s.as_str()),
            Self::Schemes {
                default,
                dark,
                light,
            } => {
                let by_mode = match mode {
                    Some(Mode::Dark) => dark.as_deref(),
                    Some(Mode::Light) => light.as_deref(),
                    None => None,
                };
                [default.as_deref(), by_mode, dark.as_deref(), light.as_deref()]
                    .into_iter()
                    .flatten()
                    .find_map(|v| v.hex(mode))
            }
        }
    }
}

/// Named roles reported by the extractor. Every role is optional; selection
/// decides what to do with gaps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColorRoles {
    pub primary: Option<RoleValue>,
    pub secondary: Option<RoleValue>,
    pub tertiary: Option<RoleValue>,
    pub error: Option<RoleValue>,
    pub background: Option<RoleValue>,
    pub surface_bright: Option<RoleValue>,
    pub surface: Option<RoleValue>,
    pub outline: Option<RoleValue>,
    pub on_primary: Option<RoleValue>,
    pub on_secondary: Option<RoleValue>,
    pub on_tertiary: Option<RoleValue>,
    pub on_error: Option<RoleValue>,
}

impl ColorRoles {
    pub const fn get(&self, role: Role) -> Option<&RoleValue> {
        match role {
            Role::Primary => self.primary.as_ref(),
            Role::Secondary => self.secondary.as_ref(),
            Role::Tertiary => self.tertiary.as_ref(),
            Role::Error => self.error.as_ref(),
            Role::Background => self.background.as_ref(),
            Role::SurfaceBright => self.surface_bright.as_ref(),
            Role::Surface => self.surface.as_ref(),
            Role::Outline => self.outline.as_ref(),
        }
    }

    /// Every role the extractor reported, keyed by its JSON name.
    pub fn present(&self) -> impl Iterator<Item = (&'static str, &RoleValue)> {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("tertiary", &self.tertiary),
            ("error", &self.error),
            ("background", &self.background),
            ("surface_bright", &self.surface_bright),
            ("surface", &self.surface),
            ("outline", &self.outline),
            ("on_primary", &self.on_primary),
            ("on_secondary", &self.on_secondary),
            ("on_tertiary", &self.on_tertiary),
            ("on_error", &self.on_error),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v)))
    }

    /// Text ("on-") color the extractor supplied for `role`, if any.
    pub const fn on(&self, role: Role) -> Option<&RoleValue> {
        match role {
            Role::Primary => self.on_primary.as_ref(),
            Role::Secondary => self.on_secondary.as_ref(),
            Role::Tertiary => self.on_tertiary.as_ref(),
            Role::Error => self.on_error.as_ref(),
            _ => None,
        }
    }
}

/// Parsed extractor output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractorOutput {
    pub colors: ColorRoles,
    #[serde(default)]
    pub is_dark: Option<bool>,
    #[serde(default)]
    pub mode: Option<Mode>,
}

impl ExtractorOutput {
    /// The tool's own polarity verdict, if it reported one.
    pub fn reported_mode(&self) -> Option<Mode> {
        self.mode.or_else(|| {
            self.is_dark
                .map(|dark| if dark { Mode::Dark } else { Mode::Light })
        })
    }
}

/// Extraction failures.
#[derive(Debug)]
pub enum ExtractError {
    NotFound(String),
    Failed { status: i32, stderr: String },
    Io(std::io::Error),
    Malformed(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(program) => write!(f, "Unable to locate `{program}` in PATH"),
            Self::Failed { status, stderr } => {
                write!(f, "Extractor failed (exit code {status}): {}", stderr.trim())
            }
            Self::Io(e) => write!(f, "I/O error running extractor: {e}"),
            Self::Malformed(msg) => write!(f, "Malformed extractor output: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Anything that can turn an image into named color roles.
pub trait ColorExtractor {
    fn extract(&self, image: &Path, mode: ModeRequest) -> Result<ExtractorOutput, ExtractError>;
}

/// Runs `matugen image -o json <image> [--mode <mode>]` and parses stdout.
#[derive(Debug, Clone)]
pub struct MatugenExtractor {
    program: String,
}

impl MatugenExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, image: &Path, mode: ModeRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["image", "-o", "json"]).arg(image);
        if let Some(mode) = mode.explicit() {
            cmd.args(["--mode", mode.as_str()]);
        }
        cmd
    }
}

impl Default for MatugenExtractor {
    fn default() -> Self {
        Self::new("matugen")
    }
}

impl ColorExtractor for MatugenExtractor {
    fn extract(&self, image: &Path, mode: ModeRequest) -> Result<ExtractorOutput, ExtractError> {
        let mut cmd = self.command(image, mode);
        info!("Executing: {cmd:?}");

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::NotFound(self.program.clone())
            } else {
                ExtractError::Io(e)
            }
        })?;

        if !output.status.success() {
            let status = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(ExtractError::Failed { status, stderr });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ExtractError::Malformed(format!("output is not UTF-8: {e}")))?;
        debug!("Extractor produced {} bytes of output", stdout.len());
        parse_output(&stdout)
    }
}

/// Parse the extractor's JSON output.
///
/// A role that is present but carries no hex string (e.g. `{"rgb": ..}` or
/// `{"hex": 42}`) is rejected rather than treated as absent.
pub fn parse_output(raw: &str) -> Result<ExtractorOutput, ExtractError> {
    let output: ExtractorOutput =
        serde_json::from_str(raw).map_err(|e| ExtractError::Malformed(e.to_string()))?;

    if let Some((key, _)) = output
        .colors
        .present()
        .find(|(_, value)| value.hex(None).is_none())
    {
        return Err(ExtractError::Malformed(format!(
            "role `{key}` has no hex value"
        )));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_roles() {
        let out = parse_output(
            r##"{"colors": {"primary": "#3366CC", "secondary": "#CC3366", "background": "#101010"}}"##,
        )
        .unwrap();
        assert_eq!(out.colors.get(Role::Primary).unwrap().hex(None), Some("#3366CC"));
        assert_eq!(out.colors.get(Role::Background).unwrap().hex(None), Some("#101010"));
        assert!(out.colors.get(Role::Tertiary).is_none());
        assert_eq!(out.reported_mode(), None);
    }

    #[test]
    fn parses_matugen_scheme_objects() {
        let out = parse_output(
            r##"{
                "image": "/tmp/wall.png",
                "colors": {
                    "primary": {
                        "dark": {"hex": "#AAC7FF", "rgb": "rgb(170, 199, 255)"},
                        "default": {"hex": "#415F91", "rgb": "rgb(65, 95, 145)"},
                        "light": {"hex": "#415F91", "rgb": "rgb(65, 95, 145)"}
                    },
                    "on_primary": {"hex": "#FFFFFF"}
                },
                "palettes": {"primary": {"0": "#000000"}}
            }"##,
        )
        .unwrap();
        let primary = out.colors.get(Role::Primary).unwrap();
        assert_eq!(primary.hex(Some(Mode::Dark)), Some("#415F91"));
        assert_eq!(out.colors.on(Role::Primary).unwrap().hex(None), Some("#FFFFFF"));
    }

    #[test]
    fn scheme_without_default_uses_mode() {
        let value: RoleValue =
            serde_json::from_str(r##"{"dark": "#111111", "light": "#EEEEEE"}"##).unwrap();
        assert_eq!(value.hex(Some(Mode::Light)), Some("#EEEEEE"));
        assert_eq!(value.hex(Some(Mode::Dark)), Some("#111111"));
        assert_eq!(value.hex(None), Some("#111111"));
    }

    #[test]
    fn reported_mode_from_flags() {
        let out = parse_output(r#"{"colors": {}, "is_dark": false}"#).unwrap();
        assert_eq!(out.reported_mode(), Some(Mode::Light));

        let out = parse_output(r#"{"colors": {}, "mode": "dark", "is_dark": false}"#).unwrap();
        assert_eq!(out.reported_mode(), Some(Mode::Dark));
    }

    #[test]
    fn missing_colors_is_malformed() {
        let err = parse_output(r##"{"primary": "#3366CC"}"##).unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)), "{err}");
    }

    #[test]
    fn unreadable_role_shape_is_malformed() {
        let raw = r##"{"colors": {
            "primary": {"rgb": "rgb(51,102,204)"},
            "secondary": "#CC3366",
            "background": "#101010"
        }}"##;
        let err = parse_output(raw).unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)), "{err}");
        assert!(err.to_string().contains("primary"), "{err}");

        let err = parse_output(r##"{"colors": {"tertiary": {"hex": 42}}}"##).unwrap_err();
        assert!(err.to_string().contains("tertiary"), "{err}");

        let err = parse_output(r#"{"colors": {"on_error": {"default": {}}}}"#).unwrap_err();
        assert!(err.to_string().contains("on_error"), "{err}");
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(parse_output("not json"), Err(ExtractError::Malformed(_))));
        assert!(matches!(parse_output(""), Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn command_line_shape() {
        let extractor = MatugenExtractor::default();
        let cmd = extractor.command(Path::new("/tmp/wall.png"), ModeRequest::Light);
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "matugen");
        assert_eq!(args, ["image", "-o", "json", "/tmp/wall.png", "--mode", "light"]);

        let cmd = extractor.command(Path::new("/tmp/wall.png"), ModeRequest::Auto);
        assert_eq!(cmd.get_args().count(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_failed() {
        let extractor = MatugenExtractor::new("false");
        let err = extractor
            .extract(Path::new("/tmp/wall.png"), ModeRequest::Auto)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Failed { status: 1, .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn non_json_stdout_is_malformed() {
        // echo prints its arguments, which is not JSON
        let extractor = MatugenExtractor::new("echo");
        let err = extractor
            .extract(Path::new("/tmp/wall.png"), ModeRequest::Dark)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)), "{err}");
    }

    #[test]
    fn missing_program_is_not_found() {
        let extractor = MatugenExtractor::new("dcolgen-definitely-not-installed");
        let err = extractor
            .extract(Path::new("/tmp/wall.png"), ModeRequest::Auto)
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)), "{err}");
    }
}
