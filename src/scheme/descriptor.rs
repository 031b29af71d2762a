//! `.dcol` theme descriptor.
//!
//! Output is shell-sourceable, one `key="value"` per line:
//!
//! ```text
//! dcol_mode="dark"
//! dcol_pry1="3366CC"
//! dcol_pry1_rgba="rgba(51,102,204,1)"
//! dcol_txt1="..."
//! dcol_txt1_rgba="..."
//! dcol_1xa1="..."
//! dcol_1xa1_rgba="..."
//! ...
//! ```
//!
//! Groups appear in ascending primary order, accents in curve order.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::color::{Color, Mode};

/// Number of primary groups in every descriptor.
pub const PRIMARY_COUNT: usize = 4;

const KEY_PREFIX: &str = "dcol_";

/// One primary with its text color and accent ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryGroup {
    pub primary: Color,
    pub text: Color,
    pub accents: Vec<Color>,
}

/// A named role in the descriptor (`pry1`, `txt1`, `1xa1`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub role: String,
    pub color: Color,
}

/// Complete palette for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDescriptor {
    pub mode: Mode,
    pub groups: [PrimaryGroup; PRIMARY_COUNT],
}

impl ThemeDescriptor {
    /// All color entries in output order.
    pub fn entries(&self) -> Vec<PaletteEntry> {
        let mut entries = Vec::new();
        for (i, group) in self.groups.iter().enumerate() {
            let i = i + 1;
            entries.push(PaletteEntry {
                role: format!("pry{i}"),
                color: group.primary,
            });
            entries.push(PaletteEntry {
                role: format!("txt{i}"),
                color: group.text,
            });
            for (j, accent) in group.accents.iter().enumerate() {
                entries.push(PaletteEntry {
                    role: format!("{i}xa{}", j + 1),
                    color: *accent,
                });
            }
        }
        entries
    }

    /// Descriptor lines, `dcol_mode` first, each color followed by its
    /// `_rgba` twin.
    pub fn lines(&self, alpha: f64) -> Vec<String> {
        let entries = self.entries();
        let mut lines = Vec::with_capacity(1 + entries.len() * 2);
        lines.push(format!("{KEY_PREFIX}mode=\"{}\"", self.mode));
        for entry in entries {
            lines.push(format!("{KEY_PREFIX}{}=\"{}\"", entry.role, entry.color));
            lines.push(format!(
                "{KEY_PREFIX}{}_rgba=\"{}\"",
                entry.role,
                entry.color.rgba(alpha)
            ));
        }
        lines
    }

    /// Full descriptor text with a trailing newline.
    pub fn render(&self, alpha: f64) -> String {
        let mut out = self.lines(alpha).join("\n");
        out.push('\n');
        out
    }
}

/// `<image>.dcol`, next to the image.
pub fn descriptor_path(image: &Path) -> PathBuf {
    let mut name = OsString::from(image.as_os_str());
    name.push(".dcol");
    PathBuf::from(name)
}

/// Write via a temp file and rename so readers never see a partial descriptor.
/// The temp file is removed if any step fails.
pub fn write_descriptor(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("dcol.tmp");
    let result = write_then_rename(&tmp_path, path, contents);
    if result.is_err() && tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path) {
            log::warn!("Could not remove {}: {e}", tmp_path.display());
        }
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, contents: &str) -> io::Result<()> {
    {
        let mut f = fs::File::create(tmp_path)?;
        f.write_all(contents.as_bytes())?;
        f.sync_all()?;
    }
    fs::rename(tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(seed: u8, accents: usize) -> PrimaryGroup {
        PrimaryGroup {
            primary: Color::new(seed, 0, 0),
            text: Color::new(0, seed, 0),
            accents: (0..accents).map(|j| Color::new(0, 0, j as u8)).collect(),
        }
    }

    fn descriptor(accents: usize) -> ThemeDescriptor {
        ThemeDescriptor {
            mode: Mode::Dark,
            groups: [1, 2, 3, 4].map(|s| group(s, accents)),
        }
    }

    #[test]
    fn line_count_and_order() {
        let lines = descriptor(9).lines(1.0);
        assert_eq!(lines.len(), 1 + PRIMARY_COUNT * (4 + 2 * 9));
        assert_eq!(lines[0], "dcol_mode=\"dark\"");
        assert_eq!(lines[1], "dcol_pry1=\"010000\"");
        assert_eq!(lines[2], "dcol_pry1_rgba=\"rgba(1,0,0,1)\"");
        assert_eq!(lines[3], "dcol_txt1=\"000100\"");
        assert_eq!(lines[4], "dcol_txt1_rgba=\"rgba(0,1,0,1)\"");
        assert_eq!(lines[5], "dcol_1xa1=\"000000\"");
        assert_eq!(lines[22], "dcol_1xa9_rgba=\"rgba(0,0,8,1)\"");
        assert_eq!(lines[23], "dcol_pry2=\"020000\"");
        assert_eq!(lines.last().unwrap(), "dcol_4xa9_rgba=\"rgba(0,0,8,1)\"");
    }

    #[test]
    fn render_small_descriptor() {
        let mut d = descriptor(1);
        d.mode = Mode::Light;
        let expected = "\
dcol_mode=\"light\"
dcol_pry1=\"010000\"
dcol_pry1_rgba=\"rgba(1,0,0,0.95)\"
dcol_txt1=\"000100\"
dcol_txt1_rgba=\"rgba(0,1,0,0.95)\"
dcol_1xa1=\"000000\"
dcol_1xa1_rgba=\"rgba(0,0,0,0.95)\"
";
        let rendered = d.render(0.95);
        assert!(rendered.starts_with(expected), "{rendered}");
        assert!(rendered.ends_with("dcol_4xa1_rgba=\"rgba(0,0,0,0.95)\"\n"));
    }

    #[test]
    fn every_hex_value_is_canonical() {
        for line in descriptor(9).lines(1.0).iter().skip(1) {
            if line.contains("_rgba=") {
                continue;
            }
            let value = line.split('"').nth(1).unwrap();
            assert_eq!(value.len(), 6, "{line}");
            assert!(
                value.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)),
                "{line}"
            );
        }
    }

    #[test]
    fn path_appends_suffix() {
        assert_eq!(
            descriptor_path(Path::new("/walls/forest.png")),
            PathBuf::from("/walls/forest.png.dcol")
        );
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // a directory at the target path makes the final rename fail
        let path = dir.path().join("wall.jpg.dcol");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(write_descriptor(&path, "dcol_mode=\"dark\"\n").is_err());
        assert!(!dir.path().join("wall.jpg.dcol.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.jpg.dcol");
        fs::write(&path, "stale").unwrap();

        write_descriptor(&path, "dcol_mode=\"dark\"\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "dcol_mode=\"dark\"\n");
        assert!(!dir.path().join("wall.jpg.dcol.tmp").exists());
    }
}
