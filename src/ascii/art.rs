//! The rendered text result.

use std::fmt;
use std::path::Path;

/// Error writing rendered art to disk.
#[derive(Debug, thiserror::Error)]
#[error("Failed to write '{}': {source}", .path.display())]
pub struct PersistError {
    pub path: std::path::PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Summary numbers for a rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtStats {
    /// Number of lines
    pub lines: usize,
    /// Glyphs per line
    pub width: usize,
    /// Total glyphs, newlines excluded
    pub characters: usize,
}

/// ASCII art as an ordered list of equal-length lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsciiArt {
    lines: Vec<String>,
}

impl AsciiArt {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Width in glyphs (not bytes; block glyphs are multi-byte).
    pub fn width(&self) -> usize {
        self.lines.first().map_or(0, |l| l.chars().count())
    }

    pub fn stats(&self) -> ArtStats {
        ArtStats {
            lines: self.height(),
            width: self.width(),
            characters: self.lines.iter().map(|l| l.chars().count()).sum(),
        }
    }

    /// Write the lines joined by `\n` as UTF-8, with no trailing newline.
    pub fn write_to(&self, path: &Path) -> Result<(), PersistError> {
        std::fs::write(path, self.to_string()).map_err(|source| PersistError {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for AsciiArt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}
