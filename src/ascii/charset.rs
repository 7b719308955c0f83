//! Glyph ramp definitions for ASCII rendering.

use std::fmt;
use std::str::FromStr;

/// Simple density ramp (10 levels).
/// Characters ordered from darkest (space) to brightest (@).
pub const SIMPLE_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Standard density ramp (13 levels).
pub const STANDARD_RAMP: &[char] = &[
    ' ', '.', ',', '-', ':', ';', 'i', '=', '+', '%', 'O', '#', '@',
];

/// Detailed density ramp (70 levels).
/// Fine gradations for large output widths.
#[rustfmt::skip]
pub const DETAILED_RAMP: &[char] = &[
    ' ', '.', '\'', '`', '^', '"', ',', ':', ';', 'I', 'l', '!', 'i', '>',
    '<', '~', '+', '_', '-', '?', ']', '[', '}', '{', '1', ')', '(', '|',
    '\\', '/', 't', 'f', 'j', 'r', 'x', 'n', 'u', 'v', 'c', 'z', 'X', 'Y',
    'U', 'J', 'C', 'L', 'Q', '0', 'O', 'Z', 'm', 'w', 'q', 'p', 'd', 'b',
    'k', 'h', 'a', 'o', '*', '#', 'M', 'W', '&', '8', '%', 'B', '@', '$',
];

/// Block character ramp (5 levels).
/// Uses Unicode shade characters, ordered from darkest (space) to brightest (full block).
pub const BLOCKS_RAMP: &[char] = &[' ', '░', '▒', '▓', '█'];

/// Named glyph ramp presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ramp {
    /// 10 levels, plain ASCII
    Simple,
    /// 13 levels, plain ASCII
    #[default]
    Standard,
    /// 70 levels for fine detail
    Detailed,
    /// 5 levels using Unicode shade blocks
    Blocks,
}

impl Ramp {
    /// Every preset, in display order.
    pub const ALL: [Ramp; 4] = [Ramp::Simple, Ramp::Standard, Ramp::Detailed, Ramp::Blocks];

    /// Get the glyph slice for this ramp, darkest first.
    pub fn chars(&self) -> &'static [char] {
        match self {
            Ramp::Simple => SIMPLE_RAMP,
            Ramp::Standard => STANDARD_RAMP,
            Ramp::Detailed => DETAILED_RAMP,
            Ramp::Blocks => BLOCKS_RAMP,
        }
    }

    /// Number of quantization levels.
    pub fn len(&self) -> usize {
        self.chars().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars().is_empty()
    }

    /// Get a human-readable name for the ramp.
    pub fn name(&self) -> &'static str {
        match self {
            Ramp::Simple => "simple",
            Ramp::Standard => "standard",
            Ramp::Detailed => "detailed",
            Ramp::Blocks => "blocks",
        }
    }

    /// One-line description shown by `ascii-generator ramps`.
    pub fn description(&self) -> &'static str {
        match self {
            Ramp::Simple => "Clean look with few characters, good for small widths",
            Ramp::Standard => "Balanced detail and readability",
            Ramp::Detailed => "Many gradations for large, detailed renderings",
            Ramp::Blocks => "Unicode shade blocks for a solid, pixel-like result",
        }
    }

    /// Resolve a ramp name, falling back to [`Ramp::Standard`] for unknown names.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown ramp '{}', using '{}'", name, Ramp::Standard);
            Ramp::Standard
        })
    }
}

impl fmt::Display for Ramp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown ramp name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ramp '{0}' (expected one of: simple, standard, detailed, blocks)")]
pub struct UnknownRamp(pub String);

impl FromStr for Ramp {
    type Err = UnknownRamp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Ramp::ALL
            .into_iter()
            .find(|ramp| ramp.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRamp(s.to_string()))
    }
}
