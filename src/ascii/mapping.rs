//! Brightness to glyph mapping.

use super::art::AsciiArt;
use super::charset::Ramp;
use crate::raster::Raster;

/// Map a luminance value to an index into a ramp of `levels` glyphs.
///
/// Linear scaling: `floor(v * (levels - 1) / 255)`, clamped to the ramp.
/// Low-contrast images only touch a narrow slice of the ramp; no histogram
/// equalization is applied.
#[inline]
pub fn glyph_index(luminance: u8, levels: usize) -> usize {
    if levels == 0 {
        return 0;
    }
    let idx = (luminance as usize * (levels - 1)) / 255;
    idx.min(levels - 1)
}

/// Map brightness values to glyphs.
///
/// Lower brightness maps to earlier glyphs, higher brightness to later ones.
/// An empty charset yields spaces.
///
/// # Example
/// ```ignore
/// let chars = map_to_chars(&[0, 127, 255], SIMPLE_RAMP);
/// // chars[0] = ' ' (darkest)
/// // chars[2] = '@' (brightest)
/// ```
pub fn map_to_chars(brightness: &[u8], charset: &[char]) -> Vec<char> {
    if charset.is_empty() {
        return vec![' '; brightness.len()];
    }

    brightness
        .iter()
        .map(|&b| charset[glyph_index(b, charset.len())])
        .collect()
}

/// Convert a grayscale raster into one text line per row.
///
/// Rows keep their top-to-bottom order; each line has `raster.width` glyphs.
/// Multi-channel input is read as its first channel, so callers should run
/// [`to_grayscale`](super::to_grayscale) first.
pub fn map_to_glyphs(raster: &Raster, ramp: Ramp) -> AsciiArt {
    let charset = ramp.chars();
    let channels = raster.channels();

    let lines: Vec<String> = raster
        .rows()
        .take(raster.height as usize)
        .map(|row| {
            let brightness: Vec<u8> = row.iter().step_by(channels).copied().collect();
            map_to_chars(&brightness, charset).into_iter().collect()
        })
        .collect();

    log::debug!("Mapped {} lines with the '{}' ramp", lines.len(), ramp);
    AsciiArt::new(lines)
}
