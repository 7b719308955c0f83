//! ASCII renderer module for converting images to text.
//!
//! The stages run in a fixed order:
//!
//! 1. **Resizing** - Downsample to the character grid with aspect correction
//! 2. **Grayscale conversion** - RGB to luminance using BT.601
//! 3. **Glyph mapping** - Map brightness to characters of a [`Ramp`]
//!
//! # Ramps
//!
//! Four presets are available via [`Ramp`]:
//! - `Simple` - 10-level ASCII density ramp
//! - `Standard` - 13-level ASCII density ramp
//! - `Detailed` - 70-level ASCII density ramp
//! - `Blocks` - Unicode shade blocks

mod art;
mod charset;
mod dimensions;
mod grayscale;
mod mapping;
mod resize;

pub use art::{ArtStats, AsciiArt, PersistError};
pub use charset::{Ramp, UnknownRamp, BLOCKS_RAMP, DETAILED_RAMP, SIMPLE_RAMP, STANDARD_RAMP};
pub use dimensions::{calculate_dimensions, CHAR_ASPECT_CORRECTION};
pub use grayscale::{luma, to_grayscale};
pub use mapping::{glyph_index, map_to_chars, map_to_glyphs};
pub use resize::{resize, RESIZE_FILTER};
