//! ascii-generator library crate.
//!
//! Converts raster images into ASCII art: load, optional background removal,
//! resize, grayscale, glyph mapping. [`AsciiGenerator`] runs the whole
//! pipeline; the [`ascii`] module exposes the individual stages.

pub mod ascii;
pub mod config;
pub mod loader;
pub mod pipeline;
pub mod raster;
pub mod segment;

pub use ascii::{AsciiArt, Ramp};
pub use loader::LoadError;
pub use pipeline::{AsciiGenerator, ConversionRequest, ProgressSink, Step};
pub use raster::{PixelFormat, Raster};
