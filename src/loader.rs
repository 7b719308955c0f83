//! Reading and decoding source images.

use std::io;
use std::path::{Path, PathBuf};

use crate::raster::Raster;

/// Errors that can occur while loading a source image.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Image file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

/// The bytes are not an image this build can decode.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        DecodeError(err.to_string())
    }
}

/// Turns encoded image bytes into a raster.
pub trait Decoder: Send {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, DecodeError>;
}

/// Decoder backed by the `image` crate (JPEG, PNG, BMP, GIF, TIFF, ...).
///
/// The format is guessed from the content, not the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl Decoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, DecodeError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Raster::from_dynamic(image))
    }
}

/// Read and decode the image at `path`.
///
/// A missing file surfaces as [`LoadError::NotFound`] through the read error.
pub fn load_path(path: &Path, decoder: &dyn Decoder) -> Result<Raster, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    decoder.decode(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
