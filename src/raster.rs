//! In-memory raster type shared by every pipeline stage.

use image::{DynamicImage, GrayImage, RgbImage};

/// Pixel layout of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single luminance channel (1 byte per pixel)
    Gray,
    /// RGB format (3 bytes per pixel)
    Rgb,
}

impl PixelFormat {
    /// Get the number of bytes per pixel.
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
        }
    }
}

/// An 8-bit image owned by the pipeline.
///
/// Stages never mutate a raster in place; each one returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Row-major pixel data, `width * height * channels` bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: PixelFormat,
}

impl Raster {
    /// Build a raster, returning `None` when the buffer length does not match
    /// the dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Option<Self> {
        let raster = Self {
            data,
            width,
            height,
            format,
        };
        raster.is_consistent().then_some(raster)
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels()
    }

    /// Whether the buffer length matches the dimensions and format.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.expected_len()
    }

    /// A raster filled with a single RGB color.
    pub fn filled_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgb.iter().copied().cycle().take(pixels * 3).collect();
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgb,
        }
    }

    /// A single-channel raster filled with one luminance value.
    pub fn filled_gray(width: u32, height: u32, luma: u8) -> Self {
        Self {
            data: vec![luma; width as usize * height as usize],
            width,
            height,
            format: PixelFormat::Gray,
        }
    }

    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// Iterate over rows as byte slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let stride = (self.width as usize * self.channels()).max(1);
        self.data.chunks_exact(stride)
    }

    /// Normalize a decoded image into a gray or RGB raster.
    ///
    /// Alpha is dropped, 16-bit and float samples are reduced to 8 bits, and
    /// anything that is not already luminance-only becomes RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::from_gray(gray),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => Self::from_gray(image.to_luma8()),
            other => Self::from_rgb(other.to_rgb8()),
        }
    }

    pub fn from_rgb(rgb: RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        Self {
            data: rgb.into_raw(),
            width,
            height,
            format: PixelFormat::Rgb,
        }
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self {
            data: gray.into_raw(),
            width,
            height,
            format: PixelFormat::Gray,
        }
    }

    /// Convert into an `image` crate buffer for resampling or encoding.
    pub fn to_dynamic(&self) -> DynamicImage {
        let image = match self.format {
            PixelFormat::Gray => GrayImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageLuma8),
            PixelFormat::Rgb => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgb8),
        };
        // Fields are public, so a hand-built raster may have a short buffer
        image.unwrap_or_else(|| {
            log::warn!(
                "Raster buffer holds {} bytes, expected {} for {}x{} {:?}; using a blank image",
                self.data.len(),
                self.expected_len(),
                self.width,
                self.height,
                self.format
            );
            DynamicImage::new_rgb8(self.width, self.height)
        })
    }
}
