//! Compositing segmented images onto a solid backdrop.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use super::{FalSegmenter, SegmentError, Segmenter};
use crate::config::SegmentationConfig;
use crate::raster::Raster;

/// Composite an RGBA image over opaque black and drop the alpha channel.
///
/// Each channel becomes `round(c * a / 255)`.
pub fn composite_on_black(rgba: &RgbaImage) -> Raster {
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);

    for (dst, src) in rgb.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let scale = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        dst.0 = [scale(r), scale(g), scale(b)];
    }

    Raster::from_rgb(rgb)
}

/// Turn a decoded segmentation result into a 3-channel raster.
///
/// Images with alpha are composited over black; anything else is converted
/// to RGB as is.
pub fn flatten_segmented(image: DynamicImage) -> Raster {
    if image.color().has_alpha() {
        composite_on_black(&image.to_rgba8())
    } else {
        Raster::from_rgb(image.to_rgb8())
    }
}

/// Removes backgrounds when a segmentation capability is present.
pub struct BackgroundRemover {
    segmenter: Option<Box<dyn Segmenter>>,
}

impl BackgroundRemover {
    /// Use the given segmenter.
    pub fn new(segmenter: Box<dyn Segmenter>) -> Self {
        Self {
            segmenter: Some(segmenter),
        }
    }

    /// A remover with no segmentation capability.
    pub fn unavailable() -> Self {
        Self { segmenter: None }
    }

    /// Resolve the capability from `FAL_API_KEY` and the `[segmentation]`
    /// config.
    ///
    /// # Errors
    ///
    /// `SegmentError::MissingApiKey` when the variable is unset or empty,
    /// otherwise whatever building the HTTP client or its runtime reports.
    pub fn detect(config: &SegmentationConfig) -> Result<Self, SegmentError> {
        let api_key = std::env::var(super::FAL_API_KEY_ENV).unwrap_or_default();
        Self::with_api_key(api_key, config)
    }

    /// A fal.ai-backed remover using an explicit API key.
    pub fn with_api_key(
        api_key: String,
        config: &SegmentationConfig,
    ) -> Result<Self, SegmentError> {
        let segmenter = FalSegmenter::with_settings(
            api_key,
            &config.base_url,
            &config.model,
            config.timeout(),
        )?;
        log::info!("Background removal available ({})", segmenter.endpoint());
        Ok(Self::new(Box::new(segmenter)))
    }

    pub fn is_available(&self) -> bool {
        self.segmenter.is_some()
    }

    /// Segment `raster` and composite the subject over black.
    ///
    /// # Errors
    ///
    /// `SegmentError::Unavailable` without a segmenter, otherwise whatever the
    /// segmenter or image codec reports.
    pub fn try_remove(&self, raster: &Raster) -> Result<Raster, SegmentError> {
        let segmenter = self.segmenter.as_ref().ok_or(SegmentError::Unavailable)?;

        let mut png = Vec::new();
        raster
            .to_dynamic()
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        log::info!("Removing background with {}...", segmenter.name());
        let output = segmenter.segment(&png)?;
        let decoded = image::load_from_memory(&output)?;
        Ok(flatten_segmented(decoded))
    }
}

impl std::fmt::Debug for BackgroundRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRemover")
            .field("segmenter", &self.segmenter.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}
