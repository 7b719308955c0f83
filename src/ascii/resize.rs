//! Resampling to the character grid.

use image::imageops::{self, FilterType};

use super::dimensions::calculate_dimensions;
use crate::raster::{PixelFormat, Raster};

/// Resampling filter used for every resize.
/// Bicubic, so output is reproducible across runs.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Resize a raster to `target_width` columns, deriving the row count from
/// [`calculate_dimensions`].
///
/// The pixel format is preserved: gray stays gray, RGB stays RGB.
pub fn resize(raster: &Raster, target_width: u32) -> Raster {
    let (width, height) = calculate_dimensions(raster.width, raster.height, target_width);

    let resized = match raster.format {
        PixelFormat::Gray => {
            let gray = raster.to_dynamic().to_luma8();
            Raster::from_gray(imageops::resize(&gray, width, height, RESIZE_FILTER))
        }
        PixelFormat::Rgb => {
            let rgb = raster.to_dynamic().to_rgb8();
            Raster::from_rgb(imageops::resize(&rgb, width, height, RESIZE_FILTER))
        }
    };

    log::debug!(
        "Resized {}x{} -> {}x{}",
        raster.width,
        raster.height,
        resized.width,
        resized.height
    );
    resized
}
