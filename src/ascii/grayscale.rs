//! RGB to grayscale conversion using ITU-R BT.601 luminance formula.

use crate::raster::{PixelFormat, Raster};

/// Fixed-point BT.601 weights, scaled by 2^16. They sum to 65536.
const R_WEIGHT: u32 = 19595;
const G_WEIGHT: u32 = 38470;
const B_WEIGHT: u32 = 7471;

/// Luminance of one RGB pixel.
///
/// Y = 0.299*R + 0.587*G + 0.114*B in 16.16 fixed point, rounded to nearest.
/// Matches the `L` conversion of common imaging libraries bit for bit.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = R_WEIGHT * r as u32 + G_WEIGHT * g as u32 + B_WEIGHT * b as u32;
    ((weighted + 0x8000) >> 16) as u8
}

/// Convert a raster to a single-channel luminance raster.
///
/// Gray input is returned as a copy.
pub fn to_grayscale(raster: &Raster) -> Raster {
    let data = match raster.format {
        PixelFormat::Gray => raster.data.clone(),
        PixelFormat::Rgb => raster
            .data
            .chunks_exact(3)
            .map(|rgb| luma(rgb[0], rgb[1], rgb[2]))
            .collect(),
    };

    Raster {
        data,
        width: raster.width,
        height: raster.height,
        format: PixelFormat::Gray,
    }
}
