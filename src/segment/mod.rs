//! Background removal.
//!
//! Subject/background separation is delegated to a [`Segmenter`]. The only
//! implementation shipped is [`FalSegmenter`], which calls fal.ai's rembg
//! endpoint. Whether a segmenter exists is decided once, when the
//! [`BackgroundRemover`] is built; without one, background removal is a
//! logged no-op.

mod client;
mod remover;

pub use client::{
    decode_data_uri, png_data_uri, FalSegmenter, DEFAULT_MODEL, DEFAULT_TIMEOUT,
    FAL_API_BASE_URL, FAL_API_KEY_ENV,
};
pub use remover::{composite_on_black, flatten_segmented, BackgroundRemover};

/// Separates the subject of an image from its background.
pub trait Segmenter: Send {
    /// Take PNG bytes, return encoded image bytes whose alpha channel marks
    /// the removed background.
    fn segment(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Errors from a segmentation attempt.
///
/// None of these reach the pipeline caller; the remover logs them and keeps
/// the original image.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("Background removal is not available")]
    Unavailable,

    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: {message}")]
    RateLimit {
        /// Human-readable rate limit message
        message: String,
        /// Retry-After header value in seconds, if provided
        retry_after_secs: Option<u64>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}
