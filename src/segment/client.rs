//! FalSegmenter - background removal through the fal.ai rembg endpoint.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{SegmentError, Segmenter};

/// The environment variable name for the fal.ai API key.
pub const FAL_API_KEY_ENV: &str = "FAL_API_KEY";

/// Default base URL for synchronous fal.ai requests.
pub const FAL_API_BASE_URL: &str = "https://fal.run";

/// Default background removal model.
pub const DEFAULT_MODEL: &str = "fal-ai/imageutils/rembg";

/// Default timeout for a whole segmentation request (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP status code for rate limiting.
const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Request body for background removal.
#[derive(Debug, Serialize)]
struct RembgRequest {
    /// Source image, passed inline as a `data:` URI.
    image_url: String,
}

/// Response from the rembg endpoint.
#[derive(Debug, Deserialize)]
struct RembgResponse {
    image: ImageOutput,
}

/// Output image reference.
#[derive(Debug, Deserialize)]
struct ImageOutput {
    /// Either an HTTP URL or an inline `data:` URI.
    url: String,
}

/// Parse the Retry-After header value in seconds.
fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
}

/// Encode PNG bytes as a `data:` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

/// Decode the payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SegmentError> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
        .ok_or_else(|| SegmentError::InvalidResponse("unsupported data URI".to_string()))?;

    BASE64
        .decode(payload.trim())
        .map_err(|e| SegmentError::InvalidResponse(format!("bad base64 payload: {}", e)))
}

/// Segmentation client for the fal.ai API.
///
/// The HTTP client is async; a private current-thread runtime drives it so
/// [`Segmenter::segment`] can stay blocking. Do not call it from inside
/// another tokio runtime.
pub struct FalSegmenter {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl FalSegmenter {
    /// Create a segmenter by reading the API key from `FAL_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `SegmentError::MissingApiKey` if the variable is not set.
    pub fn new() -> Result<Self, SegmentError> {
        let api_key = std::env::var(FAL_API_KEY_ENV).map_err(|_| SegmentError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    /// Create a segmenter with an explicit API key and default endpoint.
    pub fn with_api_key(api_key: String) -> Result<Self, SegmentError> {
        Self::with_settings(api_key, FAL_API_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }

    /// Create a segmenter with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, SegmentError> {
        Self::with_settings(api_key, &base_url, DEFAULT_MODEL, DEFAULT_TIMEOUT)
    }

    /// Create a segmenter with every setting spelled out.
    pub fn with_settings(
        api_key: String,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, SegmentError> {
        if api_key.is_empty() {
            return Err(SegmentError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SegmentError::Runtime)?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_matches('/').to_string(),
            http_client,
            runtime,
        })
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint the request is posted to.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }

    /// Send a PNG to the rembg endpoint and return the cut-out image bytes.
    ///
    /// # Errors
    ///
    /// `SegmentError::RateLimit` on a 429, `SegmentError::Api` for other
    /// error statuses, `SegmentError::InvalidResponse` when the body does not
    /// carry an image, and `SegmentError::Http` for transport failures.
    pub async fn remove_background(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError> {
        let request_body = RembgRequest {
            image_url: png_data_uri(png),
        };

        log::debug!("Posting {} byte image to {}", png.len(), self.endpoint());
        let response = self
            .http_client
            .post(self.endpoint())
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
                let retry_after_secs = parse_retry_after(&response);
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Rate limit exceeded".to_string());
                log::warn!(
                    "Rate limited by fal.ai API. Retry-After: {:?} seconds",
                    retry_after_secs
                );
                return Err(SegmentError::RateLimit {
                    message,
                    retry_after_secs,
                });
            }

            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SegmentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RembgResponse = response
            .json()
            .await
            .map_err(|e| SegmentError::InvalidResponse(e.to_string()))?;
        self.fetch_image(&body.image.url).await
    }

    /// Resolve the output image reference to bytes.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, SegmentError> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }

        log::debug!("Downloading segmented image from: {}", url);
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SegmentError::Api {
                status: status.as_u16(),
                message: format!("download of {} failed", url),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl Segmenter for FalSegmenter {
    fn segment(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError> {
        self.runtime.block_on(self.remove_background(png))
    }

    fn name(&self) -> &str {
        &self.model
    }
}
