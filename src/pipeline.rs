//! Conversion pipeline: load, optional background removal, resize,
//! grayscale, glyph mapping, optional save.
//!
//! [`AsciiGenerator`] owns a single-slot cache of the last decoded source and
//! its background-free version. The cache is dropped as a whole whenever a
//! request names a different source. A generator is `Send` but takes
//! `&mut self`; share one across threads only behind a lock.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::ascii::{self, AsciiArt, Ramp};
use crate::config::{Config, DEFAULT_WIDTH};
use crate::loader::{load_path, Decoder, ImageDecoder, LoadError};
use crate::raster::Raster;
use crate::segment::BackgroundRemover;

/// Pipeline milestones reported to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Load,
    BackgroundRemoval,
    Resize,
    Grayscale,
    GlyphMapping,
    Save,
    /// Writing the output file failed; the result is still returned
    SaveFailed,
    /// Loading failed; no result
    Failed,
    Done,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Load => "load",
            Step::BackgroundRemoval => "background-removal",
            Step::Resize => "resize",
            Step::Grayscale => "grayscale",
            Step::GlyphMapping => "glyph-mapping",
            Step::Save => "save",
            Step::SaveFailed => "save-failed",
            Step::Failed => "failed",
            Step::Done => "done",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Step::SaveFailed | Step::Failed)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives progress milestones. Fire and forget.
pub trait ProgressSink {
    fn report(&mut self, step: Step, detail: &str);
}

impl<F: FnMut(Step, &str)> ProgressSink for F {
    fn report(&mut self, step: Step, detail: &str) {
        self(step, detail)
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _step: Step, _detail: &str) {}
}

/// Everything that determines one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Source image path; also the cache key
    pub source: PathBuf,
    /// Output width in characters
    pub width: u32,
    pub ramp: Ramp,
    pub remove_background: bool,
    /// Where to write the result, if anywhere
    pub output: Option<PathBuf>,
}

impl ConversionRequest {
    /// A request with default settings: 100 wide, `standard` ramp, no
    /// background removal, no output file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            width: DEFAULT_WIDTH,
            ramp: Ramp::default(),
            remove_background: false,
            output: None,
        }
    }

    /// A request whose settings come from the `[render]` config section.
    pub fn from_config(source: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            width: config.render.width,
            ramp: config.render.ramp(),
            remove_background: config.render.remove_background,
            ..Self::new(source)
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn ramp(mut self, ramp: Ramp) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn remove_background(mut self, remove: bool) -> Self {
        self.remove_background = remove;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }
}

#[derive(Default)]
struct ImageCache {
    source: Option<PathBuf>,
    original: Option<Raster>,
    no_background: Option<Raster>,
}

impl ImageCache {
    fn clear(&mut self) {
        self.source = None;
        self.original = None;
        self.no_background = None;
        log::debug!("Image cache cleared");
    }
}

/// Converts images to ASCII art, caching the last source.
pub struct AsciiGenerator {
    decoder: Box<dyn Decoder>,
    remover: BackgroundRemover,
    cache: ImageCache,
}

impl AsciiGenerator {
    /// A generator using the `image` crate decoder.
    pub fn new(remover: BackgroundRemover) -> Self {
        Self::with_decoder(Box::new(ImageDecoder), remover)
    }

    /// A generator with a custom decoder.
    pub fn with_decoder(decoder: Box<dyn Decoder>, remover: BackgroundRemover) -> Self {
        Self {
            decoder,
            remover,
            cache: ImageCache::default(),
        }
    }

    /// A generator where background removal is always a no-op.
    pub fn without_background_removal() -> Self {
        Self::new(BackgroundRemover::unavailable())
    }

    pub fn background_removal_available(&self) -> bool {
        self.remover.is_available()
    }

    /// The source currently held in the cache.
    pub fn cached_source(&self) -> Option<&Path> {
        self.cache.source.as_deref()
    }

    /// Whether a background-free version of the cached source exists.
    pub fn has_cached_background_removal(&self) -> bool {
        self.cache.no_background.is_some()
    }

    /// Load and decode `path`, serving a copy from the cache when it is the
    /// cached source.
    ///
    /// The file's existence is checked on every call. A different source
    /// clears the whole cache before decoding.
    pub fn load(&mut self, path: &Path) -> Result<Raster, LoadError> {
        if !path.exists() {
            log::error!("File {} does not exist", path.display());
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        if self.cache.source.as_deref() == Some(path) {
            if let Some(cached) = &self.cache.original {
                log::debug!("Using cached image");
                return Ok(cached.clone());
            }
        }

        log::info!("Loading new image: {}", path.display());
        self.cache.clear();

        let raster = load_path(path, self.decoder.as_ref()).map_err(|e| {
            log::error!("Failed to load image: {}", e);
            e
        })?;

        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            raster.width,
            raster.height
        );
        self.cache.source = Some(path.to_path_buf());
        self.cache.original = Some(raster.clone());
        Ok(raster)
    }

    /// Remove the background of `raster`, which must come from the cached
    /// source.
    ///
    /// Without a segmentation capability the input is returned unchanged. A
    /// cached result is reused. Failures are logged and the input is
    /// returned; only successful results are cached.
    pub fn remove_background(&mut self, raster: &Raster) -> Raster {
        if !self.remover.is_available() {
            log::warn!("Background removal not available, skipping");
            return raster.clone();
        }

        if let Some(cached) = &self.cache.no_background {
            log::debug!("Using cached background-free image");
            return cached.clone();
        }

        match self.remover.try_remove(raster) {
            Ok(result) => {
                log::info!("Background removed and cached");
                self.cache.no_background = Some(result.clone());
                result
            }
            Err(e) => {
                log::error!("Background removal failed: {}", e);
                log::info!("Using the original image");
                raster.clone()
            }
        }
    }

    /// Run the pipeline without progress reporting.
    pub fn generate(&mut self, request: &ConversionRequest) -> Result<AsciiArt, LoadError> {
        self.generate_with_progress(request, &mut NoProgress)
    }

    /// Run the pipeline, reporting each milestone to `progress`.
    ///
    /// Only a load failure is returned as an error. A failed save is reported
    /// as [`Step::SaveFailed`] and the art is still returned.
    pub fn generate_with_progress<P>(
        &mut self,
        request: &ConversionRequest,
        progress: &mut P,
    ) -> Result<AsciiArt, LoadError>
    where
        P: ProgressSink + ?Sized,
    {
        log::info!("Generating ASCII art for: {}", request.source.display());

        progress.report(Step::Load, "Reading the file from disk...");
        let image = match self.load(&request.source) {
            Ok(image) => image,
            Err(e) => {
                progress.report(Step::Failed, &format!("Could not load the image: {}", e));
                return Err(e);
            }
        };

        let image = if request.remove_background {
            log::info!("Background removal requested");
            let detail = if self.has_cached_background_removal() {
                "Using cached background-free image..."
            } else {
                "AI processing in progress (may take a few seconds)..."
            };
            progress.report(Step::BackgroundRemoval, detail);
            self.remove_background(&image)
        } else {
            image
        };

        progress.report(
            Step::Resize,
            &format!("Fitting to {} characters wide...", request.width),
        );
        let image = ascii::resize(&image, request.width);

        progress.report(Step::Grayscale, "Converting to monochrome...");
        let image = ascii::to_grayscale(&image);

        progress.report(Step::GlyphMapping, "Converting pixels to characters...");
        let art = ascii::map_to_glyphs(&image, request.ramp);

        if let Some(output) = &request.output {
            progress.report(Step::Save, &format!("Writing {}...", output.display()));
            match art.write_to(output) {
                Ok(()) => log::info!("ASCII art saved to: {}", output.display()),
                Err(e) => {
                    log::error!("{}", e);
                    progress.report(Step::SaveFailed, &e.to_string());
                }
            }
        }

        progress.report(
            Step::Done,
            &format!("ASCII art generated ({} lines)", art.height()),
        );
        Ok(art)
    }
}

impl fmt::Debug for AsciiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsciiGenerator")
            .field("remover", &self.remover)
            .field("cached_source", &self.cache.source)
            .field("cached_background_removal", &self.cache.no_background.is_some())
            .finish_non_exhaustive()
    }
}
