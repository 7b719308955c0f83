//! End-to-end tests for the conversion pipeline.
//!
//! Covers:
//! - Full conversions from image files on disk
//! - Source cache behavior (hits, invalidation)
//! - Background removal degradation and caching
//! - Output file persistence and its failure mode
//! - Progress milestones

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ascii_generator::loader::{DecodeError, Decoder, ImageDecoder};
use ascii_generator::segment::{BackgroundRemover, SegmentError, Segmenter};
use ascii_generator::{
    AsciiGenerator, ConversionRequest, LoadError, PixelFormat, Ramp, Raster, Step,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

/// Decoder that counts how often it runs.
struct CountingDecoder {
    calls: Arc<AtomicUsize>,
}

impl Decoder for CountingDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ImageDecoder.decode(bytes)
    }
}

/// Segmenter that makes every pixel transparent except the center column,
/// counting its invocations.
struct CenterCutout {
    calls: Arc<AtomicUsize>,
}

impl Segmenter for CenterCutout {
    fn segment(&self, png: &[u8]) -> Result<Vec<u8>, SegmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rgba = image::load_from_memory(png)?.to_rgba8();
        let center = rgba.width() / 2;
        for (x, _, px) in rgba.enumerate_pixels_mut() {
            if x != center {
                px.0[3] = 0;
            }
        }
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(rgba).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "center-cutout"
    }
}

struct FailingSegmenter;

impl Segmenter for FailingSegmenter {
    fn segment(&self, _png: &[u8]) -> Result<Vec<u8>, SegmentError> {
        Err(SegmentError::Api {
            status: 500,
            message: "model crashed".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn write_solid(dir: &Path, name: &str, width: u32, height: u32, rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb(rgb))
        .save(&path)
        .unwrap();
    path
}

fn write_gradient(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 255) / (width - 1)) as u8;
        Rgb([v, ((y * 255) / (height - 1)) as u8, 255 - v])
    })
    .save(&path)
    .unwrap();
    path
}

fn counting_generator(remover: BackgroundRemover) -> (AsciiGenerator, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let decoder = CountingDecoder {
        calls: Arc::clone(&calls),
    };
    (AsciiGenerator::with_decoder(Box::new(decoder), remover), calls)
}

// ==================== Conversion Tests ====================

#[test]
fn test_solid_black_simple_ramp() {
    let dir = TempDir::new().unwrap();
    let path = write_solid(dir.path(), "black.png", 10, 10, [0, 0, 0]);
    let mut generator = AsciiGenerator::without_background_removal();

    let request = ConversionRequest::new(&path).width(10).ramp(Ramp::Simple);
    let art = generator.generate(&request).unwrap();

    // round(10 * 1.0 * 0.55) = 6 rows of the darkest glyph
    assert_eq!(art.height(), 6);
    for line in art.lines() {
        assert_eq!(line, &" ".repeat(10));
    }
}

#[test]
fn test_solid_white_maps_to_last_glyph() {
    let dir = TempDir::new().unwrap();
    let path = write_solid(dir.path(), "white.png", 20, 20, [255, 255, 255]);
    let mut generator = AsciiGenerator::without_background_removal();

    let art = generator
        .generate(&ConversionRequest::new(&path).width(8))
        .unwrap();
    assert!(art.lines().iter().all(|l| l == "@@@@@@@@"));
}

#[test]
fn test_reference_dimensions() {
    let dir = TempDir::new().unwrap();
    let path = write_gradient(dir.path(), "wide.png", 200, 100);
    let mut generator = AsciiGenerator::without_background_removal();

    let art = generator
        .generate(&ConversionRequest::new(&path).width(100))
        .unwrap();
    assert_eq!(art.height(), 28);
    assert_eq!(art.width(), 100);
}

#[test]
fn test_all_ramps_stay_in_charset() {
    let dir = TempDir::new().unwrap();
    let path = write_gradient(dir.path(), "grad.png", 64, 48);
    let mut generator = AsciiGenerator::without_background_removal();

    for ramp in Ramp::ALL {
        let art = generator
            .generate(&ConversionRequest::new(&path).width(40).ramp(ramp))
            .unwrap();
        for line in art.lines() {
            assert!(
                line.chars().all(|c| ramp.chars().contains(&c)),
                "{} produced a glyph outside its ramp",
                ramp
            );
        }
    }
}

#[test]
fn test_same_request_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let path = write_gradient(dir.path(), "grad.png", 90, 60);
    let request = ConversionRequest::new(&path).width(45).ramp(Ramp::Detailed);

    let first = AsciiGenerator::without_background_removal()
        .generate(&request)
        .unwrap();
    let mut generator = AsciiGenerator::without_background_removal();
    let second = generator.generate(&request).unwrap();
    let third = generator.generate(&request).unwrap();

    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(second.to_string(), third.to_string());
}

#[test]
fn test_grayscale_source_supported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gray.png");
    image::GrayImage::from_pixel(30, 30, image::Luma([255]))
        .save(&path)
        .unwrap();
    let mut generator = AsciiGenerator::without_background_removal();

    let art = generator
        .generate(&ConversionRequest::new(&path).width(5).ramp(Ramp::Blocks))
        .unwrap();
    assert!(art.lines().iter().all(|l| l == "█████"));
}

#[test]
fn test_other_formats_decode() {
    let dir = TempDir::new().unwrap();
    let mut generator = AsciiGenerator::without_background_removal();
    for name in ["img.bmp", "img.gif", "img.tiff", "img.jpg"] {
        let path = write_solid(dir.path(), name, 16, 16, [0, 0, 0]);
        let art = generator
            .generate(&ConversionRequest::new(&path).width(4))
            .unwrap();
        assert_eq!(art.width(), 4, "{}", name);
    }
}

// ==================== Load Failure Tests ====================

#[test]
fn test_missing_source_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut generator = AsciiGenerator::without_background_removal();
    let result = generator.generate(&ConversionRequest::new(dir.path().join("nope.jpg")));
    assert!(matches!(result, Err(LoadError::NotFound(_))));
}

#[test]
fn test_undecodable_source_is_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG but not really").unwrap();
    let mut generator = AsciiGenerator::without_background_removal();

    let result = generator.generate(&ConversionRequest::new(&path));
    assert!(matches!(result, Err(LoadError::Decode { .. })));
}

#[test]
fn test_load_failure_writes_no_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.txt");
    let mut generator = AsciiGenerator::without_background_removal();

    let request = ConversionRequest::new(dir.path().join("nope.jpg")).output(&output);
    assert!(generator.generate(&request).is_err());
    assert!(!output.exists());
}

// ==================== Cache Tests ====================

#[test]
fn test_same_source_decoded_once() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 40, 40);
    let (mut generator, decodes) = counting_generator(BackgroundRemover::unavailable());

    generator.load(&a).unwrap();
    generator.load(&a).unwrap();
    generator.generate(&ConversionRequest::new(&a).width(10)).unwrap();

    assert_eq!(decodes.load(Ordering::SeqCst), 1);
    assert_eq!(generator.cached_source(), Some(a.as_path()));
}

#[test]
fn test_switching_sources_invalidates_cache() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 10, 10, [0, 0, 0]);
    let b = write_solid(dir.path(), "b.png", 10, 10, [255, 255, 255]);
    let (mut generator, decodes) = counting_generator(BackgroundRemover::unavailable());

    let first_a = generator.load(&a).unwrap();
    generator.load(&b).unwrap();
    let second_a = generator.load(&a).unwrap();

    assert_eq!(decodes.load(Ordering::SeqCst), 3);
    assert_eq!(first_a, second_a);
}

#[test]
fn test_cache_sees_file_changes_after_source_switch() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 10, 10, [0, 0, 0]);
    let b = write_solid(dir.path(), "b.png", 10, 10, [0, 0, 0]);
    let mut generator = AsciiGenerator::without_background_removal();

    generator.load(&a).unwrap();
    generator.load(&b).unwrap();
    write_solid(dir.path(), "a.png", 10, 10, [255, 255, 255]);
    let reloaded = generator.load(&a).unwrap();

    assert!(reloaded.data.iter().all(|&v| v == 255));
}

#[test]
fn test_loaded_copy_is_independent() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 4, 4, [10, 20, 30]);
    let mut generator = AsciiGenerator::without_background_removal();

    let mut first = generator.load(&a).unwrap();
    first.data.iter_mut().for_each(|v| *v = 0);
    let second = generator.load(&a).unwrap();

    assert_eq!(&second.data[..3], &[10, 20, 30]);
}

#[test]
fn test_deleted_cached_source_is_not_found() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 4, 4, [1, 1, 1]);
    let mut generator = AsciiGenerator::without_background_removal();

    generator.load(&a).unwrap();
    std::fs::remove_file(&a).unwrap();
    assert!(matches!(generator.load(&a), Err(LoadError::NotFound(_))));
}

// ==================== Background Removal Tests ====================

#[test]
fn test_unavailable_removal_is_pixel_identical() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 30, 20);
    let mut generator = AsciiGenerator::without_background_removal();

    let image = generator.load(&a).unwrap();
    assert!(!generator.background_removal_available());
    assert_eq!(generator.remove_background(&image), image);
    assert!(!generator.has_cached_background_removal());
}

#[test]
fn test_unavailable_removal_matches_plain_conversion() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 30, 20);
    let mut generator = AsciiGenerator::without_background_removal();

    let plain = generator.generate(&ConversionRequest::new(&a).width(20)).unwrap();
    let with_flag = generator
        .generate(&ConversionRequest::new(&a).width(20).remove_background(true))
        .unwrap();
    assert_eq!(plain, with_flag);
}

#[test]
fn test_removal_result_is_cached_per_source() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 9, 9, [255, 255, 255]);
    let b = write_solid(dir.path(), "b.png", 9, 9, [255, 255, 255]);
    let calls = Arc::new(AtomicUsize::new(0));
    let remover = BackgroundRemover::new(Box::new(CenterCutout {
        calls: Arc::clone(&calls),
    }));
    let mut generator = AsciiGenerator::new(remover);

    let request = ConversionRequest::new(&a).width(9).remove_background(true);
    let first = generator.generate(&request).unwrap();
    let second = generator.generate(&request).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert!(generator.has_cached_background_removal());

    generator
        .generate(&ConversionRequest::new(&b).width(9).remove_background(true))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_removal_output_is_rgb_on_black() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 5, 3, [200, 200, 200]);
    let remover = BackgroundRemover::new(Box::new(CenterCutout {
        calls: Arc::new(AtomicUsize::new(0)),
    }));
    let mut generator = AsciiGenerator::new(remover);

    let image = generator.load(&a).unwrap();
    let removed = generator.remove_background(&image);
    assert_eq!(removed.format, PixelFormat::Rgb);
    for row in removed.rows() {
        let pixels: Vec<&[u8]> = row.chunks_exact(3).collect();
        assert_eq!(pixels[0], &[0, 0, 0]);
        assert_eq!(pixels[2], &[200, 200, 200]);
        assert_eq!(pixels[4], &[0, 0, 0]);
    }
}

#[test]
fn test_failed_removal_falls_back_and_is_not_cached() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 30, 20);
    let mut plain = AsciiGenerator::without_background_removal();
    let mut failing = AsciiGenerator::new(BackgroundRemover::new(Box::new(FailingSegmenter)));

    let expected = plain.generate(&ConversionRequest::new(&a).width(15)).unwrap();
    let actual = failing
        .generate(&ConversionRequest::new(&a).width(15).remove_background(true))
        .unwrap();

    assert_eq!(expected, actual);
    assert!(!failing.has_cached_background_removal());
}

// ==================== Persistence Tests ====================

#[test]
fn test_output_file_matches_result() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 50, 50);
    let output = dir.path().join("art.txt");
    let mut generator = AsciiGenerator::without_background_removal();

    let art = generator
        .generate(&ConversionRequest::new(&a).width(25).ramp(Ramp::Blocks).output(&output))
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, art.to_string());
    assert_eq!(written.lines().count(), art.height());
    assert!(!written.ends_with('\n'));
}

#[test]
fn test_save_failure_still_returns_art() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 20, 20);
    let output = dir.path().join("missing-dir").join("art.txt");
    let mut generator = AsciiGenerator::without_background_removal();
    let mut steps = Vec::new();

    let result = generator.generate_with_progress(
        &ConversionRequest::new(&a).width(10).output(&output),
        &mut |step: Step, detail: &str| steps.push((step, detail.to_string())),
    );

    let art = result.unwrap();
    assert_eq!(art.width(), 10);
    assert!(steps
        .iter()
        .any(|(step, detail)| *step == Step::SaveFailed && detail.contains("art.txt")));
    assert_eq!(steps.last().map(|(s, _)| *s), Some(Step::Done));
}

// ==================== Progress Tests ====================

#[test]
fn test_progress_milestones_in_order() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 20, 20);
    let output = dir.path().join("art.txt");
    let mut generator = AsciiGenerator::without_background_removal();
    let mut steps = Vec::new();

    generator
        .generate_with_progress(
            &ConversionRequest::new(&a).remove_background(true).output(&output),
            &mut |step: Step, _: &str| steps.push(step),
        )
        .unwrap();

    assert_eq!(
        steps,
        vec![
            Step::Load,
            Step::BackgroundRemoval,
            Step::Resize,
            Step::Grayscale,
            Step::GlyphMapping,
            Step::Save,
            Step::Done,
        ]
    );
}

#[test]
fn test_progress_skips_optional_steps() {
    let dir = TempDir::new().unwrap();
    let a = write_gradient(dir.path(), "a.png", 20, 20);
    let mut generator = AsciiGenerator::without_background_removal();
    let mut steps = Vec::new();

    generator
        .generate_with_progress(&ConversionRequest::new(&a), &mut |step: Step, _: &str| {
            steps.push(step)
        })
        .unwrap();

    assert!(!steps.contains(&Step::BackgroundRemoval));
    assert!(!steps.contains(&Step::Save));
}

#[test]
fn test_progress_announces_cached_removal() {
    let dir = TempDir::new().unwrap();
    let a = write_solid(dir.path(), "a.png", 9, 9, [255, 255, 255]);
    let remover = BackgroundRemover::new(Box::new(CenterCutout {
        calls: Arc::new(AtomicUsize::new(0)),
    }));
    let mut generator = AsciiGenerator::new(remover);
    let request = ConversionRequest::new(&a).width(9).remove_background(true);

    let mut details = Vec::new();
    for _ in 0..2 {
        generator
            .generate_with_progress(&request, &mut |step: Step, detail: &str| {
                if step == Step::BackgroundRemoval {
                    details.push(detail.to_string());
                }
            })
            .unwrap();
    }

    assert_eq!(details.len(), 2);
    assert!(!details[0].contains("cached"));
    assert!(details[1].contains("cached"));
}
