//! Subcommand handlers for convert, ramps and config actions.

use std::path::Path;

use ascii_generator::config::{default_path, Config, SegmentationConfig, DEFAULT_CONFIG_TOML};
use ascii_generator::segment::{BackgroundRemover, SegmentError, FAL_API_KEY_ENV};
use ascii_generator::{AsciiGenerator, ConversionRequest, LoadError, Ramp, Step};

use super::args::{ConfigAction, ConvertArgs};

/// Exit code when the art was produced but could not be saved.
pub const EXIT_SAVE_FAILED: i32 = 2;

/// Build the request from CLI flags, falling back to config values.
pub fn build_request(args: &ConvertArgs, config: &Config) -> ConversionRequest {
    let mut request = ConversionRequest::from_config(&args.image, config)
        .remove_background(args.remove_background(config.render.remove_background));
    if let Some(width) = args.width {
        request = request.width(width);
    }
    if let Some(ramp) = args.ramp {
        request = request.ramp(ramp.into());
    }
    if let Some(output) = &args.output {
        request = request.output(output);
    }
    request
}

/// Build the background remover, warning with the cause when it is
/// unavailable.
fn resolve_remover(config: &SegmentationConfig) -> BackgroundRemover {
    match BackgroundRemover::detect(config) {
        Ok(remover) => remover,
        Err(SegmentError::MissingApiKey) => {
            eprintln!(
                "Warning: background removal unavailable ({} not set), converting the full image.",
                FAL_API_KEY_ENV
            );
            BackgroundRemover::unavailable()
        }
        Err(e) => {
            eprintln!(
                "Warning: background removal unavailable ({}), converting the full image.",
                e
            );
            BackgroundRemover::unavailable()
        }
    }
}

/// Run one conversion, printing progress to stderr and the art to stdout.
///
/// Returns the process exit code on success; only a load failure is an error.
pub fn run_convert(args: &ConvertArgs, config: &Config) -> Result<i32, LoadError> {
    let request = build_request(args, config);

    let remover = if request.remove_background {
        resolve_remover(&config.segmentation)
    } else {
        BackgroundRemover::unavailable()
    };

    let mut generator = AsciiGenerator::new(remover);
    let mut save_failed = false;
    let art = generator.generate_with_progress(&request, &mut |step: Step, detail: &str| {
        if step == Step::SaveFailed {
            save_failed = true;
        }
        let marker = if step.is_error() { "x" } else { "-" };
        eprintln!("[{}] {}: {}", marker, step, detail);
    })?;

    if !args.quiet {
        println!("{}", art);
    }

    let stats = art.stats();
    eprintln!();
    eprintln!("Statistics:");
    eprintln!("  Lines:      {}", stats.lines);
    eprintln!("  Width:      {}", stats.width);
    eprintln!("  Characters: {}", stats.characters);
    eprintln!("  Ramp:       {}", request.ramp);

    if save_failed {
        return Ok(EXIT_SAVE_FAILED);
    }
    if let Some(output) = &request.output {
        eprintln!("Saved to {}", output.display());
    }
    Ok(0)
}

/// List glyph ramps and print them to stdout.
pub fn list_ramps() {
    println!("Available ramps (darkest to brightest):");
    for ramp in Ramp::ALL {
        let glyphs: String = ramp.chars().iter().collect();
        println!(
            "  {:<9} {:>2} glyphs  \"{}\"",
            ramp.name(),
            ramp.len(),
            glyphs
        );
        println!("            {}", ramp.description());
    }
    println!();
    println!("Use --ramp <name> to select a ramp.");
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config: &Config, path: Option<&Path>) {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Ramp: {}", config.render.ramp());
            println!("  Width: {}", config.render.width);
            println!(
                "  Remove background: {}",
                if config.render.remove_background { "yes" } else { "no" }
            );
            println!("  Segmentation model: {}", config.segmentation.model);
            println!("  Segmentation URL: {}", config.segmentation.base_url);
            println!("  Timeout: {}s", config.segmentation.timeout().as_secs());
            println!(
                "  {}: {}",
                FAL_API_KEY_ENV,
                if std::env::var(FAL_API_KEY_ENV).is_ok() { "set" } else { "not set" }
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'ascii-generator config show' to view current settings.");
                std::process::exit(1);
            }

            // Create parent directories if needed
            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            if let Err(e) = std::fs::write(&config_path, DEFAULT_CONFIG_TOML) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}
