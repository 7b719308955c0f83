//! CLI argument parsing with clap.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::RampChoice;

/// Parse and validate an output width (at least 1 character)
pub fn parse_width(s: &str) -> Result<u32, String> {
    let width: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid width", s))?;
    if width == 0 {
        return Err("Width must be at least 1 character".to_string());
    }
    Ok(width)
}

/// Convert images to ASCII art
#[derive(Parser, Debug)]
#[command(name = "ascii-generator")]
#[command(version, about = "Convert images to ASCII art", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Print a 100-column rendering
    ascii-generator convert photo.jpg

    # Wider, finer output saved to a file
    ascii-generator convert photo.jpg -w 200 -r detailed -o photo.txt

    # Remove the background first (needs FAL_API_KEY)
    ascii-generator convert portrait.png --remove-bg")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert an image to ASCII art
    Convert(ConvertArgs),
    /// List available glyph ramps
    Ramps,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ClapArgs, Debug)]
pub struct ConvertArgs {
    /// Image to convert (JPEG, PNG, BMP, GIF, TIFF, ...)
    pub image: PathBuf,

    /// Output width in characters (default: 100, or the config file value)
    #[arg(long, short, value_parser = parse_width)]
    pub width: Option<u32>,

    /// Glyph ramp (default: standard, or the config file value)
    #[arg(long, short)]
    pub ramp: Option<RampChoice>,

    /// Remove the image background before converting
    #[arg(long, conflicts_with = "keep_bg")]
    pub remove_bg: bool,

    /// Keep the background even if the config file enables removal
    #[arg(long)]
    pub keep_bg: bool,

    /// Write the result to a file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Do not print the result to stdout
    #[arg(long, short)]
    pub quiet: bool,
}

impl ConvertArgs {
    /// Resolve the background flag against the config default.
    pub fn remove_background(&self, config_default: bool) -> bool {
        if self.remove_bg {
            true
        } else if self.keep_bg {
            false
        } else {
            config_default
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
