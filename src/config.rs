//! Configuration file handling for ascii-generator.
//!
//! Loads configuration from `~/.config/ascii-generator/config.toml` or a custom path.

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ascii::Ramp;
use crate::segment::{DEFAULT_MODEL, DEFAULT_TIMEOUT, FAL_API_BASE_URL};

/// Default output width in characters.
pub const DEFAULT_WIDTH: u32 = 100;

/// Commented default file written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# ascii-generator configuration

[render]
# Glyph ramp: simple, standard, detailed, blocks
ramp = "standard"
# Output width in characters
width = 100
# Remove the image background before converting (needs FAL_API_KEY)
remove_background = false

[segmentation]
# fal.ai model used for background removal
model = "fal-ai/imageutils/rembg"
# API base URL
base_url = "https://fal.run"
# Request timeout in seconds
timeout_secs = 60
"#;

/// Configuration file structure for ascii-generator.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    #[serde(default)]
    pub ramp: Option<String>,
    /// Output width in characters, at least 1
    #[serde(default = "default_width", deserialize_with = "deserialize_width")]
    pub width: u32,
    #[serde(default)]
    pub remove_background: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ramp: None,
            width: DEFAULT_WIDTH,
            remove_background: false,
        }
    }
}

impl RenderConfig {
    /// The configured ramp; unknown names fall back to `standard`.
    pub fn ramp(&self) -> Ramp {
        self.ramp
            .as_deref()
            .map(Ramp::from_name_or_default)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SegmentationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn deserialize_width<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let width = u32::deserialize(deserializer)?;
    if width == 0 {
        return Err(serde::de::Error::custom("width must be at least 1 character"));
    }
    Ok(width)
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    FAL_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ascii-generator").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/ascii-generator/config.toml")
        })
}
