//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving the build defaults
//! (pitch, arc resolution, outline radii, matrix seed, plate cutouts) in TOML
//! format with platform-specific directory resolution. A `Config` is threaded
//! explicitly through every generator instead of living in globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, DEFAULT_PITCH, DEFAULT_RESOLUTION};
use crate::error::KbError;

/// Physical grid and polygon approximation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Key pitch in millimetres (one keyboard unit)
    #[serde(default = "default_pitch")]
    pub pitch: f64,
    /// Segments per quarter circle when arcs are flattened into polygons
    #[serde(default = "default_resolution")]
    pub resolution: u32,
}

fn default_pitch() -> f64 {
    DEFAULT_PITCH
}

fn default_resolution() -> u32 {
    DEFAULT_RESOLUTION
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            pitch: default_pitch(),
            resolution: default_resolution(),
        }
    }
}

/// Default radii applied when a keyboard does not specify its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Concave (inner corner) rounding radius for tight outlines
    #[serde(default = "default_radius")]
    pub concave: f64,
    /// Convex (outer corner) rounding radius for tight outlines
    #[serde(default = "default_radius")]
    pub convex: f64,
    /// Corner radius for convex hull and rectangle outlines
    #[serde(default = "default_radius")]
    pub corner_radius: f64,
}

fn default_radius() -> f64 {
    1.5
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            concave: default_radius(),
            convex: default_radius(),
            corner_radius: default_radius(),
        }
    }
}

/// Matrix assignment settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MatrixConfig {
    /// Seed for the random assignment strategy
    #[serde(default)]
    pub seed: u64,
}

/// Switch plate cutout settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateConfig {
    /// Edge length of the square switch cutout in millimetres
    #[serde(default = "default_cutout_size")]
    pub cutout_size: f64,
    /// Corner rounding radius of each cutout
    #[serde(default = "default_cutout_corner_radius")]
    pub cutout_corner_radius: f64,
    /// Extra clearance grown around every cutout
    #[serde(default = "default_cutout_padding")]
    pub cutout_padding: f64,
}

fn default_cutout_size() -> f64 {
    14.0
}

fn default_cutout_corner_radius() -> f64 {
    0.3
}

fn default_cutout_padding() -> f64 {
    0.05
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            cutout_size: default_cutout_size(),
            cutout_corner_radius: default_cutout_corner_radius(),
            cutout_padding: default_cutout_padding(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/kbforge/config.toml`
/// - macOS: `~/Library/Application Support/kbforge/config.toml`
/// - Windows: `%APPDATA%\kbforge\config.toml`
///
/// # Validation
///
/// - `pitch` must be positive and finite
/// - `resolution` must be at least 1
/// - all radii and plate dimensions must be non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Grid and polygon settings
    #[serde(default)]
    pub geometry: GeometryConfig,
    /// Outline radius defaults
    #[serde(default)]
    pub outline: OutlineConfig,
    /// Matrix assignment settings
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// Plate cutout settings
    #[serde(default)]
    pub plate: PlateConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path, falling back to defaults
    /// when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .context(format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to the platform config file.
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        let pitch = self.geometry.pitch;
        if !pitch.is_finite() || pitch <= 0.0 {
            return Err(KbError::InvalidConfig(format!(
                "geometry.pitch must be positive, got {pitch}"
            )));
        }
        if self.geometry.resolution == 0 {
            return Err(KbError::InvalidConfig(
                "geometry.resolution must be at least 1".to_string(),
            ));
        }

        let lengths = [
            ("outline.concave", self.outline.concave),
            ("outline.convex", self.outline.convex),
            ("outline.corner_radius", self.outline.corner_radius),
            ("plate.cutout_size", self.plate.cutout_size),
            ("plate.cutout_corner_radius", self.plate.cutout_corner_radius),
            ("plate.cutout_padding", self.plate.cutout_padding),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(KbError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        Ok(())
    }
}
