//! Keyboard description files.
//!
//! A description is a serialized [`Keyboard`]; the format follows the file
//! extension (`.json`, `.json5`, `.yaml`/`.yml`).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::models::Keyboard;

/// Serialization format of a description file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Strict JSON
    Json,
    /// JSON5 (comments, unquoted keys, trailing commas)
    Json5,
    /// YAML
    Yaml,
}

impl FileFormat {
    /// Detects the format from the path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "json5" => Ok(Self::Json5),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unsupported keyboard file extension for {} (expected .json, .json5, .yaml or .yml)",
                path.display()
            ),
        }
    }
}

/// Parses a description from text in the given format.
pub fn parse_keyboard_str(content: &str, format: FileFormat) -> Result<Keyboard> {
    let keyboard = match format {
        FileFormat::Json => serde_json::from_str(content).context("Invalid JSON keyboard")?,
        FileFormat::Json5 => json5::from_str(content).context("Invalid JSON5 keyboard")?,
        FileFormat::Yaml => serde_yml::from_str(content).context("Invalid YAML keyboard")?,
    };
    Ok(keyboard)
}

/// Loads a keyboard description.
pub fn load_keyboard(path: &Path) -> Result<Keyboard> {
    let format = FileFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read keyboard file: {}", path.display()))?;
    parse_keyboard_str(&content, format)
        .with_context(|| format!("Failed to parse keyboard file: {}", path.display()))
}

/// Serializes a description in the given format.
pub fn keyboard_to_string(keyboard: &Keyboard, format: FileFormat) -> Result<String> {
    let content = match format {
        // JSON is valid JSON5, so both share the pretty JSON writer.
        FileFormat::Json | FileFormat::Json5 => {
            serde_json::to_string_pretty(keyboard).context("Failed to serialize keyboard")?
        }
        FileFormat::Yaml => serde_yml::to_string(keyboard).context("Failed to serialize keyboard")?,
    };
    Ok(content)
}

/// Saves a keyboard description, replacing the file atomically.
pub fn save_keyboard(path: &Path, keyboard: &Keyboard) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    let content = keyboard_to_string(keyboard, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
