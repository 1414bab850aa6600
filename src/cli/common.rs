//! Shared plumbing for CLI commands: error kinds, exit codes and the
//! loading steps every command starts with.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::KbError;
use crate::models::{Keyboard, Position};
use crate::parser::keyboard_file;
use crate::services::generate_outline;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Input was readable but invalid
    ValidationError = 1,
    /// File could not be read, parsed or written
    IoError = 2,
    /// Generation failed
    BuildError = 3,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Category of a CLI failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input or configuration
    Validation,
    /// File system or parse failure
    Io,
    /// Generation failure
    Build,
}

/// Error reported by a CLI command.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Failure category, decides the exit code
    pub kind: ErrorKind,
    /// Message printed to stderr
    pub message: String,
}

/// Result type of CLI commands.
pub type CliResult<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Validation failure (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    /// I/O failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: message.into(),
        }
    }

    /// Build failure (exit code 3).
    pub fn build(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Build,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Validation => ExitCode::ValidationError,
            ErrorKind::Io => ExitCode::IoError,
            ErrorKind::Build => ExitCode::BuildError,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<KbError> for CliError {
    fn from(err: KbError) -> Self {
        match err {
            KbError::UnknownOutline(_)
            | KbError::UnknownController(_)
            | KbError::UnknownSwitch(_)
            | KbError::InvalidConfig(_)
            | KbError::UnassignedKey { .. }
            | KbError::KeyIndex { .. }
            | KbError::Validation(_) => Self::validation(err.to_string()),
            KbError::Transcode(_) | KbError::Json(_) => Self::io(err.to_string()),
            _ => Self::build(err.to_string()),
        }
    }
}

/// Loads the configuration from `path`, or from the platform location.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let result = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    result.map_err(|e| CliError::io(format!("Failed to load config: {e:#}")))
}

/// Loads a keyboard description file.
pub fn load_keyboard(path: &Path) -> CliResult<Keyboard> {
    keyboard_file::load_keyboard(path).map_err(|e| CliError::io(format!("{e:#}")))
}

/// Saves a keyboard description file.
pub fn save_keyboard(path: &Path, keyboard: &Keyboard) -> CliResult<()> {
    keyboard_file::save_keyboard(path, keyboard).map_err(|e| CliError::io(format!("{e:#}")))
}

/// The keyboard's stored outline, or a freshly generated one when none
/// is stored.
pub fn keyboard_outline(keyboard: &Keyboard, config: &Config) -> CliResult<Vec<Position>> {
    if !keyboard.outline_polygon.is_empty() {
        return Ok(keyboard.outline_polygon.clone());
    }
    let spec = keyboard.outline.resolve(&config.outline);
    Ok(generate_outline(&keyboard.keys, &spec, &config.geometry)?.exterior)
}

/// Pretty JSON for stdout or a file.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))
}

/// Writes `content` to `path`, or prints it when no path is given.
pub fn write_output(path: Option<&PathBuf>, content: &str) -> CliResult<()> {
    match path {
        Some(path) => fs::write(path, format!("{content}\n"))
            .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display()))),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

/// Outline ring as `[x, y]` pairs for JSON output.
#[must_use]
pub fn ring_to_pairs(ring: &[Position]) -> Vec<[f64; 2]> {
    ring.iter().map(|p| [p.x, p.y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("x").exit_code().code(), 1);
        assert_eq!(CliError::io("x").exit_code().code(), 2);
        assert_eq!(CliError::build("x").exit_code().code(), 3);
    }

    #[test]
    fn test_library_errors_map_to_kinds() {
        let capacity = KbError::MatrixCapacity {
            rows: 1,
            cols: 20,
            available: 18,
        };
        assert_eq!(CliError::from(capacity).kind, ErrorKind::Build);
        assert_eq!(
            CliError::from(KbError::UnknownController("x".into())).kind,
            ErrorKind::Validation
        );
        assert_eq!(
            CliError::from(KbError::Transcode("bad".into())).kind,
            ErrorKind::Io
        );
    }
}
