//! Parsing and serialization for the supported file formats.
//!
//! This module reads and writes keyboard description files (JSON, JSON5,
//! YAML) and transcodes the Keyboard Layout Editor (KLE) row notation.

pub mod keyboard_file;
pub mod kle;

// Re-export commonly used functions
pub use keyboard_file::{load_keyboard, save_keyboard, FileFormat};
pub use kle::{EncodeOptions, KleLayout};
