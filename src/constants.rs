//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the binary name and the physical defaults of a keyboard.

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "kbforge";

/// Name of the per-user configuration directory.
pub const CONFIG_DIR_NAME: &str = "kbforge";

/// Distance between adjacent key centres in millimetres (one keyboard unit).
pub const DEFAULT_PITCH: f64 = 19.05;

/// Segments used to approximate a quarter circle when arcs are flattened.
pub const DEFAULT_RESOLUTION: u32 = 64;

/// Margin in millimetres between the outline and the PCB origin.
pub const PCB_MARGIN: f64 = 16.0;

/// Metadata key carrying the outline strategy in compact layout documents.
pub const KLE_OUTLINE_KEY: &str = "kbforge-outline";

/// Older metadata key for the outline strategy, accepted when decoding.
pub const KLE_OUTLINE_LEGACY_KEY: &str = "kb-toolkit-outline";

/// Tolerance used when comparing compact layout coordinates.
pub const KLE_EPSILON: f64 = 1e-5;
