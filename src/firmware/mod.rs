//! Firmware metadata generation.
//!
//! This module validates a keyboard's matrix assignment and turns it into
//! QMK's data-driven `info.json` definition.

pub mod qmk_info;
pub mod validator;

// Re-export firmware types
pub use qmk_info::{qmk_info, QmkInfoJson};
pub use validator::{MatrixValidator, ValidationReport};
