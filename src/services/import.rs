//! KLE import pipeline: turn a KLE document into a complete keyboard.

use serde_json::Value;
use tracing::info;

use super::matrix::fill_matrix_rows;
use super::outline::generate_outline;
use super::stabilizers::add_standard_stabilizers;
use crate::config::Config;
use crate::error::Result;
use crate::models::{Controller, Keyboard, Switch};
use crate::parser::kle;

/// Choices the KLE document cannot express.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    /// Controller of the imported keyboard
    pub controller: Controller,
    /// Switch family
    pub switch: Switch,
    /// Add stabilizers to wide and tall keys
    pub stabilizers: bool,
    /// Assign a row-based matrix
    pub matrix: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            controller: Controller::default(),
            switch: Switch::default(),
            stabilizers: true,
            matrix: true,
        }
    }
}

/// Builds a keyboard from a parsed KLE document.
///
/// The outline strategy comes from the document's metadata hint (convex
/// hull when absent) with radii from `config`; the generated ring is stored
/// in `outline_polygon`.
pub fn import_kle(doc: &Value, options: &ImportOptions, config: &Config) -> Result<Keyboard> {
    let layout = kle::decode(doc, config.geometry.pitch)?;

    let mut keyboard = Keyboard::new(
        layout.name.unwrap_or_else(|| "kle-import".to_string()),
        options.controller,
    );
    keyboard.switch = options.switch;
    keyboard.keys = layout.keys;
    keyboard.outline.kind = layout.outline.unwrap_or_default();

    let spec = keyboard.outline.resolve(&config.outline);
    keyboard.outline_polygon = generate_outline(&keyboard.keys, &spec, &config.geometry)?.exterior;

    if options.stabilizers {
        add_standard_stabilizers(&mut keyboard.keys);
    }
    if options.matrix {
        fill_matrix_rows(&mut keyboard.keys, options.controller.io_lines())?;
    }

    info!(
        name = %keyboard.name,
        keys = keyboard.key_count(),
        outline = %spec.kind,
        "imported KLE layout"
    );
    Ok(keyboard)
}
