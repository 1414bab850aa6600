//! QMK info.json generation.
//!
//! Produces the data-driven keyboard definition QMK reads from
//! `info.json`: USB identifiers, processor, matrix pins and one physical
//! layout with the matrix position of every key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::validator::MatrixValidator;
use crate::error::Result;
use crate::models::{Key, Keyboard};

/// QMK info.json structure (the subset this tool emits)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QmkInfoJson {
    /// Keyboard name/identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_name: Option<String>,
    /// URL to keyboard information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// USB identifiers
    pub usb: UsbIds,
    /// MCU name
    pub processor: String,
    /// Bootloader name
    pub bootloader: String,
    /// Current flow through the switch matrix
    pub diode_direction: String,
    /// Firmware features and whether they are enabled
    pub features: BTreeMap<String, bool>,
    /// Number of matrix columns
    pub width: usize,
    /// Number of matrix rows
    pub height: usize,
    /// Number of keys
    pub key_count: usize,
    /// Matrix pins configuration
    pub matrix_pins: MatrixPins,
    /// Community layouts this keyboard supports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub community_layouts: Vec<String>,
    /// Available layouts
    pub layouts: BTreeMap<String, LayoutDefinition>,
}

/// USB identifiers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UsbIds {
    /// Product id
    pub pid: String,
    /// Device version
    pub device_ver: String,
}

/// Matrix pins configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatrixPins {
    /// Column pins
    pub cols: Vec<String>,
    /// Row pins
    pub rows: Vec<String>,
}

/// Layout definition
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayoutDefinition {
    /// Number of keys in the layout
    pub key_count: usize,
    /// Physical key positions and matrix assignments
    pub layout: Vec<KeyPosition>,
}

/// Key position information
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeyPosition {
    /// Matrix position [row, col]
    pub matrix: [usize; 2],
    /// Physical X position in keyboard units
    pub x: f64,
    /// Physical Y position in keyboard units, growing downwards
    pub y: f64,
    /// Key width in keyboard units (default 1.0)
    #[serde(default = "default_key_size", skip_serializing_if = "is_default_size")]
    pub w: f64,
    /// Key height in keyboard units (default 1.0)
    #[serde(default = "default_key_size", skip_serializing_if = "is_default_size")]
    pub h: f64,
    /// Rotation in degrees (default 0.0)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub r: f64,
}

fn default_key_size() -> f64 {
    1.0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_default_size(value: &f64) -> bool {
    *value == 1.0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Features switched off in the generated definition.
const DISABLED_FEATURES: [&str; 9] = [
    "backlight",
    "command",
    "console",
    "extrakey",
    "midi",
    "mousekey",
    "nkro",
    "rgblight",
    "unicode",
];

/// Name of the emitted layout macro.
#[must_use]
pub fn layout_name(keyboard: &Keyboard) -> String {
    keyboard
        .qmk
        .layout
        .as_ref()
        .map_or_else(|| "LAYOUT".to_string(), |name| format!("LAYOUT_{name}"))
}

/// Builds the QMK definition of a keyboard with an assigned matrix.
///
/// Matrix lines are compacted: the used row lines become rows `0..height`
/// and the used column lines columns `0..width`, both in line order. Key
/// positions are measured from the minimum key centre in pitches, with y
/// growing downwards.
pub fn qmk_info(keyboard: &Keyboard, pitch: f64) -> Result<QmkInfoJson> {
    MatrixValidator::new(keyboard).validate().into_result()?;

    // Validation guarantees every key has pins.
    let pins: Vec<(usize, usize)> = keyboard.keys.iter().filter_map(Key::pins).collect();
    let mut rows: Vec<usize> = pins.iter().map(|&(low, _)| low).collect();
    let mut cols: Vec<usize> = pins.iter().map(|&(_, high)| high).collect();
    rows.sort_unstable();
    rows.dedup();
    cols.sort_unstable();
    cols.dedup();

    let pin_names = keyboard.controller.matrix_pin_names();
    let names = |lines: &[usize]| -> Vec<String> {
        lines.iter().map(|&line| pin_names[line].to_string()).collect()
    };

    let min_x = keyboard.keys.iter().map(|k| k.pose.x).fold(f64::INFINITY, f64::min);
    let max_y = keyboard.keys.iter().map(|k| k.pose.y).fold(f64::NEG_INFINITY, f64::max);

    let position = |key: &Key, (low, high): (usize, usize)| KeyPosition {
        matrix: [
            rows.binary_search(&low).unwrap_or_default(),
            cols.binary_search(&high).unwrap_or_default(),
        ],
        x: (key.pose.x - min_x) / pitch,
        y: (max_y - key.pose.y) / pitch,
        w: key.unit_width,
        h: key.unit_height,
        r: key.pose.r,
    };

    let order: Vec<usize> = if keyboard.qmk.layout_sequence.is_empty() {
        (0..keyboard.keys.len()).collect()
    } else {
        keyboard.qmk.layout_sequence.clone()
    };
    let layout: Vec<KeyPosition> = order
        .iter()
        .map(|&i| position(&keyboard.keys[i], pins[i]))
        .collect();

    let mut layouts = BTreeMap::new();
    layouts.insert(
        layout_name(keyboard),
        LayoutDefinition {
            key_count: layout.len(),
            layout,
        },
    );

    debug!(rows = rows.len(), cols = cols.len(), "built QMK info");

    Ok(QmkInfoJson {
        keyboard_name: Some(keyboard.name.clone()).filter(|n| !n.is_empty()),
        url: keyboard.url.clone(),
        usb: UsbIds {
            pid: keyboard.qmk.usb_pid.clone(),
            device_ver: keyboard.qmk.device_version.clone(),
        },
        processor: keyboard.controller.processor().to_string(),
        bootloader: keyboard.controller.bootloader().to_string(),
        diode_direction: "COL2ROW".to_string(),
        features: DISABLED_FEATURES
            .iter()
            .map(|f| ((*f).to_string(), false))
            .collect(),
        width: cols.len(),
        height: rows.len(),
        key_count: keyboard.keys.len(),
        matrix_pins: MatrixPins {
            cols: names(&cols),
            rows: names(&rows),
        },
        community_layouts: keyboard.qmk.layout.iter().cloned().collect(),
        layouts,
    })
}
