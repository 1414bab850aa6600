//! Keyboard description: keys plus the electrical and mechanical choices
//! that turn them into a board.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::key::Key;
use super::pose::{Pose, Position};
use crate::config::OutlineConfig;
use crate::error::KbError;

/// Microcontroller driving the key matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Controller {
    /// SparkFun Pro Micro daughterboard
    ProMicro,
    /// Bare ATmega32U4 with a USB-C port
    Atmega32u4,
    /// Bare ATmega32U4 behind a two-port SL2.1A USB hub
    Atmega32u4Hub2,
    /// Bare STM32F072 with a USB-C port
    #[default]
    Stm32f072,
}

impl Controller {
    /// All supported controllers.
    pub const ALL: [Self; 4] = [
        Self::ProMicro,
        Self::Atmega32u4,
        Self::Atmega32u4Hub2,
        Self::Stm32f072,
    ];

    /// Kebab-case identifier used in description files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProMicro => "pro-micro",
            Self::Atmega32u4 => "atmega32u4",
            Self::Atmega32u4Hub2 => "atmega32u4-hub2",
            Self::Stm32f072 => "stm32f072",
        }
    }

    /// Firmware pin names indexed by matrix line number.
    #[must_use]
    pub const fn matrix_pin_names(self) -> &'static [&'static str] {
        match self {
            Self::ProMicro => &[
                "D3", "D2", "D1", "D0", "D4", "C6", "D7", "E6", "B4", "B5", "B6", "B2", "B3",
                "B1", "F7", "F6", "F5", "F4",
            ],
            Self::Atmega32u4 | Self::Atmega32u4Hub2 => &[
                "B0", "B7", "D0", "D1", "D2", "D3", "D5", "D4", "D6", "D7", "B4", "B5", "B6",
                "C6", "C7", "F7", "F6", "F5", "F4", "F1", "F0", "E6",
            ],
            Self::Stm32f072 => &[
                "C13", "C14", "C15", "F0", "F1", "A0", "A1", "A2", "A3", "A4", "A5", "A6", "A7",
                "B0", "B1", "B2", "B10", "B11", "B12", "B13", "B14", "B15", "A8", "A9", "A10",
                "B3", "B4", "B5", "B6", "B7", "B8", "B9",
            ],
        }
    }

    /// Number of IO lines available to the key matrix.
    #[must_use]
    pub const fn io_lines(self) -> usize {
        self.matrix_pin_names().len()
    }

    /// QMK processor identifier.
    #[must_use]
    pub const fn processor(self) -> &'static str {
        match self {
            Self::ProMicro | Self::Atmega32u4 | Self::Atmega32u4Hub2 => "atmega32u4",
            Self::Stm32f072 => "STM32F072",
        }
    }

    /// QMK bootloader identifier.
    #[must_use]
    pub const fn bootloader(self) -> &'static str {
        match self {
            Self::ProMicro => "caterina",
            Self::Atmega32u4 | Self::Atmega32u4Hub2 => "atmel-dfu",
            Self::Stm32f072 => "stm32-dfu",
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Controller {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| KbError::UnknownController(s.to_string()))
    }
}

impl TryFrom<String> for Controller {
    type Error = KbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Controller> for String {
    fn from(value: Controller) -> Self {
        value.as_str().to_string()
    }
}

/// Switch footprint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Switch {
    /// Cherry MX compatible, PCB mount
    #[default]
    CherryMx,
}

impl Switch {
    /// Kebab-case identifier used in description files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CherryMx => "cherry-mx",
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Switch {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cherry-mx" => Ok(Self::CherryMx),
            other => Err(KbError::UnknownSwitch(other.to_string())),
        }
    }
}

impl TryFrom<String> for Switch {
    type Error = KbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Switch> for String {
    fn from(value: Switch) -> Self {
        value.as_str().to_string()
    }
}

/// Outline synthesis strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutlineKind {
    /// Follows the key placeholders with rounded corners
    Tight,
    /// Rounded convex hull of the placeholders
    #[default]
    ConvexHull,
    /// Rounded bounding rectangle of the placeholders
    Rectangle,
}

impl OutlineKind {
    /// Kebab-case identifier used in description files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::ConvexHull => "convex-hull",
            Self::Rectangle => "rectangle",
        }
    }
}

impl fmt::Display for OutlineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlineKind {
    type Err = KbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tight" => Ok(Self::Tight),
            "convex-hull" => Ok(Self::ConvexHull),
            "rectangle" => Ok(Self::Rectangle),
            other => Err(KbError::UnknownOutline(other.to_string())),
        }
    }
}

impl TryFrom<String> for OutlineKind {
    type Error = KbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutlineKind> for String {
    fn from(value: OutlineKind) -> Self {
        value.as_str().to_string()
    }
}

/// Outline choices stored with a keyboard; unset radii fall back to the
/// configured defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlineSettings {
    /// Strategy
    #[serde(default)]
    pub kind: OutlineKind,
    /// Concave radius (tight outlines)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concave: Option<f64>,
    /// Convex radius (tight outlines)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convex: Option<f64>,
    /// Corner radius (convex hull and rectangle outlines)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
}

impl OutlineSettings {
    /// Fills unset radii from the configured defaults.
    #[must_use]
    pub fn resolve(&self, defaults: &OutlineConfig) -> OutlineSpec {
        OutlineSpec {
            kind: self.kind,
            concave: self.concave.unwrap_or(defaults.concave),
            convex: self.convex.unwrap_or(defaults.convex),
            corner_radius: self.corner_radius.unwrap_or(defaults.corner_radius),
        }
    }
}

/// Fully specified outline request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineSpec {
    /// Strategy
    pub kind: OutlineKind,
    /// Concave radius
    pub concave: f64,
    /// Convex radius
    pub convex: f64,
    /// Corner radius
    pub corner_radius: f64,
}

/// QMK firmware metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QmkSettings {
    /// Community layout name (emitted as `LAYOUT_<name>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Key indices in firmware layout order; empty means keyboard order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layout_sequence: Vec<usize>,
    /// USB product id
    #[serde(default = "default_usb_pid")]
    pub usb_pid: String,
    /// USB device version
    #[serde(default = "default_device_version")]
    pub device_version: String,
}

fn default_usb_pid() -> String {
    "0x23B0".to_string()
}

fn default_device_version() -> String {
    "0x0001".to_string()
}

impl Default for QmkSettings {
    fn default() -> Self {
        Self {
            layout: None,
            layout_sequence: Vec::new(),
            usb_pid: default_usb_pid(),
            device_version: default_device_version(),
        }
    }
}

/// A complete keyboard description.
///
/// Keys are an ordered sequence; row detection, matrix assignment and
/// component numbering all depend on that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Human readable name
    pub name: String,
    /// Project URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Text placed on the board silkscreen
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info_text: String,
    /// Matrix controller
    #[serde(default)]
    pub controller: Controller,
    /// Switch family
    #[serde(default)]
    pub switch: Switch,
    /// Keys in layout order
    #[serde(default)]
    pub keys: Vec<Key>,
    /// Mounting hole centres
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hole_positions: Vec<Position>,
    /// Mounting hole diameter in millimetres
    #[serde(default = "default_hole_diameter")]
    pub hole_diameter: f64,
    /// Outline strategy and radii
    #[serde(default)]
    pub outline: OutlineSettings,
    /// Previously generated outline ring, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outline_polygon: Vec<Position>,
    /// Controller placement
    #[serde(default)]
    pub controller_pose: Pose,
    /// USB connector placement
    #[serde(default)]
    pub connector_pose: Pose,
    /// Silkscreen text placement
    #[serde(default)]
    pub info_pose: Pose,
    /// Downstream USB port placements (hub controllers only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usb_downstream_poses: Vec<Pose>,
    /// Firmware metadata
    #[serde(default)]
    pub qmk: QmkSettings,
}

fn default_hole_diameter() -> f64 {
    2.4
}

impl Keyboard {
    /// Creates an empty keyboard.
    pub fn new(name: impl Into<String>, controller: Controller) -> Self {
        Self {
            name: name.into(),
            url: None,
            info_text: String::new(),
            controller,
            switch: Switch::default(),
            keys: Vec::new(),
            hole_positions: Vec::new(),
            hole_diameter: default_hole_diameter(),
            outline: OutlineSettings::default(),
            outline_polygon: Vec::new(),
            controller_pose: Pose::default(),
            connector_pose: Pose::default(),
            info_pose: Pose::default(),
            usb_downstream_poses: Vec::new(),
            qmk: QmkSettings::default(),
        }
    }

    /// Sets the keys.
    pub fn with_keys(mut self, keys: Vec<Key>) -> Self {
        self.keys = keys;
        self
    }

    /// Number of keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Sorted, de-duplicated matrix lines used by any key.
    #[must_use]
    pub fn used_matrix_lines(&self) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .keys
            .iter()
            .filter_map(Key::pins)
            .flat_map(|(low, high)| [low, high])
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_parse_roundtrip() {
        for controller in Controller::ALL {
            assert_eq!(controller.as_str().parse::<Controller>().unwrap(), controller);
        }
        assert!(matches!(
            "teensy".parse::<Controller>(),
            Err(KbError::UnknownController(_))
        ));
    }

    #[test]
    fn test_controller_io_lines() {
        assert_eq!(Controller::ProMicro.io_lines(), 18);
        assert_eq!(Controller::Atmega32u4.io_lines(), 22);
        assert_eq!(Controller::Stm32f072.io_lines(), 32);
    }

    #[test]
    fn test_outline_kind_parse() {
        assert_eq!("tight".parse::<OutlineKind>().unwrap(), OutlineKind::Tight);
        assert_eq!(
            "convex-hull".parse::<OutlineKind>().unwrap(),
            OutlineKind::ConvexHull
        );
        let err = "blob".parse::<OutlineKind>().unwrap_err();
        assert!(err.to_string().contains("blob"));
    }

    #[test]
    fn test_keyboard_deserialize_rejects_unknown_switch() {
        let json = r#"{"name": "x", "switch": "alps"}"#;
        let err = serde_json::from_str::<Keyboard>(json).unwrap_err();
        assert!(err.to_string().contains("alps"));
    }

    #[test]
    fn test_keyboard_deserialize_defaults() {
        let json = r#"{"name": "mini", "keys": [{"pose": {"x": 0, "y": 0}}]}"#;
        let kb: Keyboard = serde_json::from_str(json).unwrap();
        assert_eq!(kb.controller, Controller::Stm32f072);
        assert_eq!(kb.switch, Switch::CherryMx);
        assert_eq!(kb.outline.kind, OutlineKind::ConvexHull);
        assert_eq!(kb.key_count(), 1);
        assert_eq!(kb.qmk.usb_pid, "0x23B0");
    }

    #[test]
    fn test_outline_settings_resolve() {
        let settings = OutlineSettings {
            kind: OutlineKind::Tight,
            concave: Some(4.0),
            convex: None,
            corner_radius: None,
        };
        let spec = settings.resolve(&OutlineConfig::default());
        assert_eq!(spec.concave, 4.0);
        assert_eq!(spec.convex, 1.5);
    }

    #[test]
    fn test_used_matrix_lines() {
        let kb = Keyboard::new("t", Controller::ProMicro).with_keys(vec![
            Key::new(0.0, 0.0, 0.0).with_pins(0, 3),
            Key::new(1.0, 0.0, 0.0).with_pins(0, 4),
            Key::new(2.0, 0.0, 0.0),
        ]);
        assert_eq!(kb.used_matrix_lines(), vec![0, 3, 4]);
    }
}
