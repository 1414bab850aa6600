//! Placed keys and their stabilizers.

use serde::{Deserialize, Serialize};

use super::pose::{Pose, Position};

/// Stabilizer bound to a wide or tall key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stabilizer {
    /// Stabilizer size in keyboard units (2 or 6.25)
    pub size: f64,
    /// Rotation relative to the key in degrees
    #[serde(default)]
    pub r: f64,
}

/// A single key switch position on the keyboard.
///
/// The pose is the centre of the key cap. Width and height are multiples
/// of the keyboard pitch; the pin fields stay unset until a matrix strategy
/// assigns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Centre pose of the key
    pub pose: Pose,
    /// Width in keyboard units (default 1.0)
    #[serde(default = "default_unit", skip_serializing_if = "is_unit")]
    pub unit_width: f64,
    /// Height in keyboard units (default 1.0)
    #[serde(default = "default_unit", skip_serializing_if = "is_unit")]
    pub unit_height: f64,
    /// Optional stabilizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stabilizer: Option<Stabilizer>,
    /// Switch rotation relative to the key in degrees
    #[serde(default, skip_serializing_if = "is_zero")]
    pub switch_r: f64,
    /// Matrix line driving the key (row)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_low: Option<usize>,
    /// Matrix line sensing the key (column)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_high: Option<usize>,
}

fn default_unit() -> f64 {
    1.0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_unit(value: &f64) -> bool {
    *value == 1.0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl Key {
    /// Creates a 1u key centred at the given pose.
    #[must_use]
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self::at(Pose::new(x, y, r))
    }

    /// Creates a 1u key at `pose`.
    #[must_use]
    pub const fn at(pose: Pose) -> Self {
        Self {
            pose,
            unit_width: 1.0,
            unit_height: 1.0,
            stabilizer: None,
            switch_r: 0.0,
            pin_low: None,
            pin_high: None,
        }
    }

    /// Sets the key size in keyboard units.
    #[must_use]
    pub const fn with_size(mut self, unit_width: f64, unit_height: f64) -> Self {
        self.unit_width = unit_width;
        self.unit_height = unit_height;
        self
    }

    /// Sets both matrix pins.
    #[must_use]
    pub const fn with_pins(mut self, low: usize, high: usize) -> Self {
        self.pin_low = Some(low);
        self.pin_high = Some(high);
        self
    }

    /// Returns a copy placed at `pose`, keeping size and stabilizer.
    ///
    /// Matrix pins are dropped since the copy is a different switch.
    #[must_use]
    pub fn moved_to(&self, pose: Pose) -> Self {
        Self {
            pose,
            pin_low: None,
            pin_high: None,
            ..self.clone()
        }
    }

    /// Matrix pin pair when both pins are assigned.
    #[must_use]
    pub const fn pins(&self) -> Option<(usize, usize)> {
        match (self.pin_low, self.pin_high) {
            (Some(low), Some(high)) => Some((low, high)),
            _ => None,
        }
    }

    /// Width and height of the key footprint in millimetres.
    #[must_use]
    pub fn size_mm(&self, pitch: f64) -> (f64, f64) {
        (self.unit_width * pitch, self.unit_height * pitch)
    }

    /// Corners of the key's placeholder rectangle, counter-clockwise,
    /// starting at the bottom-left corner.
    #[must_use]
    pub fn placeholder_corners(&self, pitch: f64) -> [Position; 4] {
        let (w, h) = self.size_mm(pitch);
        let (hw, hh) = (w / 2.0, h / 2.0);
        [
            self.pose.transform(Position::new(-hw, -hh)),
            self.pose.transform(Position::new(hw, -hh)),
            self.pose.transform(Position::new(hw, hh)),
            self.pose.transform(Position::new(-hw, hh)),
        ]
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum x
    pub min_x: f64,
    /// Minimum y
    pub min_y: f64,
    /// Maximum x
    pub max_x: f64,
    /// Maximum y
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of a point set, `None` when empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Position>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self {
                    min_x: p.x,
                    min_y: p.y,
                    max_x: p.x,
                    max_y: p.y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(p.x),
                    min_y: b.min_y.min(p.y),
                    max_x: b.max_x.max(p.x),
                    max_y: b.max_y.max(p.y),
                },
            })
        })
    }

    /// Bounds of every key placeholder.
    pub fn of_placeholders(keys: &[Key], pitch: f64) -> Option<Self> {
        let corners: Vec<Position> = keys
            .iter()
            .flat_map(|k| k.placeholder_corners(pitch))
            .collect();
        Self::from_points(&corners)
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
