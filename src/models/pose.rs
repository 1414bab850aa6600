//! Planar pose algebra.
//!
//! Coordinates are millimetres with +x to the right and +y upwards; angles
//! are degrees, counter-clockwise positive. The `flip` flag marks a part that
//! sits on the back side of the board.

use serde::{Deserialize, Serialize};

/// A point in the keyboard plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in millimetres
    pub x: f64,
    /// Y coordinate in millimetres
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Position plus orientation of a key or component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X coordinate in millimetres
    pub x: f64,
    /// Y coordinate in millimetres
    pub y: f64,
    /// Rotation in degrees, counter-clockwise
    #[serde(default)]
    pub r: f64,
    /// Placed on the back side
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flip: bool,
}

impl Pose {
    /// Creates an unflipped pose.
    #[must_use]
    pub const fn new(x: f64, y: f64, r: f64) -> Self {
        Self {
            x,
            y,
            r,
            flip: false,
        }
    }

    /// Sets the flip flag.
    #[must_use]
    pub const fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Composes a relative offset expressed in this pose's rotated frame.
    ///
    /// `flip` toggles the current flag rather than overwriting it.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64, dr: f64, flip: bool) -> Self {
        let (sin, cos) = self.r.to_radians().sin_cos();
        Self {
            x: self.x + cos * dx - sin * dy,
            y: self.y + cos * dy + sin * dx,
            r: self.r + dr,
            flip: self.flip ^ flip,
        }
    }

    /// Shifts the pose in world coordinates.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Rotates the pose about `origin` by `angle` degrees, turning its
    /// orientation by the same amount.
    #[must_use]
    pub fn rotate_about(&self, origin: Position, angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        Self {
            x: origin.x + dx * cos - dy * sin,
            y: origin.y + dx * sin + dy * cos,
            r: self.r + angle,
            flip: self.flip,
        }
    }

    /// Mirror image across the y axis.
    #[must_use]
    pub fn mirror(&self) -> Self {
        Self {
            x: -self.x,
            r: -self.r,
            ..*self
        }
    }

    /// Component-wise average of two poses.
    ///
    /// Angles are averaged numerically without wrap correction, so 350° and
    /// 10° average to 180°.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            r: (self.r + other.r) / 2.0,
            flip: self.flip,
        }
    }

    /// The translational part of the pose.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Maps a point given in this pose's local frame to world coordinates.
    #[must_use]
    pub fn transform(&self, local: Position) -> Position {
        let moved = self.offset(local.x, local.y, 0.0, false);
        moved.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_offset_unrotated_adds_components() {
        let p = Pose::new(1.0, 2.0, 10.0).offset(3.0, 4.0, 5.0, false);
        assert!(close(p.r, 15.0));

        let p = Pose::new(1.0, 2.0, 0.0).offset(3.0, 4.0, 0.0, false);
        assert!(close(p.x, 4.0));
        assert!(close(p.y, 6.0));
    }

    #[test]
    fn test_offset_rotated_frame() {
        // A quarter turn maps local +x onto world +y.
        let p = Pose::new(0.0, 0.0, 90.0).offset(1.0, 0.0, 0.0, false);
        assert!(close(p.x, 0.0));
        assert!(close(p.y, 1.0));

        let p = Pose::new(0.0, 0.0, 90.0).offset(0.0, 1.0, 0.0, false);
        assert!(close(p.x, -1.0));
        assert!(close(p.y, 0.0));
    }

    #[test]
    fn test_offset_flip_toggles() {
        let base = Pose::new(0.0, 0.0, 0.0).with_flip(true);
        assert!(!base.offset(0.0, 0.0, 0.0, true).flip);
        assert!(base.offset(0.0, 0.0, 0.0, false).flip);
    }

    #[test]
    fn test_midpoint_without_wrap_correction() {
        let a = Pose::new(0.0, 0.0, 350.0);
        let b = Pose::new(2.0, 4.0, 10.0);
        let m = a.midpoint(&b);
        assert!(close(m.x, 1.0));
        assert!(close(m.y, 2.0));
        assert!(close(m.r, 180.0));
    }

    #[test]
    fn test_rotate_about_origin() {
        let p = Pose::new(1.0, 0.0, 0.0).rotate_about(Position::default(), 90.0);
        assert!(close(p.x, 0.0));
        assert!(close(p.y, 1.0));
        assert!(close(p.r, 90.0));
    }

    #[test]
    fn test_mirror_negates_x_and_rotation() {
        let p = Pose::new(3.0, 4.0, 15.0).mirror();
        assert_eq!(p, Pose::new(-3.0, 4.0, -15.0));
    }
}
