//! Key placement generators.
//!
//! Helpers to create and rearrange ordered key sequences: straight and
//! arc-shaped grids, half-angle rotation, mirrored split halves and hole
//! placement between keys. Every generator takes its pitch explicitly.

use std::ops::Range;

use crate::config::GeometryConfig;
use crate::error::{KbError, Result};
use crate::models::{Bounds, Key, Pose, Position};

/// Straight or arc-shaped key grid.
///
/// With `arc_radius == 0` keys sit on a plain grid. Otherwise each row is
/// bent around a pivot below the base column so neighbouring keys touch at
/// their inner edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Key pitch in millimetres
    pub pitch: f64,
    /// Offset added to every x coordinate
    pub x_offset: f64,
    /// Offset added to every y coordinate
    pub y_offset: f64,
    /// Arc radius of the base row; 0 disables the arc
    pub arc_radius: f64,
    /// Row whose arc has exactly `arc_radius`
    pub arc_base_row: i32,
    /// Column that stays unrotated
    pub arc_base_col: i32,
}

impl Grid {
    /// Creates a straight grid with the given pitch.
    #[must_use]
    pub const fn new(pitch: f64) -> Self {
        Self {
            pitch,
            x_offset: 0.0,
            y_offset: 0.0,
            arc_radius: 0.0,
            arc_base_row: 0,
            arc_base_col: 2,
        }
    }

    /// Creates a straight grid using the configured pitch.
    #[must_use]
    pub const fn from_config(config: &GeometryConfig) -> Self {
        Self::new(config.pitch)
    }

    /// Sets the grid offset.
    #[must_use]
    pub const fn with_offset(mut self, x_offset: f64, y_offset: f64) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }

    /// Bends rows into arcs of `radius` around `base_col`/`base_row`.
    #[must_use]
    pub const fn with_arc(mut self, radius: f64, base_col: i32, base_row: i32) -> Self {
        self.arc_radius = radius;
        self.arc_base_col = base_col;
        self.arc_base_row = base_row;
        self
    }

    /// Key at `col`, `row`.
    #[must_use]
    pub fn key(&self, col: i32, row: i32) -> Key {
        Key::at(self.pose(col, row))
    }

    /// Pose of the key at `col`, `row`.
    #[must_use]
    pub fn pose(&self, col: i32, row: i32) -> Pose {
        let pitch = self.pitch;
        let y = f64::from(row) * pitch + self.y_offset;

        if self.arc_radius == 0.0 {
            return Pose::new(f64::from(col) * pitch + self.x_offset, y, 0.0);
        }

        let base = Pose::new(f64::from(self.arc_base_col) * pitch + self.x_offset, y, 0.0);
        let drop = pitch / 2.0 + self.arc_radius + f64::from(row - self.arc_base_row) * pitch;
        let pivot = Position::new(base.x, base.y - drop);

        let steps = f64::from(self.arc_base_col - col);
        let angle = steps * 2.0 * (pitch / (2.0 * self.arc_radius)).atan();
        base.rotate_about(pivot, angle.to_degrees())
    }

    /// One row of keys for `cols`.
    pub fn row(&self, cols: impl IntoIterator<Item = i32>, row: i32) -> Vec<Key> {
        cols.into_iter().map(|col| self.key(col, row)).collect()
    }
}

/// Rotates every key about the world origin by **half** of `angle`.
///
/// Callers wanting an exact rotation pass twice the angle.
pub fn rotate_keys(keys: &[Key], angle: f64) -> Vec<Key> {
    keys.iter()
        .map(|key| {
            let pose = key.pose.rotate_about(Position::default(), angle / 2.0);
            Key { pose, ..key.clone() }
        })
        .collect()
}

/// Index ranges of the rows in an ordered key sequence.
///
/// A row is a maximal run whose x coordinates never decrease; any decrease
/// starts a new row.
pub fn row_ranges(keys: &[Key]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for i in 1..keys.len() {
        if keys[i].pose.x < keys[i - 1].pose.x {
            ranges.push(start..i);
            start = i;
        }
    }
    if start < keys.len() {
        ranges.push(start..keys.len());
    }

    ranges
}

/// Rows of an ordered key sequence as slices.
pub fn rows(keys: &[Key]) -> Vec<&[Key]> {
    row_ranges(keys).into_iter().map(|r| &keys[r]).collect()
}

/// Builds a mirrored split layout.
///
/// The whole layout is shifted so its leftmost placeholder edge sits at
/// `middle_space / 2` and its lowest edge at `y = 0`. Each row then emits
/// the mirror images in reverse order followed by the originals, so output
/// key `i` mirrors key `2N - 1 - i` of that row. With `only_flip` only the
/// mirrored half is emitted.
pub fn mirror_keys(
    keys: &[Key],
    middle_space: f64,
    only_flip: bool,
    config: &GeometryConfig,
) -> Vec<Key> {
    let Some(bounds) = Bounds::of_placeholders(keys, config.pitch) else {
        return Vec::new();
    };
    let dx = -bounds.min_x + middle_space / 2.0;
    let dy = -bounds.min_y;

    let mut out = Vec::with_capacity(keys.len() * 2);
    for row in rows(keys) {
        let shifted: Vec<Key> = row
            .iter()
            .map(|key| key.moved_to(key.pose.translate(dx, dy)))
            .collect();

        out.extend(shifted.iter().rev().map(mirror_key));
        if !only_flip {
            out.extend(shifted);
        }
    }

    out
}

fn mirror_key(key: &Key) -> Key {
    let mut mirrored = key.moved_to(key.pose.mirror());
    mirrored.switch_r = -key.switch_r;
    if let Some(stab) = mirrored.stabilizer.as_mut() {
        stab.r = -stab.r;
    }
    mirrored
}

/// Mounting hole positions halfway between pairs of keys.
pub fn holes_between_keys(keys: &[Key], pairs: &[(usize, usize)]) -> Result<Vec<Position>> {
    let lookup = |index: usize| {
        keys.get(index).ok_or(KbError::KeyIndex {
            index,
            len: keys.len(),
        })
    };

    pairs
        .iter()
        .map(|&(a, b)| {
            let (ka, kb) = (lookup(a)?, lookup(b)?);
            Ok(ka.pose.midpoint(&kb.pose).position())
        })
        .collect()
}
