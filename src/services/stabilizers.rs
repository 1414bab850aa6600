//! Standard stabilizer assignment for wide and tall keys.

use super::layout::row_ranges;
use crate::models::{Key, Stabilizer};

/// Stabilizer sizes available for Cherry MX switches, in keyboard units.
pub const STANDARD_SIZES: [f64; 2] = [2.0, 6.25];

/// Largest standard stabilizer that fits a key of `size` units.
#[must_use]
pub fn standard_size(size: f64) -> Option<f64> {
    STANDARD_SIZES
        .iter()
        .copied()
        .filter(|&s| s <= size)
        .reduce(f64::max)
}

fn attach(key: &mut Key, size: f64, r: f64, flip: bool) {
    let Some(size) = standard_size(size) else {
        return;
    };
    key.switch_r = r;
    key.stabilizer = Some(Stabilizer {
        size,
        r: if flip { r + 180.0 } else { r },
    });
}

/// Adds stabilizers to every key that needs one.
///
/// Horizontal keys (`w > 1`, `h == 1`) get a stabilizer along x, turned
/// around on the bottom row so the wire sits on the far side. Vertical keys
/// (`w == 1`, `h > 1`) get one along y, turned around in the last column of
/// their row. The switch is rotated to match the stabilizer.
pub fn add_standard_stabilizers(keys: &mut [Key]) {
    let ranges = row_ranges(keys);
    let row_count = ranges.len();

    for (i, range) in ranges.into_iter().enumerate() {
        let last_row = i + 1 == row_count;
        let row_len = range.len();

        for (j, key) in keys[range].iter_mut().enumerate() {
            let last_col = j + 1 == row_len;
            let (w, h) = (key.unit_width, key.unit_height);
            if w > 1.0 && h == 1.0 {
                attach(key, w, 0.0, last_row);
            } else if w == 1.0 && h > 1.0 {
                attach(key, h, 90.0, last_col);
            }
        }
    }
}
