//! Keyboard matrix assignment.
//!
//! Fills the `pin_low`/`pin_high` fields of an ordered key sequence. The
//! row strategy derives the matrix from the physical rows; the product
//! strategies split the IO lines in half and hand out (low, high) pairs.

use serde::Serialize;
use tracing::debug;

use super::layout::row_ranges;
use crate::error::{KbError, Result};
use crate::models::Key;

/// Dimensions of an assigned matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixShape {
    /// Number of row lines
    pub rows: usize,
    /// Number of column lines
    pub cols: usize,
}

impl MatrixShape {
    /// IO lines consumed by the matrix.
    #[must_use]
    pub const fn io_lines(&self) -> usize {
        self.rows + self.cols
    }
}

/// Assigns one matrix row per physical row and one column per position in
/// the longest row.
///
/// Key `c` of row `r` gets `pin_low = r` and `pin_high = R + c` where `R` is
/// the row count. Fails before touching any key when `R + C > io`.
pub fn fill_matrix_rows(keys: &mut [Key], io: usize) -> Result<MatrixShape> {
    let ranges = row_ranges(keys);
    let shape = MatrixShape {
        rows: ranges.len(),
        cols: ranges.iter().map(|r| r.len()).max().unwrap_or(0),
    };

    if shape.io_lines() > io {
        return Err(KbError::MatrixCapacity {
            rows: shape.rows,
            cols: shape.cols,
            available: io,
        });
    }

    for (row, range) in ranges.into_iter().enumerate() {
        for (col, key) in keys[range].iter_mut().enumerate() {
            key.pin_low = Some(row);
            key.pin_high = Some(shape.rows + col);
        }
    }

    debug!(
        rows = shape.rows,
        cols = shape.cols,
        io,
        "assigned row-based matrix"
    );
    Ok(shape)
}

/// All (low, high) pairs of the split matrix: `[0, io/2) × [io/2, io)`.
fn pin_pairs(io: usize) -> Vec<(usize, usize)> {
    let half = io / 2;
    (0..half)
        .flat_map(|low| (half..io).map(move |high| (low, high)))
        .collect()
}

fn check_pairs(keys: &[Key], pairs: &[(usize, usize)], io: usize) -> Result<()> {
    if keys.len() > pairs.len() {
        return Err(KbError::MatrixFull {
            keys: keys.len(),
            pairs: pairs.len(),
            io,
        });
    }
    Ok(())
}

/// Assigns matrix pairs to keys in sequence order.
///
/// Only meant for quick experiments; the wiring ignores the physical layout.
pub fn fill_matrix(keys: &mut [Key], io: usize) -> Result<()> {
    let pairs = pin_pairs(io);
    check_pairs(keys, &pairs, io)?;

    for (key, (low, high)) in keys.iter_mut().zip(pairs) {
        key.pin_low = Some(low);
        key.pin_high = Some(high);
    }
    Ok(())
}

/// Assigns matrix pairs drawn at random from the split matrix.
///
/// Demonstrates a worst-case wiring. The draw is fully determined by `seed`.
pub fn fill_matrix_random(keys: &mut [Key], io: usize, seed: u64) -> Result<()> {
    let mut pairs = pin_pairs(io);
    check_pairs(keys, &pairs, io)?;

    let mut rng = SplitMix64::new(seed);
    for key in keys.iter_mut() {
        let (low, high) = pairs.remove(rng.below(pairs.len()));
        key.pin_low = Some(low);
        key.pin_high = Some(high);
    }
    Ok(())
}

/// Deterministic SplitMix64 generator.
#[derive(Debug, Clone)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform index in `[0, bound)`; `bound` must be non-zero.
    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn keys_in_rows(lengths: &[usize]) -> Vec<Key> {
        let mut keys = Vec::new();
        for (row, &len) in lengths.iter().enumerate() {
            for col in 0..len {
                keys.push(Key::new(col as f64 * 19.05, -(row as f64) * 19.05, 0.0));
            }
        }
        keys
    }

    #[test]
    fn test_fill_matrix_rows_three_two() {
        let mut keys = keys_in_rows(&[3, 2]);
        let shape = fill_matrix_rows(&mut keys, 18).unwrap();
        assert_eq!(shape, MatrixShape { rows: 2, cols: 3 });

        let pins: Vec<(usize, usize)> = keys.iter().filter_map(Key::pins).collect();
        assert_eq!(pins, vec![(0, 2), (0, 3), (0, 4), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_fill_matrix_rows_capacity() {
        let mut keys = keys_in_rows(&[15, 15, 15, 15]);
        let err = fill_matrix_rows(&mut keys, 18).unwrap_err();
        assert!(matches!(
            err,
            KbError::MatrixCapacity {
                rows: 4,
                cols: 15,
                available: 18
            }
        ));
        assert!(keys.iter().all(|k| k.pins().is_none()));
    }

    #[test]
    fn test_fill_matrix_sequential() {
        let mut keys = keys_in_rows(&[4]);
        fill_matrix(&mut keys, 18).unwrap();
        let pins: Vec<(usize, usize)> = keys.iter().filter_map(Key::pins).collect();
        assert_eq!(pins, vec![(0, 9), (0, 10), (0, 11), (0, 12)]);
    }

    #[test]
    fn test_fill_matrix_too_many_keys() {
        let mut keys = keys_in_rows(&[5]);
        let err = fill_matrix(&mut keys, 4).unwrap_err();
        assert!(matches!(err, KbError::MatrixFull { keys: 5, pairs: 4, io: 4 }));
    }

    #[test]
    fn test_fill_matrix_random_is_deterministic_and_unique() {
        let mut a = keys_in_rows(&[10, 10, 10]);
        let mut b = a.clone();
        fill_matrix_random(&mut a, 18, 0).unwrap();
        fill_matrix_random(&mut b, 18, 0).unwrap();
        assert_eq!(a, b);

        let unique: HashSet<(usize, usize)> = a.iter().filter_map(Key::pins).collect();
        assert_eq!(unique.len(), 30);
        assert!(unique.iter().all(|&(low, high)| low < 9 && (9..18).contains(&high)));
    }

    #[test]
    fn test_fill_matrix_random_seed_changes_draw() {
        let mut a = keys_in_rows(&[10]);
        let mut b = a.clone();
        fill_matrix_random(&mut a, 18, 1).unwrap();
        fill_matrix_random(&mut b, 18, 2).unwrap();
        assert_ne!(a, b);
    }
}
