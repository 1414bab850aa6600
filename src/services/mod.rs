//! Geometry and matrix services.
//!
//! Pure functions over key sequences: placement generators, outline and
//! plate synthesis, stabilizer and matrix assignment, and the KLE import
//! pipeline that chains them.

pub mod import;
pub mod layout;
pub mod matrix;
pub mod outline;
pub mod plate;
pub mod stabilizers;
mod union;

pub use import::{import_kle, ImportOptions};
pub use layout::{holes_between_keys, mirror_keys, rotate_keys, row_ranges, rows, Grid};
pub use matrix::{fill_matrix, fill_matrix_random, fill_matrix_rows, MatrixShape};
pub use outline::{
    generate_outline, generate_outline_convex_hull, generate_outline_rectangle,
    generate_outline_tight, Outline,
};
pub use plate::{generate_plate, PlateOptions};
pub use stabilizers::add_standard_stabilizers;
