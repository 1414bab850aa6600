//! CLI command handlers for kbforge.
//!
//! Each subcommand loads a keyboard description, runs one stage of the
//! compiler and prints a human-readable summary or, with `--json`, a
//! machine-readable document on stdout.

pub mod common;
pub mod config;
pub mod kle;
pub mod matrix;
pub mod netlist;
pub mod outline;
pub mod plate;
pub mod qmk;
pub mod validate;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use kle::KleArgs;
pub use matrix::MatrixArgs;
pub use netlist::NetlistArgs;
pub use outline::OutlineArgs;
pub use plate::PlateArgs;
pub use qmk::QmkArgs;
pub use validate::ValidateArgs;
