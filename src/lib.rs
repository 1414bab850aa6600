//! kbforge library
//!
//! Compiles a declarative keyboard description into a board outline, a
//! switch matrix, a hierarchical netlist, a mounting plate and QMK
//! firmware metadata, and converts layouts to and from the compact KLE
//! format.

pub mod circuit;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod firmware;
pub mod models;
pub mod parser;
pub mod services;

pub use error::{KbError, Result};
