//! Matrix command: assign switch matrix pins to every key.

use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{load_keyboard, save_keyboard, to_json, CliResult};
use crate::config::Config;
use crate::services::{fill_matrix, fill_matrix_random, fill_matrix_rows};

/// Pin assignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// One matrix row per physical row
    Rows,
    /// Pairs of the split IO lines in key order
    Product,
    /// Shuffled pairs of the split IO lines
    Random,
}

/// Assign matrix pins
#[derive(Debug, Clone, Args)]
pub struct MatrixArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Assignment strategy
    #[arg(long, value_enum, default_value_t = Strategy::Rows)]
    pub strategy: Strategy,

    /// Seed for the random strategy (defaults to the configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Store the assignment in the description file
    #[arg(long)]
    pub save: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct KeyPins {
    index: usize,
    low: Option<usize>,
    high: Option<usize>,
}

#[derive(Debug, Serialize)]
struct MatrixResponse {
    controller: String,
    io_lines: usize,
    used_lines: usize,
    keys: Vec<KeyPins>,
}

impl MatrixArgs {
    /// Execute the matrix command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let mut keyboard = load_keyboard(&self.keyboard)?;
        let io = keyboard.controller.io_lines();

        match self.strategy {
            Strategy::Rows => {
                fill_matrix_rows(&mut keyboard.keys, io)?;
            }
            Strategy::Product => fill_matrix(&mut keyboard.keys, io)?,
            Strategy::Random => fill_matrix_random(
                &mut keyboard.keys,
                io,
                self.seed.unwrap_or(config.matrix.seed),
            )?,
        }

        if self.save {
            save_keyboard(&self.keyboard, &keyboard)?;
        }

        let response = MatrixResponse {
            controller: keyboard.controller.to_string(),
            io_lines: io,
            used_lines: keyboard.used_matrix_lines().len(),
            keys: keyboard
                .keys
                .iter()
                .enumerate()
                .map(|(index, key)| KeyPins {
                    index,
                    low: key.pin_low,
                    high: key.pin_high,
                })
                .collect(),
        };

        if self.json {
            println!("{}", to_json(&response)?);
        } else {
            println!(
                "✓ Matrix assigned: {} keys on {} of {} IO lines ({})",
                response.keys.len(),
                response.used_lines,
                response.io_lines,
                response.controller
            );
            let names = keyboard.controller.matrix_pin_names();
            for key in &response.keys {
                if let (Some(low), Some(high)) = (key.low, key.high) {
                    println!(
                        "  Key {:>3}: {} ({}) × {} ({})",
                        key.index, low, names[low], high, names[high]
                    );
                }
            }
            if self.save {
                println!("  Saved to {}", self.keyboard.display());
            }
        }

        Ok(())
    }
}
