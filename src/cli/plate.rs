//! Plate command: generate the switch mounting plate.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{
    keyboard_outline, load_keyboard, ring_to_pairs, to_json, write_output, CliResult,
};
use crate::config::Config;
use crate::services::{generate_plate, Outline, PlateOptions};

/// Generate the switch plate
#[derive(Debug, Clone, Args)]
pub struct PlateArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Also cut the mounting holes
    #[arg(long)]
    pub mounting_holes: bool,

    /// Leave out the switch openings
    #[arg(long)]
    pub no_cutouts: bool,

    /// Write the plate geometry (JSON) to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlateResponse {
    openings: usize,
    area: f64,
    exterior: Vec<[f64; 2]>,
    holes: Vec<Vec<[f64; 2]>>,
}

impl PlateArgs {
    /// Execute the plate command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let keyboard = load_keyboard(&self.keyboard)?;
        let outline = Outline::new(keyboard_outline(&keyboard, config)?);
        let options = PlateOptions {
            cutouts: !self.no_cutouts,
            mounting_holes: self.mounting_holes,
        };

        let plate = generate_plate(&keyboard, &outline, options, &config.plate, &config.geometry)?;
        let response = PlateResponse {
            openings: plate.holes.len(),
            area: plate.area(),
            exterior: ring_to_pairs(&plate.exterior),
            holes: plate.holes.iter().map(|h| ring_to_pairs(h)).collect(),
        };

        if self.output.is_some() || self.json {
            let json = to_json(&response)?;
            if self.output.is_some() {
                write_output(self.output.as_ref(), &json)?;
            }
            if self.json {
                println!("{json}");
                return Ok(());
            }
        }

        println!("✓ Plate generated");
        println!("  Openings: {}", response.openings);
        println!("  Area:     {:.2} mm²", response.area);
        if let Some(path) = &self.output {
            println!("  Written to {}", path.display());
        }
        Ok(())
    }
}
