//! Outline command: generate the board outline of a keyboard.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{
    load_keyboard, ring_to_pairs, save_keyboard, to_json, CliError, CliResult,
};
use crate::config::Config;
use crate::models::{Bounds, OutlineKind};
use crate::services::generate_outline;

/// Generate the board outline
#[derive(Debug, Clone, Args)]
pub struct OutlineArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Override the outline strategy (tight, convex-hull, rectangle)
    #[arg(long, value_name = "KIND")]
    pub kind: Option<OutlineKind>,

    /// Store the generated outline in the description file
    #[arg(long)]
    pub save: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON response for the outline command
#[derive(Debug, Serialize)]
struct OutlineResponse {
    kind: OutlineKind,
    points: usize,
    area: f64,
    bounds: Option<Bounds>,
    exterior: Vec<[f64; 2]>,
}

impl OutlineArgs {
    /// Execute the outline command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let mut keyboard = load_keyboard(&self.keyboard)?;
        if keyboard.keys.is_empty() {
            return Err(CliError::validation("Keyboard has no keys"));
        }
        if let Some(kind) = self.kind {
            keyboard.outline.kind = kind;
        }

        let spec = keyboard.outline.resolve(&config.outline);
        let outline = generate_outline(&keyboard.keys, &spec, &config.geometry)?;

        let response = OutlineResponse {
            kind: spec.kind,
            points: outline.exterior.len(),
            area: outline.area(),
            bounds: outline.bounds(),
            exterior: ring_to_pairs(&outline.exterior),
        };

        if self.save {
            keyboard.outline_polygon = outline.exterior;
            save_keyboard(&self.keyboard, &keyboard)?;
        }

        if self.json {
            println!("{}", to_json(&response)?);
        } else {
            println!("✓ Outline ({})", response.kind);
            println!("  Points: {}", response.points);
            println!("  Area:   {:.2} mm²", response.area);
            if let Some(b) = response.bounds {
                println!(
                    "  Size:   {:.2} × {:.2} mm (x {:.2}..{:.2}, y {:.2}..{:.2})",
                    b.width(),
                    b.height(),
                    b.min_x,
                    b.max_x,
                    b.min_y,
                    b.max_y
                );
            }
            if self.save {
                println!("  Saved to {}", self.keyboard.display());
            }
        }

        Ok(())
    }
}
