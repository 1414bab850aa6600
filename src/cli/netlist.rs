//! Netlist command: assemble the keyboard circuit and resolve its nets.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::circuit::{keyboard_circuit, Netlist};
use crate::cli::common::{
    keyboard_outline, load_keyboard, ring_to_pairs, to_json, write_output, CliResult,
};
use crate::config::Config;

/// Build the keyboard circuit and print its netlist
#[derive(Debug, Clone, Args)]
pub struct NetlistArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Write the board description (JSON) to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct HoleResponse {
    x: f64,
    y: f64,
    diameter: f64,
}

#[derive(Debug, Serialize)]
struct BoardResponse<'a> {
    outline: Vec<[f64; 2]>,
    holes: Vec<HoleResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info_text: Option<&'a str>,
    netlist: &'a Netlist,
}

impl NetlistArgs {
    /// Execute the netlist command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let keyboard = load_keyboard(&self.keyboard)?;
        let outline = keyboard_outline(&keyboard, config)?;
        let circuit = keyboard_circuit(&keyboard, &outline)?;
        let netlist = circuit.netlist()?;

        let response = BoardResponse {
            outline: ring_to_pairs(&circuit.outline),
            holes: circuit
                .holes
                .iter()
                .map(|p| HoleResponse {
                    x: p.x,
                    y: p.y,
                    diameter: circuit.hole_diameter,
                })
                .collect(),
            info_text: circuit.info.as_ref().map(|i| i.text.as_str()),
            netlist: &netlist,
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

        println!("✓ Netlist resolved for {}", keyboard.name);
        println!("  Nets:       {}", netlist.nets().len());
        println!("  Components: {}", netlist.components().len());
        println!("\nComponents:");
        for component in netlist.components() {
            println!(
                "  {:<6} {:<24} {}",
                component.reference, component.path, component.footprint
            );
        }
        if let Some(path) = &self.output {
            println!("\nWritten to {}", path.display());
        }
        Ok(())
    }
}
