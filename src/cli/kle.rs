//! KLE commands: import layouts from and export them to the compact
//! Keyboard Layout Editor format.

use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;

use crate::cli::common::{load_keyboard, save_keyboard, to_json, write_output, CliError, CliResult};
use crate::config::Config;
use crate::models::{Controller, Switch};
use crate::parser::kle;
use crate::services::{import_kle, ImportOptions};

/// Convert between keyboard descriptions and KLE layouts
#[derive(Debug, Clone, Args)]
pub struct KleArgs {
    /// KLE subcommand to execute
    #[command(subcommand)]
    pub command: KleCommand,
}

/// KLE subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum KleCommand {
    /// Build a keyboard description from a KLE layout
    Import(ImportArgs),
    /// Write a keyboard's keys as a KLE layout
    Export(ExportArgs),
}

/// Import a KLE layout
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// KLE raw data file (JSON)
    #[arg(value_name = "KLE_FILE")]
    pub input: PathBuf,

    /// Keyboard description to create (.json, .json5, .yaml)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Controller of the new keyboard
    #[arg(long, default_value_t = Controller::default())]
    pub controller: Controller,

    /// Switch family of the new keyboard
    #[arg(long, default_value_t = Switch::default())]
    pub switch: Switch,

    /// Do not add stabilizers to wide keys
    #[arg(long)]
    pub no_stabilizers: bool,

    /// Do not assign matrix pins
    #[arg(long)]
    pub no_matrix: bool,
}

/// Export a KLE layout
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Write the KLE layout to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Move the top-left key corner to the KLE origin
    #[arg(long)]
    pub normalize: bool,
}

impl KleArgs {
    /// Execute the selected KLE subcommand
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        match &self.command {
            KleCommand::Import(args) => args.execute(config),
            KleCommand::Export(args) => args.execute(config),
        }
    }
}

impl ImportArgs {
    /// Execute the import subcommand
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let text = fs::read_to_string(&self.input)
            .map_err(|e| CliError::io(format!("Failed to read {}: {e}", self.input.display())))?;
        let doc = kle::parse(&text)?;

        let options = ImportOptions {
            controller: self.controller,
            switch: self.switch,
            stabilizers: !self.no_stabilizers,
            matrix: !self.no_matrix,
        };
        let keyboard = import_kle(&doc, &options, config)?;
        save_keyboard(&self.output, &keyboard)?;

        println!(
            "✓ Imported {} keys as '{}' into {}",
            keyboard.key_count(),
            keyboard.name,
            self.output.display()
        );
        Ok(())
    }
}

impl ExportArgs {
    /// Execute the export subcommand
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let keyboard = load_keyboard(&self.keyboard)?;
        let options = kle::EncodeOptions {
            name: Some(keyboard.name.clone()).filter(|n| !n.is_empty()),
            outline: Some(keyboard.outline.kind),
            normalize: self.normalize,
        };
        let doc = kle::encode(&keyboard.keys, &options, config.geometry.pitch);
        write_output(self.output.as_ref(), &to_json(&doc)?)
    }
}
