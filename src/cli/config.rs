//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use std::path::Path;

use crate::cli::common::{to_json, CliError, CliResult};
use crate::config::Config;

/// Configuration management commands
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug, Clone)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug, Clone)]
pub struct ConfigSetArgs {
    /// Key pitch in millimetres
    #[arg(long)]
    pitch: Option<f64>,

    /// Arc segments per quarter circle
    #[arg(long)]
    resolution: Option<u32>,

    /// Default concave radius of tight outlines
    #[arg(long)]
    concave: Option<f64>,

    /// Default convex radius of tight outlines
    #[arg(long)]
    convex: Option<f64>,

    /// Default corner radius of hull and rectangle outlines
    #[arg(long)]
    corner_radius: Option<f64>,

    /// Seed of the random matrix strategy
    #[arg(long)]
    seed: Option<u64>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self, config: &Config, path: Option<&Path>) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(config),
            ConfigCommand::Set(args) => args.execute(config.clone(), path),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        if self.json {
            println!("{}", to_json(config)?);
        } else {
            let text = toml::to_string_pretty(config)
                .map_err(|e| CliError::io(format!("Failed to serialize configuration: {e}")))?;
            print!("{text}");
        }
        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self, mut config: Config, path: Option<&Path>) -> CliResult<()> {
        let mut changed = false;
        let mut apply = |target: &mut f64, value: Option<f64>| {
            if let Some(value) = value {
                *target = value;
                changed = true;
            }
        };
        apply(&mut config.geometry.pitch, self.pitch);
        apply(&mut config.outline.concave, self.concave);
        apply(&mut config.outline.convex, self.convex);
        apply(&mut config.outline.corner_radius, self.corner_radius);
        if let Some(resolution) = self.resolution {
            config.geometry.resolution = resolution;
            changed = true;
        }
        if let Some(seed) = self.seed {
            config.matrix.seed = seed;
            changed = true;
        }

        if !changed {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --pitch, --resolution, \
                 --concave, --convex, --corner-radius or --seed",
            ));
        }

        config.validate()?;

        let saved = match path {
            Some(path) => config.save_to(path).map(|()| path.to_path_buf()),
            None => config.save().and_then(|()| Config::config_file_path()),
        };
        let target = saved
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated: {}", target.display());
        Ok(())
    }
}
