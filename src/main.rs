//! kbforge - keyboard compiler
//!
//! Turns a keyboard description into outlines, plates, switch matrices,
//! netlists and QMK metadata.
//!
//! # Usage
//!
//! ```bash
//! kbforge kle import layout.json -o board.yaml --controller pro-micro
//! kbforge outline -k board.yaml --save
//! kbforge netlist -k board.yaml --json
//! kbforge qmk -k board.yaml -o info.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kbforge::cli::{
    common::load_config, CliResult, ConfigArgs, KleArgs, MatrixArgs, NetlistArgs, OutlineArgs,
    PlateArgs, QmkArgs, ValidateArgs,
};

/// kbforge - compile keyboard descriptions into boards and firmware metadata
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the board outline
    Outline(OutlineArgs),
    /// Generate the switch plate
    Plate(PlateArgs),
    /// Assign matrix pins
    Matrix(MatrixArgs),
    /// Build the circuit and resolve its netlist
    Netlist(NetlistArgs),
    /// Generate QMK info.json
    Qmk(QmkArgs),
    /// Validate a keyboard's matrix assignment
    Validate(ValidateArgs),
    /// Import or export KLE layouts
    Kle(KleArgs),
    /// Show or change the configuration
    Config(ConfigArgs),
}

fn run(cli: &Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Outline(args) => args.execute(&config),
        Command::Plate(args) => args.execute(&config),
        Command::Matrix(args) => args.execute(&config),
        Command::Netlist(args) => args.execute(&config),
        Command::Qmk(args) => args.execute(&config),
        Command::Validate(args) => args.execute(),
        Command::Kle(args) => args.execute(&config),
        Command::Config(args) => args.execute(&config, cli.config.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code().code());
    }
}
