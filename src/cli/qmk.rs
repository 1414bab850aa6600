//! QMK command: emit the data-driven `info.json` keyboard definition.

use clap::Args;
use std::path::PathBuf;

use crate::cli::common::{load_keyboard, to_json, write_output, CliResult};
use crate::config::Config;
use crate::firmware::qmk_info;

/// Generate QMK info.json
#[derive(Debug, Clone, Args)]
pub struct QmkArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Write info.json to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl QmkArgs {
    /// Execute the qmk command
    pub fn execute(&self, config: &Config) -> CliResult<()> {
        let keyboard = load_keyboard(&self.keyboard)?;
        let info = qmk_info(&keyboard, config.geometry.pitch)?;
        write_output(self.output.as_ref(), &to_json(&info)?)?;

        if let Some(path) = &self.output {
            eprintln!(
                "✓ Wrote {} ({} keys, {}×{} matrix)",
                path.display(),
                info.key_count,
                info.height,
                info.width
            );
        }
        Ok(())
    }
}
