//! Validation command for keyboard description files.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{load_keyboard, to_json, CliError, CliResult};
use crate::firmware::validator::MatrixValidator;

/// Validate a keyboard's matrix assignment
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to keyboard description file
    #[arg(short, long, value_name = "FILE")]
    pub keyboard: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

/// One validation finding
#[derive(Debug, Serialize)]
struct ValidationMessage {
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<usize>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

/// JSON response for the validate command
#[derive(Debug, Serialize)]
struct ValidationResponse {
    valid: bool,
    keys: usize,
    errors: Vec<ValidationMessage>,
    warnings: Vec<ValidationMessage>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let keyboard = load_keyboard(&self.keyboard)?;
        let report = MatrixValidator::new(&keyboard).validate();

        let response = ValidationResponse {
            valid: report.is_valid(),
            keys: keyboard.key_count(),
            errors: report
                .errors
                .iter()
                .map(|e| ValidationMessage {
                    severity: "error",
                    kind: Some(e.kind.to_string()),
                    key: e.key,
                    message: e.message.clone(),
                    suggestion: e.suggestion.clone(),
                })
                .collect(),
            warnings: report
                .warnings
                .iter()
                .map(|w| ValidationMessage {
                    severity: "warning",
                    kind: None,
                    key: None,
                    message: w.message.clone(),
                    suggestion: None,
                })
                .collect(),
        };

        if self.json {
            println!("{}", to_json(&response)?);
        } else {
            if response.valid {
                println!("✓ Validation passed ({} keys)", response.keys);
            } else {
                println!("✗ Validation failed");
            }

            if !report.errors.is_empty() || !report.warnings.is_empty() {
                println!("\nIssues:");
                for error in &report.errors {
                    println!("  ✗ {error}");
                }
                for warning in &report.warnings {
                    println!("  ⚠ {warning}");
                }
            }
        }

        if !response.valid {
            return Err(CliError::validation("Validation failed"));
        }
        if self.strict && !response.warnings.is_empty() {
            return Err(CliError::validation("Warnings found in strict mode"));
        }
        Ok(())
    }
}
