//! Matrix validation before firmware and netlist generation.
//!
//! This module checks that the matrix assignment of a keyboard can be
//! turned into QMK metadata: every key wired, lines used as either rows or
//! columns but never both, pins within the controller's table and no two
//! keys sharing a switch position.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use std::collections::{BTreeSet, HashMap};

use crate::constants::APP_BINARY_NAME;
use crate::error::{KbError, Result};
use crate::models::Keyboard;
use crate::services::stabilizers::standard_size;

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Problems that prevent generation
    pub errors: Vec<ValidationError>,
    /// Non-critical findings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Formats the report as a user-friendly message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            message.push_str(&format!("\n⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }

    /// Converts a failed report into an error.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(KbError::Validation(self.format_message()))
        }
    }
}

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// Index of the offending key, when one is to blame
    pub key: Option<usize>,
    /// Human-readable error message
    pub message: String,
    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Sets the key context.
    #[must_use]
    pub const fn with_key(mut self, key: usize) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key {
            write!(f, "[Key {}] {}: {}", key, self.kind, self.message)?;
        } else {
            write!(f, "{}: {}", self.kind, self.message)?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    → {suggestion}")?;
        }

        Ok(())
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Keyboard has no keys
    EmptyLayout,
    /// Key without matrix pins
    UnassignedKey,
    /// Matrix line beyond the controller's pin table
    PinOutOfRange,
    /// Matrix line used both as row and as column
    RowColumnOverlap,
    /// Two keys on the same matrix position
    DuplicatePosition,
    /// Layout sequence refers to a missing key
    InvalidLayoutSequence,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLayout => write!(f, "Empty Layout"),
            Self::UnassignedKey => write!(f, "Unassigned Key"),
            Self::PinOutOfRange => write!(f, "Pin Out of Range"),
            Self::RowColumnOverlap => write!(f, "Row/Column Overlap"),
            Self::DuplicatePosition => write!(f, "Duplicate Position"),
            Self::InvalidLayoutSequence => write!(f, "Invalid Layout Sequence"),
        }
    }
}

/// Validation warning (non-blocking).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Matrix validator.
pub struct MatrixValidator<'a> {
    keyboard: &'a Keyboard,
}

impl<'a> MatrixValidator<'a> {
    /// Creates a new matrix validator.
    #[must_use]
    pub const fn new(keyboard: &'a Keyboard) -> Self {
        Self { keyboard }
    }

    /// Validates the keyboard's matrix assignment.
    ///
    /// Checks:
    /// - The keyboard has keys and every key has both pins
    /// - Pins are within the controller's pin table
    /// - No line is used as both row and column
    /// - No two keys share a (row, column) pair
    /// - The QMK layout sequence only names existing keys
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        let kb = self.keyboard;

        if kb.keys.is_empty() {
            report.add_error(ValidationError::new(
                ValidationErrorKind::EmptyLayout,
                "keyboard has no keys",
            ));
            return report;
        }

        self.check_pins(&mut report);
        self.check_layout_sequence(&mut report);
        self.check_stabilizers(&mut report);
        report
    }

    fn check_pins(&self, report: &mut ValidationReport) {
        let kb = self.keyboard;
        let io = kb.controller.io_lines();
        let mut rows = BTreeSet::new();
        let mut cols = BTreeSet::new();
        let mut seen: HashMap<(usize, usize), usize> = HashMap::new();

        for (idx, key) in kb.keys.iter().enumerate() {
            let Some((low, high)) = key.pins() else {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::UnassignedKey,
                        "key has no matrix pins",
                    )
                    .with_key(idx)
                    .with_suggestion(format!("Run `{APP_BINARY_NAME} matrix` to assign a matrix")),
                );
                continue;
            };

            for pin in [low, high] {
                if pin >= io {
                    report.add_error(
                        ValidationError::new(
                            ValidationErrorKind::PinOutOfRange,
                            format!(
                                "pin {pin} exceeds the {io} lines of {}",
                                kb.controller
                            ),
                        )
                        .with_key(idx),
                    );
                }
            }

            if let Some(first) = seen.insert((low, high), idx) {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::DuplicatePosition,
                        format!("shares matrix position ({low}, {high}) with key {first}"),
                    )
                    .with_key(idx),
                );
            }

            rows.insert(low);
            cols.insert(high);
        }

        let overlap: Vec<String> = rows.intersection(&cols).map(ToString::to_string).collect();
        if !overlap.is_empty() {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::RowColumnOverlap,
                    format!("lines used as both row and column: {}", overlap.join(", ")),
                )
                .with_suggestion("Keep pin_low and pin_high on disjoint lines"),
            );
        }
    }

    fn check_layout_sequence(&self, report: &mut ValidationReport) {
        let kb = self.keyboard;
        let sequence = &kb.qmk.layout_sequence;
        if sequence.is_empty() {
            return;
        }

        for &idx in sequence.iter().filter(|&&idx| idx >= kb.keys.len()) {
            report.add_error(ValidationError::new(
                ValidationErrorKind::InvalidLayoutSequence,
                format!("index {idx} out of range for {} keys", kb.keys.len()),
            ));
        }

        let listed: BTreeSet<usize> = sequence.iter().copied().collect();
        let missing = (0..kb.keys.len()).filter(|i| !listed.contains(i)).count();
        if missing > 0 {
            report.add_warning(ValidationWarning::new(format!(
                "{missing} keys are missing from the QMK layout sequence"
            )));
        }
    }

    fn check_stabilizers(&self, report: &mut ValidationReport) {
        for (idx, key) in self.keyboard.keys.iter().enumerate() {
            let size = key.unit_width.max(key.unit_height);
            if key.stabilizer.is_none() && standard_size(size).is_some() {
                report.add_warning(ValidationWarning::new(format!(
                    "key {idx} is {size}u wide but has no stabilizer"
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Controller, Key};

    fn keyboard(keys: Vec<Key>) -> Keyboard {
        Keyboard::new("test", Controller::ProMicro).with_keys(keys)
    }

    #[test]
    fn test_valid_matrix() {
        let kb = keyboard(vec![
            Key::new(0.0, 0.0, 0.0).with_pins(0, 2),
            Key::new(19.05, 0.0, 0.0).with_pins(0, 3),
            Key::new(0.0, -19.05, 0.0).with_pins(1, 2),
        ]);
        let report = MatrixValidator::new(&kb).validate();
        assert!(report.is_valid(), "{}", report.format_message());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_layout() {
        let kb = keyboard(Vec::new());
        let report = MatrixValidator::new(&kb).validate();
        assert_eq!(report.errors[0].kind, ValidationErrorKind::EmptyLayout);
    }

    #[test]
    fn test_unassigned_and_duplicate() {
        let kb = keyboard(vec![
            Key::new(0.0, 0.0, 0.0).with_pins(0, 2),
            Key::new(19.05, 0.0, 0.0).with_pins(0, 2),
            Key::new(38.1, 0.0, 0.0),
        ]);
        let report = MatrixValidator::new(&kb).validate();
        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicatePosition));
        assert!(kinds.contains(&ValidationErrorKind::UnassignedKey));
        assert_eq!(report.errors[0].key, Some(1));
    }

    #[test]
    fn test_overlap_and_out_of_range() {
        let kb = keyboard(vec![
            Key::new(0.0, 0.0, 0.0).with_pins(0, 1),
            Key::new(19.05, 0.0, 0.0).with_pins(1, 40),
        ]);
        let report = MatrixValidator::new(&kb).validate();
        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::PinOutOfRange));
        assert!(kinds.contains(&ValidationErrorKind::RowColumnOverlap));

        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("Row/Column Overlap"));
    }

    #[test]
    fn test_layout_sequence_checks() {
        let mut kb = keyboard(vec![
            Key::new(0.0, 0.0, 0.0).with_pins(0, 2),
            Key::new(19.05, 0.0, 0.0).with_pins(0, 3),
        ]);
        kb.qmk.layout_sequence = vec![1, 5];
        let report = MatrixValidator::new(&kb).validate();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].kind,
            ValidationErrorKind::InvalidLayoutSequence
        );
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_missing_stabilizer_warns() {
        let kb = keyboard(vec![Key::new(0.0, 0.0, 0.0)
            .with_size(2.25, 1.0)
            .with_pins(0, 1)]);
        let report = MatrixValidator::new(&kb).validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
