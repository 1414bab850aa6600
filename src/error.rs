//! Error taxonomy shared by every stage of the keyboard compiler.
//!
//! All failures are fatal: a build either produces complete artifacts or
//! stops with one of these errors. The CLI layer wraps them with
//! `anyhow::Context` for file and path information.

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, KbError>;

/// Errors raised while compiling a keyboard description.
#[derive(Debug, Error)]
pub enum KbError {
    /// Outline strategy name that is not one of the supported variants.
    #[error("unknown outline strategy '{0}' (expected tight, convex-hull or rectangle)")]
    UnknownOutline(String),

    /// Controller name that has no pin table or sub-circuit.
    #[error("unknown controller '{0}' (expected pro-micro, atmega32u4, atmega32u4-hub2 or stm32f072)")]
    UnknownController(String),

    /// Switch footprint family that is not supported.
    #[error("unknown switch '{0}' (expected cherry-mx)")]
    UnknownSwitch(String),

    /// A configuration value outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The matrix needs more IO lines than the controller provides.
    #[error(
        "matrix needs {rows} rows + {cols} columns = {} IO lines, but only {available} are available",
        .rows + .cols
    )]
    MatrixCapacity {
        /// Number of matrix rows required.
        rows: usize,
        /// Number of matrix columns required.
        cols: usize,
        /// IO lines offered by the controller.
        available: usize,
    },

    /// More keys than distinct (low, high) pin pairs.
    #[error("{keys} keys do not fit into {pairs} matrix positions with {io} IO lines")]
    MatrixFull {
        /// Number of keys to place.
        keys: usize,
        /// Number of available pin pairs.
        pairs: usize,
        /// IO line count the pairs were derived from.
        io: usize,
    },

    /// A key index outside the key sequence.
    #[error("key index {index} out of range for {len} keys")]
    KeyIndex {
        /// The offending index.
        index: usize,
        /// Number of keys in the sequence.
        len: usize,
    },

    /// A key was expected to carry matrix pins but does not.
    #[error("key {index} has no matrix pins assigned")]
    UnassignedKey {
        /// Index of the key in the keyboard.
        index: usize,
    },

    /// Outline synthesis over an empty key sequence.
    #[error("cannot generate an outline without keys")]
    EmptyLayout,

    /// The outline fell apart into several regions.
    #[error("outline splits into {islands} disconnected regions (raise the concave radius or use convex-hull)")]
    DisconnectedOutline {
        /// Number of regions after rounding.
        islands: usize,
    },

    /// A signal mapping value that is neither declared nor supplied.
    #[error("{path}: signal '{signal}' used by '{child}' is not declared in this section")]
    UnresolvedSignal {
        /// Slash-joined section path where the lookup failed.
        path: String,
        /// The unresolved parent-local signal name.
        signal: String,
        /// Identifier of the child whose mapping referenced it.
        child: String,
    },

    /// A signal mapping key that the component does not declare as a pin.
    #[error("no pin '{pin}' in {path}/{component}")]
    UnknownPin {
        /// Slash-joined section path of the enclosing section.
        path: String,
        /// Footprint name of the component.
        component: String,
        /// The pin name that was mapped.
        pin: String,
    },

    /// Two nets resolved to the same path-qualified name.
    #[error("duplicate net name '{0}' (sibling sections must have distinct ids)")]
    DuplicateNet(String),

    /// The keyboard failed its pre-generation sanity checks.
    #[error("keyboard failed validation:\n{0}")]
    Validation(String),

    /// Malformed compact layout document.
    #[error("compact layout: {0}")]
    Transcode(String),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_reports_both_counts() {
        let err = KbError::MatrixCapacity {
            rows: 6,
            cols: 15,
            available: 18,
        };
        let msg = err.to_string();
        assert!(msg.contains("21 IO lines"), "{msg}");
        assert!(msg.contains("only 18"), "{msg}");
    }

    #[test]
    fn test_unknown_pin_message_carries_path() {
        let err = KbError::UnknownPin {
            path: "keyboard/usb".to_string(),
            component: "Connector_USB:HRO-TYPE-C-31-M-12".to_string(),
            pin: "cc3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no pin 'cc3' in keyboard/usb/Connector_USB:HRO-TYPE-C-31-M-12"
        );
    }
}
