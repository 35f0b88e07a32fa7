//! Engine error types

use thiserror::Error;

/// Errors raised by the energy requirement engine.
///
/// Both variants are raised before any arithmetic runs, so a failed
/// computation never leaves a partial result behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnergyError {
    #[error("Invalid input for {field}: {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown {kind} level: '{value}'")]
    UnknownLevel { kind: &'static str, value: String },
}

impl EnergyError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        EnergyError::InvalidInput {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_level(kind: &'static str, value: &str) -> Self {
        EnergyError::UnknownLevel {
            kind,
            value: value.to_string(),
        }
    }
}

/// Result type for engine operations
pub type EnergyResult<T> = Result<T, EnergyError>;
