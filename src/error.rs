//! Error types for the suggestion engine.
//!
//! Every failed operation is surfaced to the caller. Variants carry enough
//! context to act on the failure without consulting the store directly.

use thiserror::Error;

use crate::ledger::RowId;

/// Result type alias for afinar operations.
pub type Result<T> = std::result::Result<T, TuneError>;

/// Errors raised by spaces, stores and the engine lifecycle.
#[derive(Debug, Error)]
pub enum TuneError {
    /// Value outside a parameter space's valid domain.
    #[error("Value {value} outside the {space} space domain: {reason}")]
    Domain { space: &'static str, value: f64, reason: String },

    /// Operation referenced a row that is not in the expected partition.
    #[error("No outstanding suggestion with row id {0}\n  → Pass the row_id returned by suggest()")]
    NotFound(RowId),

    /// Durable read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Declared parameters disagree with the schema recorded in the store.
    #[error("Parameters do not match the stored schema: {0}\n  → Reload with the parameters the store was created with, or open with resume: false")]
    ConfigMismatch(String),

    /// Observation input lacks a declared parameter.
    #[error("Parameter not found in observation input: {0}")]
    ParameterNotFound(String),

    /// Configuration or parameter declaration is invalid.
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    /// Candidate proposer failed or returned a malformed point.
    #[error("Proposal error: {0}")]
    Proposal(String),
}

impl TuneError {
    /// Build a domain error for a space.
    pub(crate) fn domain(space: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::Domain { space, value, reason: reason.into() }
    }

    /// Build a configuration error for a field.
    pub(crate) fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig { field: field.into(), message: message.into() }
    }

    /// Whether the caller can retry with different input without touching the store.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Domain { .. }
                | Self::NotFound(_)
                | Self::ParameterNotFound(_)
                | Self::InvalidConfig { .. }
        )
    }

    /// Stable error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain { .. } => "E001",
            Self::NotFound(_) => "E002",
            Self::Persistence(_) => "E003",
            Self::ConfigMismatch(_) => "E004",
            Self::ParameterNotFound(_) => "E005",
            Self::InvalidConfig { .. } => "E006",
            Self::Proposal(_) => "E007",
        }
    }
}
