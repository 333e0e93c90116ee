//! Error taxonomy for resource accounting

use thiserror::Error;

/// Errors raised while extracting or aggregating resource amounts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountingError {
    /// A quantity string does not match the grammar for its resource kind
    #[error("malformed {kind} quantity {value:?}: {reason}")]
    MalformedQuantity {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// An entity lacks an attribute the accounting cannot do without
    #[error("{entity} is missing required field {path}")]
    MissingRequiredField { entity: String, path: String },

    /// A resource kind outside cpu, memory and pods was requested
    #[error("unknown resource kind {0:?}")]
    UnknownResourceKind(String),

    /// A percentage was computed against a zero allocatable amount
    #[error("cannot compute percentage of {what}: allocatable is zero")]
    DivisionByZero { what: String },
}

impl AccountingError {
    pub(crate) fn malformed(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedQuantity {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(entity: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            entity: entity.into(),
            path: path.into(),
        }
    }
}

/// Result alias used throughout the accounting engine
pub type Result<T> = std::result::Result<T, AccountingError>;
