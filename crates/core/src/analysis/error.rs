//! Unit-price analysis error types.

use thiserror::Error;

/// Errors raised while building analyses and their snapshots.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required text field is blank.
    #[error("{field} cannot be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A quantity or price is negative.
    #[error("{field} cannot be negative")]
    NegativeAmount {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Yields must be strictly positive.
    #[error("Yield must be positive")]
    NonPositiveYield,
}

impl From<AnalysisError> for cimiento_shared::error::AppError {
    fn from(err: AnalysisError) -> Self {
        Self::Validation(err.to_string())
    }
}
