//! Consumption record error types.

use thiserror::Error;

/// Errors raised while creating or correcting consumption records.
#[derive(Debug, Error)]
pub enum ConsumptionError {
    /// Amount cannot be negative.
    #[error("Consumption amount cannot be negative")]
    NegativeAmount,
}

impl From<ConsumptionError> for cimiento_shared::error::AppError {
    fn from(err: ConsumptionError) -> Self {
        Self::Validation(err.to_string())
    }
}
