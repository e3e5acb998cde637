//! Budget error types.

use rust_decimal::Decimal;
use thiserror::Error;

use cimiento_shared::types::BudgetId;

use super::types::BudgetStatus;
use crate::integrity::IntegrityError;

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Budget name is blank.
    #[error("Budget name cannot be empty")]
    EmptyName,

    /// Budget line sequence code is blank.
    #[error("Budget line code cannot be empty")]
    EmptyLineCode,

    /// Budget line description is blank.
    #[error("Budget line description cannot be empty")]
    EmptyDescription,

    /// A quantity or amount is negative.
    #[error("{field} cannot be negative")]
    NegativeAmount {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Reservation amount must be strictly positive.
    #[error("Reservation amount must be positive")]
    NonPositiveReservation,

    /// Not enough remaining balance to reserve.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount requested.
        requested: Decimal,
        /// Remaining balance.
        available: Decimal,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: BudgetStatus,
        /// The attempted target status.
        to: BudgetStatus,
    },

    /// Approval rejected because some leaf line has no unit-price analysis.
    #[error("Budget {0} has leaf lines without a unit-price analysis")]
    MissingAnalysis(BudgetId),

    /// The stored approval hash does not match the current structure, or a
    /// structural change was attempted on a sealed budget.
    #[error("Integrity violation on budget {budget_id}: {violation}")]
    IntegrityViolation {
        /// Budget under verification.
        budget_id: BudgetId,
        /// Stored hash.
        expected: String,
        /// Recomputed hash, or `N/A` for blocked modifications.
        actual: String,
        /// Violation kind.
        violation: String,
    },

    /// Hash engine failure.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

impl From<BudgetError> for cimiento_shared::error::AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::EmptyName
            | BudgetError::EmptyLineCode
            | BudgetError::EmptyDescription
            | BudgetError::NegativeAmount { .. }
            | BudgetError::NonPositiveReservation => Self::Validation(err.to_string()),
            BudgetError::InsufficientBalance { .. } | BudgetError::MissingAnalysis(_) => {
                Self::BusinessRule(err.to_string())
            }
            BudgetError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
            BudgetError::IntegrityViolation { .. } => Self::IntegrityViolation(err.to_string()),
            BudgetError::Integrity(inner) => inner.into(),
        }
    }
}
