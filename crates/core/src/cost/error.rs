//! Cost aggregation error types.

use thiserror::Error;

use cimiento_shared::error::AppError;
use cimiento_shared::types::BudgetLineId;

use crate::repository::RepositoryError;

/// Errors raised by the plan and control aggregators.
#[derive(Debug, Error)]
pub enum CostError {
    /// The requested line does not exist.
    #[error("Budget line not found: {0}")]
    LineNotFound(BudgetLineId),

    /// A repository collaborator failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<CostError> for AppError {
    fn from(err: CostError) -> Self {
        match err {
            CostError::LineNotFound(_) => Self::NotFound(err.to_string()),
            CostError::Repository(inner) => inner.into(),
        }
    }
}
