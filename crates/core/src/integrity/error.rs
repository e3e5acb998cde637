//! Integrity engine error types.

use thiserror::Error;

use cimiento_shared::error::AppError;
use cimiento_shared::types::BudgetId;

use crate::repository::RepositoryError;

/// Errors raised while computing or recording integrity hashes.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The budget has not been approved, so there is nothing to chain to.
    #[error("Budget {0} has no approval hash")]
    MissingApprovalHash(BudgetId),

    /// A repository collaborator failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<IntegrityError> for AppError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::MissingApprovalHash(_) => Self::InvalidState(err.to_string()),
            IntegrityError::Repository(inner) => inner.into(),
        }
    }
}
