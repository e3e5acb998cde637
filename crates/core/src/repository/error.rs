//! Repository error types.

use thiserror::Error;

/// Errors reported by repository collaborators.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or failed the query.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be turned into a valid domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<RepositoryError> for cimiento_shared::error::AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err.to_string())
    }
}
