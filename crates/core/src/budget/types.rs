//! Budget aggregate types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cimiento_shared::types::{BudgetId, ProjectId, UserId};

use super::error::BudgetError;

/// Budget lifecycle status.
///
/// The valid transitions are:
/// - Draft → Frozen (approve)
/// - Frozen → Invalidated (invalidate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    /// Lines may still be created and edited.
    Draft,
    /// Approved and sealed; structure is immutable.
    Frozen,
    /// Withdrawn after approval.
    Invalidated,
}

impl BudgetStatus {
    /// Returns the canonical string form, as used in hashing.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Frozen => "FROZEN",
            Self::Invalidated => "INVALIDATED",
        }
    }

    /// Parses a status from its canonical form (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "FROZEN" => Some(Self::Frozen),
            "INVALIDATED" => Some(Self::Invalidated),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A project budget: the aggregate root owning a forest of budget lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Budget name.
    pub name: String,
    /// Lifecycle status.
    pub status: BudgetStatus,
    /// Whether the budget is the contractual baseline.
    pub is_contractual: bool,
    /// Optimistic-locking version.
    pub version: u64,
    /// Structural fingerprint, set on approval.
    pub approval_hash: Option<String>,
    /// Point-in-time financial fingerprint chained to the approval hash.
    pub execution_hash: Option<String>,
    /// When the hashes were generated.
    pub hash_generated_at: Option<DateTime<Utc>>,
    /// Who approved the budget.
    pub hash_generated_by: Option<UserId>,
    /// Hash algorithm label.
    pub hash_algorithm: Option<String>,
}

impl Budget {
    /// Creates a new draft budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::EmptyName` if the name is blank.
    pub fn new(project_id: ProjectId, name: &str) -> Result<Self, BudgetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BudgetError::EmptyName);
        }

        Ok(Self {
            id: BudgetId::new(),
            project_id,
            name: name.to_string(),
            status: BudgetStatus::Draft,
            is_contractual: false,
            version: 0,
            approval_hash: None,
            execution_hash: None,
            hash_generated_at: None,
            hash_generated_by: None,
            hash_algorithm: None,
        })
    }

    /// Returns true once an approval hash has been stored.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.approval_hash.is_some()
    }

    /// Returns true if the budget is frozen.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == BudgetStatus::Frozen
    }
}
