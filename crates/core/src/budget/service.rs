//! Budget lifecycle: approval, sealing and integrity verification.

use chrono::Utc;

use cimiento_shared::types::UserId;

use super::error::BudgetError;
use super::types::{Budget, BudgetStatus};
use crate::integrity::{ALGORITHM_VERSION, IntegrityError, IntegrityHasher};

const STRUCTURE_MODIFIED: &str = "Structure modification attempted";
const TAMPERING_DETECTED: &str = "Tampering detected";
const NOT_APPLICABLE: &str = "N/A";

impl Budget {
    /// Approves a draft budget and seals it.
    ///
    /// The budget becomes frozen and contractual, then the approval hash and
    /// the execution hash are computed in that order. On any error the budget
    /// is left unchanged.
    ///
    /// `all_leaves_priced` is the result of the leaf analysis check for this
    /// budget.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the budget is a draft,
    /// `MissingAnalysis` when some leaf is unpriced, and any hashing error.
    pub fn approve<H>(
        &mut self,
        approved_by: UserId,
        all_leaves_priced: bool,
        hasher: &H,
    ) -> Result<(), BudgetError>
    where
        H: IntegrityHasher + ?Sized,
    {
        if self.status != BudgetStatus::Draft {
            return Err(BudgetError::InvalidTransition {
                from: self.status,
                to: BudgetStatus::Frozen,
            });
        }
        if !all_leaves_priced {
            return Err(BudgetError::MissingAnalysis(self.id));
        }

        let mut sealed = self.clone();
        sealed.status = BudgetStatus::Frozen;
        sealed.is_contractual = true;
        sealed.approval_hash = Some(hasher.compute_approval_hash(&sealed)?);
        sealed.execution_hash = Some(hasher.compute_execution_hash(&sealed)?);
        sealed.hash_generated_at = Some(Utc::now());
        sealed.hash_generated_by = Some(approved_by);
        sealed.hash_algorithm = Some(ALGORITHM_VERSION.to_string());

        *self = sealed;
        Ok(())
    }

    /// Renames an unsealed budget.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` once sealed and `EmptyName` for a blank
    /// name.
    pub fn rename(&mut self, name: &str) -> Result<(), BudgetError> {
        self.ensure_unsealed()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BudgetError::EmptyName);
        }
        self.name = name.to_string();
        Ok(())
    }

    /// Marks an unsealed budget as the contractual baseline.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` once sealed.
    pub fn mark_contractual(&mut self) -> Result<(), BudgetError> {
        self.ensure_unsealed()?;
        self.is_contractual = true;
        Ok(())
    }

    /// Recomputes the approval hash and compares it with the stored one.
    ///
    /// Unsealed and invalidated budgets have nothing to verify.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` with both hashes on a mismatch, and any
    /// hashing error.
    pub fn verify_integrity<H>(&self, hasher: &H) -> Result<(), BudgetError>
    where
        H: IntegrityHasher + ?Sized,
    {
        let Some(expected) = self.approval_hash.as_deref() else {
            return Ok(());
        };
        if self.status == BudgetStatus::Invalidated {
            return Ok(());
        }

        let actual = hasher.compute_approval_hash(self)?;
        if actual != expected {
            return Err(BudgetError::IntegrityViolation {
                budget_id: self.id,
                expected: expected.to_string(),
                actual,
                violation: TAMPERING_DETECTED.to_string(),
            });
        }
        Ok(())
    }

    /// Replaces the execution hash with a fresh one.
    ///
    /// # Errors
    ///
    /// Fails for an unapproved budget, and on any hashing error.
    pub fn refresh_execution_hash<H>(&mut self, hasher: &H) -> Result<(), BudgetError>
    where
        H: IntegrityHasher + ?Sized,
    {
        if self.approval_hash.is_none() {
            return Err(IntegrityError::MissingApprovalHash(self.id).into());
        }
        self.execution_hash = Some(hasher.compute_execution_hash(self)?);
        Ok(())
    }

    /// Withdraws a frozen budget.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the budget is frozen.
    pub fn invalidate(&mut self) -> Result<(), BudgetError> {
        if self.status != BudgetStatus::Frozen {
            return Err(BudgetError::InvalidTransition {
                from: self.status,
                to: BudgetStatus::Invalidated,
            });
        }
        self.status = BudgetStatus::Invalidated;
        Ok(())
    }

    fn ensure_unsealed(&self) -> Result<(), BudgetError> {
        match &self.approval_hash {
            Some(hash) => Err(BudgetError::IntegrityViolation {
                budget_id: self.id,
                expected: hash.clone(),
                actual: NOT_APPLICABLE.to_string(),
                violation: STRUCTURE_MODIFIED.to_string(),
            }),
            None => Ok(()),
        }
    }
}
