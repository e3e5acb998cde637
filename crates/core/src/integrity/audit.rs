//! Integrity audit trail.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cimiento_shared::types::{AuditEntryId, BudgetId, UserId};

use super::canonical::ALGORITHM_VERSION;
use super::clock::{Clock, SystemClock};
use super::engine::IntegrityHasher;
use super::error::IntegrityError;
use crate::budget::{Budget, BudgetError};
use crate::repository::IntegrityAuditRepository;

/// Audited integrity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    /// Hashes were generated on approval.
    HashGenerated,
    /// A stored hash was checked.
    HashValidated,
    /// A stored hash did not match.
    HashViolation,
}

impl AuditEventType {
    /// Returns the string representation of the event type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HashGenerated => "HASH_GENERATED",
            Self::HashValidated => "HASH_VALIDATED",
            Self::HashViolation => "HASH_VIOLATION",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an audited check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    /// The check passed.
    Success,
    /// The check failed.
    Failure,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityAuditEntry {
    /// Entry ID.
    pub id: AuditEntryId,
    /// Audited budget.
    pub budget_id: BudgetId,
    /// Event type.
    pub event_type: AuditEventType,
    /// Stored approval hash (the expected hash for violations).
    pub approval_hash: Option<String>,
    /// Execution hash, or the recomputed hash for violations.
    pub execution_hash: Option<String>,
    /// Who triggered the event.
    pub actor: Option<UserId>,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Outcome of validations.
    pub outcome: Option<AuditOutcome>,
    /// Free-form details.
    pub details: Option<String>,
    /// Algorithm and format version.
    pub algorithm: String,
}

/// Writes integrity audit entries to a repository.
pub struct IntegrityAuditLog<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: IntegrityAuditRepository> IntegrityAuditLog<R> {
    /// Creates a log stamped by the system clock.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock that stamps entries.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Records hash generation for an approved budget.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::MissingApprovalHash` if the budget has no
    /// approval hash, and propagates repository failures.
    pub fn log_hash_generation(&self, budget: &Budget) -> Result<(), IntegrityError> {
        if budget.approval_hash.is_none() {
            return Err(IntegrityError::MissingApprovalHash(budget.id));
        }
        self.save(IntegrityAuditEntry {
            approval_hash: budget.approval_hash.clone(),
            execution_hash: budget.execution_hash.clone(),
            actor: budget.hash_generated_by,
            ..self.entry(budget.id, AuditEventType::HashGenerated)
        })
    }

    /// Records the result of a verification.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn log_hash_validation(
        &self,
        budget: &Budget,
        validated_by: Option<UserId>,
        success: bool,
        details: Option<String>,
    ) -> Result<(), IntegrityError> {
        self.save(IntegrityAuditEntry {
            approval_hash: budget.approval_hash.clone(),
            execution_hash: budget.execution_hash.clone(),
            actor: validated_by,
            outcome: Some(if success {
                AuditOutcome::Success
            } else {
                AuditOutcome::Failure
            }),
            details,
            ..self.entry(budget.id, AuditEventType::HashValidated)
        })
    }

    /// Records a detected violation.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn log_integrity_violation(
        &self,
        budget_id: BudgetId,
        expected: &str,
        actual: &str,
        violation: &str,
        detected_by: Option<UserId>,
    ) -> Result<(), IntegrityError> {
        self.save(IntegrityAuditEntry {
            approval_hash: Some(expected.to_string()),
            execution_hash: Some(actual.to_string()),
            actor: detected_by,
            outcome: Some(AuditOutcome::Failure),
            details: Some(violation.to_string()),
            ..self.entry(budget_id, AuditEventType::HashViolation)
        })
    }

    /// Verifies a budget and records the outcome.
    ///
    /// A mismatch is recorded as a failed validation and as a violation
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the verification error, or an audit write failure.
    pub fn verify_and_record<H>(
        &self,
        budget: &Budget,
        hasher: &H,
        validated_by: Option<UserId>,
    ) -> Result<(), BudgetError>
    where
        H: IntegrityHasher + ?Sized,
    {
        match budget.verify_integrity(hasher) {
            Ok(()) => {
                self.log_hash_validation(budget, validated_by, true, None)?;
                Ok(())
            }
            Err(BudgetError::IntegrityViolation {
                budget_id,
                expected,
                actual,
                violation,
            }) => {
                self.log_hash_validation(budget, validated_by, false, Some(violation.clone()))?;
                self.log_integrity_violation(budget_id, &expected, &actual, &violation, validated_by)?;
                Err(BudgetError::IntegrityViolation {
                    budget_id,
                    expected,
                    actual,
                    violation,
                })
            }
            Err(err) => Err(err),
        }
    }

    fn entry(&self, budget_id: BudgetId, event_type: AuditEventType) -> IntegrityAuditEntry {
        IntegrityAuditEntry {
            id: AuditEntryId::new(),
            budget_id,
            event_type,
            approval_hash: None,
            execution_hash: None,
            actor: None,
            recorded_at: self.clock.now(),
            outcome: None,
            details: None,
            algorithm: ALGORITHM_VERSION.to_string(),
        }
    }

    fn save(&self, entry: IntegrityAuditEntry) -> Result<(), IntegrityError> {
        self.repository.save(entry)?;
        Ok(())
    }
}
