//! Consumption record types.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cimiento_shared::types::{BudgetLineId, ConsumptionId, PurchaseDetailId};

use super::error::ConsumptionError;

/// Origin of a consumption record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumptionKind {
    /// Booked by a purchase.
    Purchase,
    /// Booked by payroll.
    Payroll,
    /// Any other expenditure.
    Other,
}

impl ConsumptionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "PURCHASE",
            Self::Payroll => "PAYROLL",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ConsumptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Economic-impact event tied to exactly one budget line.
///
/// Records are immutable apart from amount/date corrections, which keep the
/// identity and bump the version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Record ID.
    pub id: ConsumptionId,
    /// Line the record is booked against.
    pub line_id: BudgetLineId,
    /// Purchase detail that originated the record.
    pub purchase_detail_id: Option<PurchaseDetailId>,
    /// Amount consumed.
    pub amount: Decimal,
    /// Booking date.
    pub date: NaiveDate,
    /// Origin.
    pub kind: ConsumptionKind,
    /// Optimistic-locking version.
    pub version: u64,
}

impl ConsumptionRecord {
    fn create(
        line_id: BudgetLineId,
        purchase_detail_id: Option<PurchaseDetailId>,
        amount: Decimal,
        date: NaiveDate,
        kind: ConsumptionKind,
    ) -> Result<Self, ConsumptionError> {
        if amount < Decimal::ZERO {
            return Err(ConsumptionError::NegativeAmount);
        }
        Ok(Self {
            id: ConsumptionId::new(),
            line_id,
            purchase_detail_id,
            amount,
            date,
            kind,
            version: 0,
        })
    }

    /// Creates a record booked by a purchase detail.
    ///
    /// # Errors
    ///
    /// Returns `ConsumptionError::NegativeAmount` for a negative amount.
    pub fn purchase(
        line_id: BudgetLineId,
        purchase_detail_id: PurchaseDetailId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Self, ConsumptionError> {
        Self::create(
            line_id,
            Some(purchase_detail_id),
            amount,
            date,
            ConsumptionKind::Purchase,
        )
    }

    /// Creates a record booked by payroll.
    ///
    /// # Errors
    ///
    /// Returns `ConsumptionError::NegativeAmount` for a negative amount.
    pub fn payroll(
        line_id: BudgetLineId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Self, ConsumptionError> {
        Self::create(line_id, None, amount, date, ConsumptionKind::Payroll)
    }

    /// Creates a record of any other origin.
    ///
    /// # Errors
    ///
    /// Returns `ConsumptionError::NegativeAmount` for a negative amount.
    pub fn other(
        line_id: BudgetLineId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<Self, ConsumptionError> {
        Self::create(line_id, None, amount, date, ConsumptionKind::Other)
    }

    /// Corrects the amount, keeping the record's identity.
    ///
    /// # Errors
    ///
    /// Returns `ConsumptionError::NegativeAmount` for a negative amount.
    pub fn correct_amount(&mut self, amount: Decimal) -> Result<(), ConsumptionError> {
        if amount < Decimal::ZERO {
            return Err(ConsumptionError::NegativeAmount);
        }
        self.amount = amount;
        self.version += 1;
        Ok(())
    }

    /// Corrects the booking date, keeping the record's identity.
    pub fn correct_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.version += 1;
    }

    /// Returns true if the record was booked by a purchase.
    #[must_use]
    pub fn is_purchase(&self) -> bool {
        self.kind == ConsumptionKind::Purchase && self.purchase_detail_id.is_some()
    }
}
