//! Budget lines: the rows of a hierarchical bill of quantities.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cimiento_shared::types::{BudgetId, BudgetLineId};

use super::error::BudgetError;

/// One row of a budget's bill of quantities.
///
/// A line with children is a title/summary line and its own quantity is not
/// used in cost math. A line without children is a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Line ID.
    pub id: BudgetLineId,
    /// Owning budget.
    pub budget_id: BudgetId,
    /// Parent line, `None` for roots.
    pub parent_id: Option<BudgetLineId>,
    /// Sequence code (e.g. "01.02.03").
    pub code: String,
    /// Description.
    pub description: String,
    /// Unit of measure, usually absent on title lines.
    pub unit: Option<String>,
    /// Budgeted quantity.
    pub quantity: Decimal,
    /// Depth in the tree; roots are the shallowest.
    pub level: u32,
    /// Amount allocated to the line.
    pub allocated_amount: Option<Decimal>,
    /// Actual expenditure booked against the line.
    pub actual_spent: Decimal,
    /// Commitments reserved but not yet spent.
    pub pending_commitments: Decimal,
}

/// Input for creating a budget line.
#[derive(Debug, Clone)]
pub struct NewBudgetLine {
    /// Owning budget.
    pub budget_id: BudgetId,
    /// Parent line, `None` for roots.
    pub parent_id: Option<BudgetLineId>,
    /// Sequence code.
    pub code: String,
    /// Description.
    pub description: String,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Budgeted quantity.
    pub quantity: Decimal,
    /// Depth in the tree.
    pub level: u32,
    /// Amount allocated to the line.
    pub allocated_amount: Option<Decimal>,
}

fn non_negative(value: Decimal, field: &'static str) -> Result<Decimal, BudgetError> {
    if value < Decimal::ZERO {
        return Err(BudgetError::NegativeAmount { field });
    }
    Ok(value)
}

impl BudgetLine {
    /// Validates the input and creates a line with no execution-side state.
    ///
    /// # Errors
    ///
    /// Returns an error if the code or description is blank, or if the
    /// quantity or allocated amount is negative.
    pub fn new(input: NewBudgetLine) -> Result<Self, BudgetError> {
        let code = input.code.trim();
        if code.is_empty() {
            return Err(BudgetError::EmptyLineCode);
        }
        let description = input.description.trim();
        if description.is_empty() {
            return Err(BudgetError::EmptyDescription);
        }
        let quantity = non_negative(input.quantity, "Quantity")?;
        let allocated_amount = input
            .allocated_amount
            .map(|amount| non_negative(amount, "Allocated amount"))
            .transpose()?;

        Ok(Self {
            id: BudgetLineId::new(),
            budget_id: input.budget_id,
            parent_id: input.parent_id,
            code: code.to_string(),
            description: description.to_string(),
            unit: input.unit.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            quantity,
            level: input.level,
            allocated_amount,
            actual_spent: Decimal::ZERO,
            pending_commitments: Decimal::ZERO,
        })
    }

    /// Returns true if the line has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Allocated amount minus actual expenditure and pending commitments.
    #[must_use]
    pub fn remaining_balance(&self) -> Decimal {
        self.allocated_amount.unwrap_or(Decimal::ZERO)
            - (self.actual_spent + self.pending_commitments)
    }

    /// Replaces the actual expenditure total.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeAmount` for a negative total.
    pub fn set_actual_spent(&mut self, total: Decimal) -> Result<(), BudgetError> {
        self.actual_spent = non_negative(total, "Actual expenditure")?;
        Ok(())
    }

    /// Reserves part of the remaining balance as a pending commitment.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or exceeds the
    /// remaining balance.
    pub fn reserve(&mut self, amount: Decimal) -> Result<(), BudgetError> {
        if amount <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveReservation);
        }
        let available = self.remaining_balance();
        if available < amount {
            return Err(BudgetError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        self.pending_commitments += amount;
        Ok(())
    }
}
