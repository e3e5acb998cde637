//! Unit-price analysis types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cimiento_shared::types::{AnalysisId, AnalysisSnapshotId, BudgetLineId, UserId};

use super::error::AnalysisError;

fn required(value: &str, field: &'static str) -> Result<String, AnalysisError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AnalysisError::EmptyField { field });
    }
    Ok(value.to_string())
}

fn non_negative(value: Decimal, field: &'static str) -> Result<Decimal, AnalysisError> {
    if value < Decimal::ZERO {
        return Err(AnalysisError::NegativeAmount { field });
    }
    Ok(value)
}

fn positive_yield(value: Decimal) -> Result<Decimal, AnalysisError> {
    if value <= Decimal::ZERO {
        return Err(AnalysisError::NonPositiveYield);
    }
    Ok(value)
}

/// One resource line of a working analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResource {
    /// Catalog resource.
    pub resource_id: Uuid,
    /// Quantity per unit of the line.
    pub quantity: Decimal,
    /// Unit price of the resource.
    pub unit_price: Decimal,
    /// `quantity × unit_price`.
    pub subtotal: Decimal,
}

/// Working unit-price analysis attached 1:1 to a leaf line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPriceAnalysis {
    /// Analysis ID.
    pub id: AnalysisId,
    /// Line the analysis prices.
    pub line_id: BudgetLineId,
    /// Units produced per day, when known.
    pub yield_rate: Option<Decimal>,
    /// Unit copied from the line.
    pub unit: String,
    /// Resource lines in stored order.
    pub resources: Vec<AnalysisResource>,
}

impl UnitPriceAnalysis {
    /// Creates an analysis without resources.
    ///
    /// # Errors
    ///
    /// Returns an error if a supplied yield is not positive.
    pub fn new(
        line_id: BudgetLineId,
        yield_rate: Option<Decimal>,
        unit: &str,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            id: AnalysisId::new(),
            line_id,
            yield_rate: yield_rate.map(positive_yield).transpose()?,
            unit: unit.trim().to_string(),
            resources: Vec::new(),
        })
    }

    /// Appends a resource line, computing its subtotal.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity or unit price is negative.
    pub fn with_resource(
        mut self,
        resource_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<Self, AnalysisError> {
        let quantity = non_negative(quantity, "Resource quantity")?;
        let unit_price = non_negative(unit_price, "Resource unit price")?;
        self.resources.push(AnalysisResource {
            resource_id,
            quantity,
            unit_price,
            subtotal: quantity * unit_price,
        });
        Ok(self)
    }

    /// Unit cost of the analysis: the sum of resource subtotals.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.resources.iter().map(|r| r.subtotal).sum()
    }

    /// Returns true if at least one resource line exists.
    #[must_use]
    pub fn has_resources(&self) -> bool {
        !self.resources.is_empty()
    }
}

/// Frozen copy of one catalog resource line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Resource ID in the external catalog.
    pub external_resource_id: String,
    /// Resource name at snapshot time.
    pub name: String,
    /// Quantity per unit.
    pub quantity: Decimal,
    /// Unit price at snapshot time.
    pub unit_price: Decimal,
    /// Stored subtotal.
    pub subtotal: Decimal,
}

impl ResourceSnapshot {
    /// Creates a resource snapshot. The subtotal defaults to
    /// `quantity × unit_price` when not supplied.
    ///
    /// # Errors
    ///
    /// Returns an error for blank identifiers or negative amounts.
    pub fn new(
        external_resource_id: &str,
        name: &str,
        quantity: Decimal,
        unit_price: Decimal,
        subtotal: Option<Decimal>,
    ) -> Result<Self, AnalysisError> {
        let quantity = non_negative(quantity, "Resource quantity")?;
        let unit_price = non_negative(unit_price, "Resource unit price")?;
        Ok(Self {
            external_resource_id: required(external_resource_id, "External resource id")?,
            name: required(name, "Resource name")?,
            quantity,
            unit_price,
            subtotal: subtotal.unwrap_or(quantity * unit_price),
        })
    }
}

/// Input for creating an analysis snapshot.
#[derive(Debug, Clone)]
pub struct NewAnalysisSnapshot {
    /// Line the snapshot prices.
    pub line_id: BudgetLineId,
    /// Analysis ID in the external catalog.
    pub external_analysis_id: String,
    /// Catalog the analysis was copied from.
    pub catalog_source: String,
    /// Yield at snapshot time.
    pub yield_rate: Decimal,
    /// Unit at snapshot time.
    pub unit: String,
    /// Snapshot timestamp.
    pub snapshot_date: DateTime<Utc>,
}

/// Structural snapshot of an analysis, including its resource lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    /// Snapshot ID.
    pub id: AnalysisSnapshotId,
    /// Line the snapshot prices.
    pub line_id: BudgetLineId,
    /// Analysis ID in the external catalog.
    pub external_analysis_id: String,
    /// Catalog the analysis was copied from.
    pub catalog_source: String,
    /// Yield as copied from the catalog.
    pub original_yield: Decimal,
    /// Yield in force; this is the value that is hashed.
    pub current_yield: Decimal,
    /// Whether the yield was modified after the snapshot.
    pub yield_modified: bool,
    /// Who modified the yield.
    pub yield_modified_by: Option<UserId>,
    /// When the yield was modified.
    pub yield_modified_at: Option<DateTime<Utc>>,
    /// Unit at snapshot time.
    pub unit: String,
    /// Snapshot timestamp.
    pub snapshot_date: DateTime<Utc>,
    /// Resource lines in stored order.
    pub resources: Vec<ResourceSnapshot>,
}

impl AnalysisSnapshot {
    /// Creates a snapshot without resources.
    ///
    /// # Errors
    ///
    /// Returns an error for blank identifiers, a blank unit or a
    /// non-positive yield.
    pub fn new(input: NewAnalysisSnapshot) -> Result<Self, AnalysisError> {
        let yield_rate = positive_yield(input.yield_rate)?;
        Ok(Self {
            id: AnalysisSnapshotId::new(),
            line_id: input.line_id,
            external_analysis_id: required(&input.external_analysis_id, "External analysis id")?,
            catalog_source: required(&input.catalog_source, "Catalog source")?,
            original_yield: yield_rate,
            current_yield: yield_rate,
            yield_modified: false,
            yield_modified_by: None,
            yield_modified_at: None,
            unit: required(&input.unit, "Unit")?,
            snapshot_date: input.snapshot_date,
            resources: Vec::new(),
        })
    }

    /// Appends a resource snapshot, keeping insertion order.
    #[must_use]
    pub fn with_resource(mut self, resource: ResourceSnapshot) -> Self {
        self.resources.push(resource);
        self
    }

    /// Returns a copy with a new current yield. An unchanged yield returns
    /// the snapshot as is.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::NonPositiveYield` for a non-positive yield.
    pub fn update_yield(
        self,
        new_yield: Decimal,
        modified_by: UserId,
        modified_at: DateTime<Utc>,
    ) -> Result<Self, AnalysisError> {
        let new_yield = positive_yield(new_yield)?;
        if new_yield == self.current_yield {
            return Ok(self);
        }
        Ok(Self {
            current_yield: new_yield,
            yield_modified: true,
            yield_modified_by: Some(modified_by),
            yield_modified_at: Some(modified_at),
            ..self
        })
    }

    /// Current yield minus original yield.
    #[must_use]
    pub fn yield_deviation(&self) -> Decimal {
        self.current_yield - self.original_yield
    }

    /// Sum of resource subtotals.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.resources.iter().map(|r| r.subtotal).sum()
    }
}
