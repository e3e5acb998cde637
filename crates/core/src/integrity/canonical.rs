//! Canonical text forms fed to the digests.
//!
//! Values are concatenated in a fixed order with no separators. Absent values
//! render as `null`. Changing anything here invalidates every stored hash, so
//! the layout is tied to [`FORMAT_VERSION`].

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::analysis::AnalysisSnapshot;
use crate::budget::{Budget, BudgetLine};

/// Version tag appended to every approval buffer.
pub const FORMAT_VERSION: &str = "v1";

/// Digest algorithm and format version, as reported with each hash.
pub const ALGORITHM_VERSION: &str = "SHA-256-v1";

const NULL: &str = "null";

#[derive(Debug, Default)]
struct Buffer(String);

impl Buffer {
    fn push(&mut self, value: impl Display) -> &mut Self {
        self.0.push_str(&value.to_string());
        self
    }

    fn push_opt<T: Display>(&mut self, value: Option<T>) -> &mut Self {
        match value {
            Some(value) => self.push(value),
            None => self.push(NULL),
        }
    }
}

/// Structural form of one line and, when present, its analysis snapshot.
///
/// Field order: id, code, description, unit, quantity, allocated amount,
/// parent id, level; then external analysis id, catalog source, current
/// yield, unit; then per resource: external id, name, quantity, unit price,
/// subtotal.
#[must_use]
pub fn line_buffer(line: &BudgetLine, snapshot: Option<&AnalysisSnapshot>) -> String {
    let mut buf = Buffer::default();
    buf.push(line.id)
        .push(&line.code)
        .push(&line.description)
        .push_opt(line.unit.as_deref())
        .push(line.quantity)
        .push_opt(line.allocated_amount)
        .push_opt(line.parent_id)
        .push(line.level);

    if let Some(snapshot) = snapshot {
        buf.push(&snapshot.external_analysis_id)
            .push(&snapshot.catalog_source)
            .push(snapshot.current_yield)
            .push(&snapshot.unit);
        for resource in &snapshot.resources {
            buf.push(&resource.external_resource_id)
                .push(&resource.name)
                .push(resource.quantity)
                .push(resource.unit_price)
                .push(resource.subtotal);
        }
    }

    buf.0
}

/// Budget header, Merkle root of the lines, then the format version.
#[must_use]
pub fn approval_buffer(budget: &Budget, lines_root: &str) -> String {
    let mut buf = Buffer::default();
    buf.push(budget.id)
        .push(&budget.name)
        .push(budget.project_id)
        .push(budget.status.as_str())
        .push(budget.is_contractual)
        .push(lines_root)
        .push(FORMAT_VERSION);
    buf.0
}

/// Approval hash, each line's financial state in the given order, then the
/// timestamp in RFC 3339 with nanoseconds.
#[must_use]
pub fn execution_buffer(approval_hash: &str, lines: &[BudgetLine], at: DateTime<Utc>) -> String {
    let mut buf = Buffer::default();
    buf.push(approval_hash);
    for line in lines {
        buf.push(line.id)
            .push(line.actual_spent)
            .push(line.pending_commitments)
            .push(line.remaining_balance());
    }
    buf.push(at.to_rfc3339_opts(SecondsFormat::Nanos, true));
    buf.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{NewAnalysisSnapshot, ResourceSnapshot};
    use crate::budget::NewBudgetLine;
    use chrono::TimeZone;
    use cimiento_shared::types::ProjectId;
    use rust_decimal_macros::dec;

    fn line(budget: &Budget) -> BudgetLine {
        BudgetLine::new(NewBudgetLine {
            budget_id: budget.id,
            parent_id: None,
            code: "01.01".to_string(),
            description: "Concreto f'c=210".to_string(),
            unit: None,
            quantity: dec!(12.50),
            level: 1,
            allocated_amount: None,
        })
        .unwrap()
    }

    #[test]
    fn test_line_buffer_without_snapshot() {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let line = line(&budget);

        assert_eq!(
            line_buffer(&line, None),
            format!("{}01.01Concreto f'c=210null12.50nullnull1", line.id)
        );
    }

    #[test]
    fn test_line_buffer_appends_snapshot_and_resources() {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let line = line(&budget);
        let snapshot = AnalysisSnapshot::new(NewAnalysisSnapshot {
            line_id: line.id,
            external_analysis_id: "APU-7".to_string(),
            catalog_source: "CAPECO".to_string(),
            yield_rate: dec!(25),
            unit: "m3".to_string(),
            snapshot_date: Utc::now(),
        })
        .unwrap()
        .with_resource(ResourceSnapshot::new("R-1", "Cemento", dec!(8.5), dec!(30), None).unwrap());

        let expected = format!(
            "{}01.01Concreto f'c=210null12.50nullnull1APU-7CAPECO25m3R-1Cemento8.530255.0",
            line.id
        );
        assert_eq!(line_buffer(&line, Some(&snapshot)), expected);
    }

    #[test]
    fn test_approval_buffer_layout() {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();

        assert_eq!(
            approval_buffer(&budget, "root"),
            format!("{}Torre A{}DRAFTfalserootv1", budget.id, budget.project_id)
        );
    }

    #[test]
    fn test_execution_buffer_layout() {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let mut line = line(&budget);
        line.allocated_amount = Some(dec!(100));
        line.set_actual_spent(dec!(30)).unwrap();
        line.reserve(dec!(20)).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();

        assert_eq!(
            execution_buffer("abc", std::slice::from_ref(&line), at),
            format!("abc{}3020502026-05-04T12:00:00.000000000Z", line.id)
        );
    }
}
