//! Property-based tests for the integrity hashes.

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use cimiento_shared::types::ProjectId;

use super::engine::{IntegrityHashEngine, IntegrityHasher};
use super::observer::recording::RecordingObserver;
use crate::analysis::{AnalysisSnapshot, NewAnalysisSnapshot, ResourceSnapshot};
use crate::budget::{Budget, BudgetLine, NewBudgetLine};
use crate::repository::InMemoryRepository;

/// (code seed, quantity in hundredths, allocated amount in cents)
type LineShape = (u16, u32, Option<u32>);

fn shapes_with_permutation() -> impl Strategy<Value = (Vec<LineShape>, Vec<usize>)> {
    prop::collection::vec(
        (any::<u16>(), 0u32..1_000_000, prop::option::of(0u32..1_000_000)),
        1..20,
    )
    .prop_flat_map(|shapes| {
        let order: Vec<usize> = (0..shapes.len()).collect();
        (Just(shapes), Just(order).prop_shuffle())
    })
}

fn build_lines(budget: &Budget, shapes: &[LineShape]) -> Vec<BudgetLine> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, (seed, quantity, allocated))| {
            BudgetLine::new(NewBudgetLine {
                budget_id: budget.id,
                parent_id: None,
                code: format!("{i:02}.{seed}"),
                description: format!("Partida {seed}"),
                unit: Some("m2".to_string()),
                quantity: Decimal::new(i64::from(*quantity), 2),
                level: 1,
                allocated_amount: allocated.map(|cents| Decimal::new(i64::from(cents), 2)),
            })
            .unwrap()
        })
        .collect()
}

fn snapshot_for(line: &BudgetLine) -> AnalysisSnapshot {
    AnalysisSnapshot::new(NewAnalysisSnapshot {
        line_id: line.id,
        external_analysis_id: format!("APU-{}", line.code),
        catalog_source: "CAPECO".to_string(),
        yield_rate: Decimal::new(25, 0),
        unit: "m2".to_string(),
        snapshot_date: chrono::Utc::now(),
    })
    .unwrap()
    .with_resource(
        ResourceSnapshot::new("R-1", "Cemento", Decimal::new(85, 1), Decimal::new(30, 0), None)
            .unwrap(),
    )
}

type Engine = IntegrityHashEngine<InMemoryRepository, InMemoryRepository>;

fn engine_over(lines: &[BudgetLine], with_snapshots: bool) -> (Arc<InMemoryRepository>, Engine) {
    let repo = Arc::new(InMemoryRepository::new());
    for line in lines {
        repo.insert_line(line.clone());
        if with_snapshots {
            repo.insert_snapshot(snapshot_for(line));
        }
    }
    let engine = IntegrityHashEngine::new(
        Arc::clone(&repo),
        Arc::clone(&repo),
        Arc::new(RecordingObserver::default()),
    );
    (repo, engine)
}

proptest! {
    /// Reordering lines never changes the approval hash.
    #[test]
    fn test_approval_hash_ignores_line_order((shapes, order) in shapes_with_permutation()) {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let lines = build_lines(&budget, &shapes);
        let shuffled: Vec<BudgetLine> = order.iter().map(|&i| lines[i].clone()).collect();

        let (_, original) = engine_over(&lines, true);
        let (_, permuted) = engine_over(&shuffled, true);

        prop_assert_eq!(
            original.compute_approval_hash(&budget).unwrap(),
            permuted.compute_approval_hash(&budget).unwrap()
        );
    }

    /// Recomputing over an unchanged structure is stable.
    #[test]
    fn test_approval_hash_is_stable((shapes, _) in shapes_with_permutation()) {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let lines = build_lines(&budget, &shapes);
        let (_, engine) = engine_over(&lines, true);

        prop_assert_eq!(
            engine.compute_approval_hash(&budget).unwrap(),
            engine.compute_approval_hash(&budget).unwrap()
        );
    }

    /// Any structural edit of any line changes the approval hash.
    #[test]
    fn test_structural_edit_changes_approval_hash(
        (shapes, _) in shapes_with_permutation(),
        pick in any::<usize>(),
        field in 0usize..6,
    ) {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let lines = build_lines(&budget, &shapes);
        let (repo, engine) = engine_over(&lines, false);
        let before = engine.compute_approval_hash(&budget).unwrap();

        let target = lines[pick % lines.len()].id;
        repo.update_line(target, |line| match field {
            0 => line.code.push('X'),
            1 => line.description.push_str(" (rev)"),
            2 => line.quantity += Decimal::ONE,
            3 => line.allocated_amount = Some(line.allocated_amount.unwrap_or_default() + Decimal::ONE),
            4 => line.level += 1,
            _ => line.unit = None,
        });

        prop_assert_ne!(before, engine.compute_approval_hash(&budget).unwrap());
    }

    /// Editing a resource snapshot changes the approval hash.
    #[test]
    fn test_snapshot_edit_changes_approval_hash(
        (shapes, _) in shapes_with_permutation(),
        pick in any::<usize>(),
    ) {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let lines = build_lines(&budget, &shapes);
        let (repo, engine) = engine_over(&lines, true);
        let before = engine.compute_approval_hash(&budget).unwrap();

        let target = lines[pick % lines.len()].id;
        repo.update_snapshot(target, |snapshot| {
            snapshot.resources[0].unit_price += Decimal::ONE;
        });

        prop_assert_ne!(before, engine.compute_approval_hash(&budget).unwrap());
    }

    /// Execution-side changes leave the approval hash untouched.
    #[test]
    fn test_execution_state_does_not_change_approval_hash(
        (shapes, _) in shapes_with_permutation(),
        pick in any::<usize>(),
        spent in 0u32..1_000_000,
    ) {
        let budget = Budget::new(ProjectId::new(), "Torre A").unwrap();
        let lines = build_lines(&budget, &shapes);
        let (repo, engine) = engine_over(&lines, true);
        let before = engine.compute_approval_hash(&budget).unwrap();

        let target = lines[pick % lines.len()].id;
        repo.update_line(target, |line| {
            line.actual_spent = Decimal::new(i64::from(spent), 2);
            line.pending_commitments += Decimal::ONE;
        });

        prop_assert_eq!(before, engine.compute_approval_hash(&budget).unwrap());
    }
}
