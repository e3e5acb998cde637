//! End-to-end approval, verification and control reporting over the
//! in-memory repository.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use cimiento_core::analysis::{
    AnalysisSnapshot, NewAnalysisSnapshot, ResourceSnapshot, UnitPriceAnalysis,
};
use cimiento_core::budget::{Budget, BudgetError, BudgetLine, BudgetStatus, NewBudgetLine};
use cimiento_core::consumption::ConsumptionRecord;
use cimiento_core::cost::{ControlCostAggregator, PlanCostAggregator};
use cimiento_core::integrity::{
    AuditEventType, AuditOutcome, IntegrityAuditLog, IntegrityHashEngine, IntegrityHasher,
    TracingObserver,
};
use cimiento_core::repository::InMemoryRepository;
use cimiento_shared::AppError;
use cimiento_shared::types::{ProjectId, PurchaseDetailId, UserId};

struct Project {
    repo: Arc<InMemoryRepository>,
    budget: Budget,
    title: BudgetLine,
    walls: BudgetLine,
    floors: BudgetLine,
}

fn new_line(budget: &Budget, parent: Option<&BudgetLine>, code: &str, qty: Decimal) -> BudgetLine {
    BudgetLine::new(NewBudgetLine {
        budget_id: budget.id,
        parent_id: parent.map(|p| p.id),
        code: code.to_string(),
        description: format!("Partida {code}"),
        unit: parent.map(|_| "m2".to_string()),
        quantity: qty,
        level: parent.map_or(1, |p| p.level + 1),
        allocated_amount: Some(dec!(10000)),
    })
    .unwrap()
}

fn price(repo: &InMemoryRepository, line: &BudgetLine, unit_cost: Decimal) {
    repo.insert_analysis(
        UnitPriceAnalysis::new(line.id, Some(dec!(12)), "m2")
            .unwrap()
            .with_resource(Uuid::now_v7(), Decimal::ONE, unit_cost)
            .unwrap(),
    );
    repo.insert_snapshot(
        AnalysisSnapshot::new(NewAnalysisSnapshot {
            line_id: line.id,
            external_analysis_id: format!("APU-{}", line.code),
            catalog_source: "CAPECO".to_string(),
            yield_rate: dec!(12),
            unit: "m2".to_string(),
            snapshot_date: chrono::Utc::now(),
        })
        .unwrap()
        .with_resource(
            ResourceSnapshot::new("MO-01", "Operario", Decimal::ONE, unit_cost, None).unwrap(),
        ),
    );
}

fn project() -> Project {
    let repo = Arc::new(InMemoryRepository::new());
    let budget = Budget::new(ProjectId::new(), "Edificio Miraflores").unwrap();
    let title = new_line(&budget, None, "01", Decimal::ZERO);
    let walls = new_line(&budget, Some(&title), "01.01", dec!(10));
    let floors = new_line(&budget, Some(&title), "01.02", dec!(5));
    for line in [&title, &walls, &floors] {
        repo.insert_line(line.clone());
    }
    Project {
        repo,
        budget,
        title,
        walls,
        floors,
    }
}

fn engine(repo: &Arc<InMemoryRepository>) -> IntegrityHashEngine<InMemoryRepository, InMemoryRepository> {
    IntegrityHashEngine::new(
        Arc::clone(repo),
        Arc::clone(repo),
        Arc::new(TracingObserver::default()),
    )
}

#[test]
fn test_approval_requires_priced_leaves() {
    let mut p = project();
    let plan = PlanCostAggregator::new(Arc::clone(&p.repo), Arc::clone(&p.repo));
    let hasher = engine(&p.repo);
    price(&p.repo, &p.walls, dec!(100));

    let priced = plan.all_leaf_lines_have_analysis(p.budget.id).unwrap();
    let err = p.budget.approve(UserId::new(), priced, &hasher).unwrap_err();
    assert!(matches!(err, BudgetError::MissingAnalysis(_)));
    assert!(matches!(AppError::from(err), AppError::BusinessRule(_)));

    price(&p.repo, &p.floors, dec!(50));
    let priced = plan.all_leaf_lines_have_analysis(p.budget.id).unwrap();
    p.budget.approve(UserId::new(), priced, &hasher).unwrap();

    assert_eq!(p.budget.status, BudgetStatus::Frozen);
    assert_eq!(plan.calculate_total_cost(p.budget.id).unwrap(), dec!(1250));
    assert_eq!(plan.calculate_line_cost(p.title.id).unwrap(), dec!(1250));
}

#[test]
fn test_tampering_is_detected_and_audited() {
    let mut p = project();
    price(&p.repo, &p.walls, dec!(100));
    price(&p.repo, &p.floors, dec!(50));
    let hasher = engine(&p.repo);
    let audit = IntegrityAuditLog::new(Arc::clone(&p.repo));
    let auditor = UserId::new();

    p.budget.approve(UserId::new(), true, &hasher).unwrap();
    audit.log_hash_generation(&p.budget).unwrap();
    audit.verify_and_record(&p.budget, &hasher, Some(auditor)).unwrap();

    p.repo.update_line(p.walls.id, |line| line.quantity = dec!(11));
    let err = audit
        .verify_and_record(&p.budget, &hasher, Some(auditor))
        .unwrap_err();
    assert!(matches!(AppError::from(err), AppError::IntegrityViolation(_)));

    let entries = p.repo.audit_entries(p.budget.id);
    let kinds: Vec<AuditEventType> = entries.iter().map(|e| e.event_type).collect();
    assert_eq!(
        kinds,
        [
            AuditEventType::HashGenerated,
            AuditEventType::HashValidated,
            AuditEventType::HashValidated,
            AuditEventType::HashViolation,
        ]
    );
    assert_eq!(entries[1].outcome, Some(AuditOutcome::Success));
    assert_eq!(entries[2].outcome, Some(AuditOutcome::Failure));
    assert_eq!(entries[3].approval_hash, p.budget.approval_hash);
    assert_ne!(entries[3].execution_hash, p.budget.approval_hash);
}

#[test]
fn test_snapshot_yield_change_breaks_the_seal() {
    let mut p = project();
    price(&p.repo, &p.walls, dec!(100));
    price(&p.repo, &p.floors, dec!(50));
    let hasher = engine(&p.repo);
    p.budget.approve(UserId::new(), true, &hasher).unwrap();

    let walls = p.walls.id;
    p.repo.update_snapshot(walls, |snapshot| {
        *snapshot = snapshot
            .clone()
            .update_yield(dec!(14), UserId::new(), chrono::Utc::now())
            .unwrap();
    });

    assert!(matches!(
        p.budget.verify_integrity(&hasher),
        Err(BudgetError::IntegrityViolation { .. })
    ));
}

#[test]
fn test_spending_changes_execution_hash_only() {
    let mut p = project();
    price(&p.repo, &p.walls, dec!(100));
    price(&p.repo, &p.floors, dec!(50));
    let hasher = engine(&p.repo);
    p.budget.approve(UserId::new(), true, &hasher).unwrap();
    let approval = p.budget.approval_hash.clone().unwrap();
    let first_execution = p.budget.execution_hash.clone();

    p.repo.update_line(p.walls.id, |line| {
        line.set_actual_spent(dec!(800)).unwrap();
        line.reserve(dec!(200)).unwrap();
    });
    p.budget.refresh_execution_hash(&hasher).unwrap();

    assert_eq!(hasher.compute_approval_hash(&p.budget).unwrap(), approval);
    assert_ne!(p.budget.execution_hash, first_execution);
    p.budget.verify_integrity(&hasher).unwrap();
}

#[test]
fn test_control_report_after_consumption() {
    let p = project();
    price(&p.repo, &p.walls, dec!(500));
    price(&p.repo, &p.floors, dec!(100));
    let date = NaiveDate::from_ymd_opt(2026, 4, 15).unwrap();
    p.repo.insert_consumption(
        ConsumptionRecord::purchase(p.walls.id, PurchaseDetailId::new(), dec!(4500), date).unwrap(),
    );
    p.repo
        .insert_consumption(ConsumptionRecord::payroll(p.floors.id, dec!(600), date).unwrap());

    let control = ControlCostAggregator::new(Arc::clone(&p.repo));
    let report = control
        .report(&p.budget, p.repo.as_ref(), p.repo.as_ref())
        .unwrap();

    assert_eq!(report.total_planned, dec!(5500));
    assert_eq!(report.total_actual, dec!(5100));
    assert_eq!(report.total_balance, dec!(400));
    assert_eq!(report.total_execution_percent, dec!(92.7273));
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].children[0].datum.execution_percent, dec!(90));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["rows"][0]["code"], "01");
    assert_eq!(json["rows"][0]["datum"]["kind"], "title");
    assert_eq!(json["rows"][0]["children"][1]["code"], "01.02");
}
