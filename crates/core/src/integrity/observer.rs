//! Observability port for hash generation.

use std::fmt;

use uuid::Uuid;

use cimiento_shared::config::IntegrityConfig;
use cimiento_shared::types::BudgetId;

/// Which hash an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashEventKind {
    /// Structural approval hash.
    ApprovalHash,
    /// Chained execution hash.
    ExecutionHash,
}

impl HashEventKind {
    /// Returns the event name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApprovalHash => "approval_hash",
            Self::ExecutionHash => "execution_hash",
        }
    }
}

impl fmt::Display for HashEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed hash computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEvent {
    /// Correlation ID from [`IntegrityObserver::generate_correlation_id`].
    pub correlation_id: String,
    /// Hash kind.
    pub kind: HashEventKind,
    /// Budget the hash belongs to.
    pub budget_id: BudgetId,
    /// Resulting hash, in full.
    pub hash: String,
    /// Wall time spent, in milliseconds.
    pub duration_ms: u64,
    /// Number of lines covered.
    pub line_count: usize,
    /// Algorithm and format version.
    pub algorithm: &'static str,
}

/// Receives hash events. Injected into the engine per call context.
pub trait IntegrityObserver: Send + Sync {
    /// A fresh correlation ID for one computation.
    fn generate_correlation_id(&self) -> String;

    /// Records a completed computation.
    fn record_hash_event(&self, event: &HashEvent);
}

/// Shortens a hash for log output.
#[must_use]
pub fn truncate_hash(hash: &str, prefix: usize) -> String {
    match hash.get(..prefix) {
        Some(head) if head.len() < hash.len() => format!("{head}..."),
        _ => hash.to_string(),
    }
}

/// Emits hash events as structured `tracing` records.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    hash_prefix: usize,
}

impl TracingObserver {
    /// Creates an observer that logs the first `hash_prefix` hash characters.
    #[must_use]
    pub fn new(hash_prefix: usize) -> Self {
        Self { hash_prefix }
    }

    /// Creates an observer from configuration.
    #[must_use]
    pub fn from_config(config: &IntegrityConfig) -> Self {
        Self::new(config.log_hash_prefix)
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::from_config(&IntegrityConfig::default())
    }
}

impl IntegrityObserver for TracingObserver {
    fn generate_correlation_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn record_hash_event(&self, event: &HashEvent) {
        tracing::info!(
            component = "integrity",
            action = event.kind.as_str(),
            correlation_id = %event.correlation_id,
            budget_id = %event.budget_id,
            hash = %truncate_hash(&event.hash, self.hash_prefix),
            duration_ms = event.duration_ms,
            line_count = event.line_count,
            algorithm = event.algorithm,
            "Integrity hash generated"
        );
    }
}
