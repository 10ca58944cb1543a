// status.rs — Read-only summaries for stewards and the CLI.

use std::fmt;

use serde::{Deserialize, Serialize};
use warden_approval::QueueStatistics;
use warden_core::{BudgetState, EnforcementLevel};

/// Point-in-time view of the budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub task_ceiling: u64,
    pub current_spend: u64,
    pub remaining: u64,
    pub utilization: f64,
    pub enforcement: EnforcementLevel,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
}

impl From<&BudgetState> for BudgetStatus {
    fn from(budget: &BudgetState) -> Self {
        Self {
            task_ceiling: budget.task_ceiling(),
            current_spend: budget.current_spend(),
            remaining: budget.remaining(),
            utilization: budget.utilization_ratio(),
            enforcement: budget.enforcement(),
            warning_threshold: budget.warning_threshold(),
            critical_threshold: budget.critical_threshold(),
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} tokens ({:.1}%), {} remaining, enforcement {}",
            self.current_spend,
            self.task_ceiling,
            self.utilization * 100.0,
            self.remaining,
            self.enforcement
        )
    }
}

/// Counters since the orchestrator was created.
///
/// `proposals` counts agent actions put through policy, once each.
/// The outcome counters count transitions: an escalation that is later
/// approved shows up in both `escalated` and `applied`, and steward
/// budget overrides land in `applied` or `rejected`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStatistics {
    pub proposals: u64,
    pub applied: u64,
    pub rejected: u64,
    pub denied: u64,
    pub escalated: u64,
    /// Committed transitions whose audit record could not be hashed or
    /// appended.
    pub audit_failures: u64,
    pub queue: QueueStatistics,
}

impl fmt::Display for OrchestratorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} agent proposals ({} denied, {} escalated); {} applied, {} rejected",
            self.proposals, self.denied, self.escalated, self.applied, self.rejected
        )?;
        write!(f, "queue: {}", self.queue)?;
        if self.audit_failures > 0 {
            write!(f, "\naudit failures: {}", self.audit_failures)?;
        }
        Ok(())
    }
}
