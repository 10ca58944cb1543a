// handle.rs — Thread-safe shared access to one orchestrator.
//
// Every method takes the lock exactly once, so each call is atomic with
// respect to every other call on the same handle. Reads return owned
// snapshots; the lock is never held past the method.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;
use warden_approval::PendingAction;
use warden_core::{AuthorizationRank, GovernanceAction, GovernanceState};
use warden_policy::CompositionTrace;

use crate::orchestrator::{ApprovalResult, Orchestrator, ProposalResult};
use crate::status::{BudgetStatus, OrchestratorStatistics};

/// Cloneable handle; clones drive the same orchestrator.
#[derive(Clone)]
pub struct GovernanceHandle {
    inner: Arc<Mutex<Orchestrator>>,
}

impl GovernanceHandle {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    pub fn propose(&self, action: GovernanceAction, agent_id: &str) -> ProposalResult {
        self.lock().propose(action, agent_id)
    }

    pub fn propose_sequence(
        &self,
        actions: impl IntoIterator<Item = GovernanceAction>,
        agent_id: &str,
    ) -> Vec<ProposalResult> {
        self.lock().propose_sequence(actions, agent_id)
    }

    pub fn approve_escalated(&self, approval_id: Uuid) -> ApprovalResult {
        self.lock().approve_escalated(approval_id)
    }

    pub fn reject_escalated(&self, approval_id: Uuid, reason: &str) -> ApprovalResult {
        self.lock().reject_escalated(approval_id, reason)
    }

    pub fn approve_all_below(&self, rank: AuthorizationRank) -> Vec<(Uuid, ApprovalResult)> {
        self.lock().approve_all_below(rank)
    }

    pub fn increase_budget(&self, new_ceiling: u64) -> ProposalResult {
        self.lock().increase_budget(new_ceiling)
    }

    pub fn reset_budget(&self) -> ProposalResult {
        self.lock().reset_budget()
    }

    pub fn pending_approvals(&self) -> Vec<PendingAction> {
        self.lock().pending_approvals().to_vec()
    }

    /// Snapshot of the current state. Cheap: path sets are shared.
    pub fn current_state(&self) -> GovernanceState {
        self.lock().current_state().clone()
    }

    pub fn explain(&self, action: &GovernanceAction) -> CompositionTrace {
        self.lock().explain(action)
    }

    pub fn budget_status(&self) -> BudgetStatus {
        self.lock().budget_status()
    }

    pub fn statistics(&self) -> OrchestratorStatistics {
        self.lock().statistics()
    }

    /// Run `f` with exclusive access, for operations without a wrapper.
    pub fn with<R>(&self, f: impl FnOnce(&mut Orchestrator) -> R) -> R {
        f(&mut self.lock())
    }

    // A panic inside the orchestrator only happens on an invariant
    // violation, after which the state was never installed; the guarded
    // value is still the last good state.
    fn lock(&self) -> MutexGuard<'_, Orchestrator> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
