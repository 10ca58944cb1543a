// orchestrator.rs — The governance control loop.
//
// Every proposal walks one path:
//
//   steward action   → reducer directly (approve/reject go through the queue)
//   agent action     → policy composer
//       Deny         → Denied, no state change
//       Escalate     → approval queue, Escalated + approval id
//       Allow        → reducer → Applied, or Rejected when unaffordable
//
// An approved escalation goes back to the reducer without re-running the
// laws. Every committed transition is checked against the reconciliation
// invariant and then handed to the audit sink.
//
// The Orchestrator is a single-owner value: every operation takes `&mut
// self` and completes before the next starts. `GovernanceHandle` shares
// one across threads behind a mutex.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_approval::{ApprovalQueue, PendingAction};
use warden_audit::{hasher, AuditError, AuditKind, AuditLog, AuditRecord, AuditSink, NullSink};
use warden_core::{
    AuthorizationRank, BudgetReducer, Clock, GovernanceAction, GovernanceState, IdSource,
};
use warden_policy::{CompositionTrace, GovernancePolicy, LawDecision};

use crate::config::GovernanceConfig;
use crate::error::OrchestratorError;
use crate::status::{BudgetStatus, OrchestratorStatistics};

/// Final state of one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOutcome {
    /// The reducer accepted the action and the state changed.
    Applied,
    /// Policy allowed it (or a steward approved it) but it could not be applied.
    Rejected,
    /// A law vetoed the action.
    Denied,
    /// Waiting in the approval queue.
    Escalated,
}

impl fmt::Display for ProposalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalOutcome::Applied => write!(f, "applied"),
            ProposalOutcome::Rejected => write!(f, "rejected"),
            ProposalOutcome::Denied => write!(f, "denied"),
            ProposalOutcome::Escalated => write!(f, "escalated"),
        }
    }
}

/// Why a proposal did not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalKind {
    /// A law denied. Retry only after changing the action or the state.
    PolicyDenied,
    /// Not enough budget left. Retry after a budget increase or reset.
    UnaffordableAction,
    /// A steward budget change was invalid (zero ceiling).
    InvalidBudgetChange,
    /// The approval id is unknown or already resolved.
    ApprovalNotFound,
}

impl fmt::Display for RefusalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefusalKind::PolicyDenied => write!(f, "policy denied"),
            RefusalKind::UnaffordableAction => write!(f, "unaffordable"),
            RefusalKind::InvalidBudgetChange => write!(f, "invalid budget change"),
            RefusalKind::ApprovalNotFound => write!(f, "approval not found"),
        }
    }
}

/// Everything a caller needs to explain a proposal's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalResult {
    pub outcome: ProposalOutcome,
    /// Present whenever the laws were evaluated.
    pub trace: Option<CompositionTrace>,
    /// Queue id for escalations, or the resolved id for steward approvals.
    pub approval_id: Option<Uuid>,
    /// Set for `Rejected` and `Denied`.
    pub refusal: Option<RefusalKind>,
    pub rationale: String,
}

impl ProposalResult {
    fn applied(trace: Option<CompositionTrace>, rationale: String) -> Self {
        Self {
            outcome: ProposalOutcome::Applied,
            trace,
            approval_id: None,
            refusal: None,
            rationale,
        }
    }

    fn rejected(trace: Option<CompositionTrace>, refusal: RefusalKind, rationale: String) -> Self {
        Self {
            outcome: ProposalOutcome::Rejected,
            trace,
            approval_id: None,
            refusal: Some(refusal),
            rationale,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == ProposalOutcome::Applied
    }
}

impl fmt::Display for ProposalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.outcome, self.rationale)?;
        if let Some(id) = self.approval_id {
            write!(f, " [approval {}]", id)?;
        }
        Ok(())
    }
}

/// Result of resolving a queued escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ApprovalResult {
    /// Approved and applied by the reducer.
    Applied { rationale: String },
    /// Approved, but the reducer refused it (e.g. no longer affordable).
    /// The queue entry is resolved either way.
    Refused {
        refusal: RefusalKind,
        rationale: String,
    },
    /// Rejected by the steward.
    Rejected,
    /// No pending entry with that id.
    NotFound,
}

impl ApprovalResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApprovalResult::Applied { .. })
    }
}

impl fmt::Display for ApprovalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalResult::Applied { rationale } => write!(f, "applied: {}", rationale),
            ApprovalResult::Refused { refusal, rationale } => {
                write!(f, "refused ({}): {}", refusal, rationale)
            }
            ApprovalResult::Rejected => write!(f, "rejected by steward"),
            ApprovalResult::NotFound => write!(f, "{}", RefusalKind::ApprovalNotFound),
        }
    }
}

/// The governance engine for one jurisdiction.
pub struct Orchestrator {
    state: GovernanceState,
    policy: GovernancePolicy,
    reducer: BudgetReducer,
    queue: ApprovalQueue,
    sink: Box<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
    steward_id: String,
    stats: OrchestratorStatistics,
}

impl Orchestrator {
    /// An orchestrator with no audit sink and steward id `"steward"`.
    pub fn new(
        state: GovernanceState,
        policy: GovernancePolicy,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
    ) -> Self {
        Self {
            state,
            policy,
            reducer: BudgetReducer::new(),
            queue: ApprovalQueue::new(Arc::clone(&clock), Arc::clone(&ids)),
            sink: Box::new(NullSink),
            clock,
            ids,
            steward_id: "steward".to_string(),
            stats: OrchestratorStatistics::default(),
        }
    }

    /// Build from configuration, opening the audit log when one is configured.
    pub fn from_config(
        config: &GovernanceConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
    ) -> Result<Self, OrchestratorError> {
        let state = config.initial_state(ids.as_ref())?;
        let policy = GovernancePolicy::standard(config.jurisdiction_id.clone());
        let mut orchestrator =
            Self::new(state, policy, clock, ids).with_steward_id(config.steward_id.clone());
        if let Some(path) = &config.audit.log_path {
            orchestrator = orchestrator.with_audit_sink(AuditLog::open(path)?);
        }
        tracing::info!(
            jurisdiction = config.jurisdiction_id.as_str(),
            ceiling = config.budget.task_ceiling,
            "orchestrator ready"
        );
        Ok(orchestrator)
    }

    pub fn with_audit_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_steward_id(mut self, steward_id: impl Into<String>) -> Self {
        self.steward_id = steward_id.into();
        self
    }

    // ── Proposals ──

    /// Route one action through policy, queue and reducer.
    pub fn propose(&mut self, action: GovernanceAction, agent_id: &str) -> ProposalResult {
        match action {
            GovernanceAction::ApproveAction { approval_id, .. } => {
                let result = self.approve_escalated(approval_id);
                steward_resolution_result(approval_id, result)
            }
            GovernanceAction::RejectAction {
                approval_id,
                reason,
                ..
            } => {
                let result = self.reject_escalated(approval_id, &reason);
                steward_resolution_result(approval_id, result)
            }
            GovernanceAction::IncreaseBudget { .. } | GovernanceAction::ResetBudget { .. } => {
                self.apply_budget_override(action, agent_id)
            }
            GovernanceAction::WriteFile { .. }
            | GovernanceAction::Research { .. }
            | GovernanceAction::SendEmail { .. }
            | GovernanceAction::DeleteFile { .. }
            | GovernanceAction::ExecuteShellCommand { .. } => self.govern(action, agent_id),
        }
    }

    /// Propose actions in order, stopping after the first one that is not
    /// applied. The returned list ends with that result.
    pub fn propose_sequence(
        &mut self,
        actions: impl IntoIterator<Item = GovernanceAction>,
        agent_id: &str,
    ) -> Vec<ProposalResult> {
        let mut results = Vec::new();
        for action in actions {
            let result = self.propose(action, agent_id);
            let applied = result.is_applied();
            results.push(result);
            if !applied {
                break;
            }
        }
        results
    }

    fn govern(&mut self, action: GovernanceAction, agent_id: &str) -> ProposalResult {
        self.stats.proposals += 1;
        let trace = self.policy.evaluate(&self.state, &action);
        match trace.composed_decision {
            LawDecision::Deny => {
                let rationale = format!("denied by {}", trace.denial_reason());
                tracing::warn!(
                    agent = agent_id,
                    action = %action,
                    laws = ?trace.deciding_law_ids(),
                    "proposal denied"
                );
                self.stats.denied += 1;
                ProposalResult {
                    outcome: ProposalOutcome::Denied,
                    trace: Some(trace),
                    approval_id: None,
                    refusal: Some(RefusalKind::PolicyDenied),
                    rationale,
                }
            }
            LawDecision::Escalate => {
                let reason = trace.escalation_reason();
                let rank = action.authorization_rank();
                let approval_id = self.queue.submit_with_laws(
                    action,
                    rank,
                    reason.clone(),
                    agent_id,
                    trace.deciding_law_ids(),
                );
                tracing::info!(
                    agent = agent_id,
                    approval_id = %approval_id,
                    rank = %rank,
                    "proposal escalated"
                );
                self.stats.escalated += 1;
                ProposalResult {
                    outcome: ProposalOutcome::Escalated,
                    trace: Some(trace),
                    approval_id: Some(approval_id),
                    refusal: None,
                    rationale: format!("awaiting approval: {}", reason),
                }
            }
            LawDecision::Allow | LawDecision::Abstain => {
                let reduction = self.reducer.reduce(&self.state, &action);
                if reduction.accepted {
                    let record = self
                        .record_for(AuditKind::AgentAction, agent_id, &action)
                        .with_law_ids(trace.deciding_law_ids())
                        .with_rationale(reduction.rationale.clone());
                    self.commit(reduction.new_state, record);
                    self.stats.applied += 1;
                    tracing::info!(agent = agent_id, action = %action, "proposal applied");
                    ProposalResult::applied(Some(trace), reduction.rationale)
                } else {
                    tracing::warn!(
                        agent = agent_id,
                        action = %action,
                        rationale = reduction.rationale.as_str(),
                        "allowed proposal refused by reducer"
                    );
                    self.stats.rejected += 1;
                    ProposalResult::rejected(
                        Some(trace),
                        RefusalKind::UnaffordableAction,
                        reduction.rationale,
                    )
                }
            }
        }
    }

    fn apply_budget_override(&mut self, action: GovernanceAction, steward: &str) -> ProposalResult {
        let reduction = self.reducer.reduce(&self.state, &action);
        if reduction.accepted {
            tracing::info!(
                steward,
                action = %action,
                rationale = reduction.rationale.as_str(),
                "steward intervention"
            );
            let record = self
                .record_for(AuditKind::StewardIntervention, steward, &action)
                .with_rationale(reduction.rationale.clone());
            self.commit(reduction.new_state, record);
            self.stats.applied += 1;
            ProposalResult::applied(None, reduction.rationale)
        } else {
            tracing::warn!(
                steward,
                rationale = reduction.rationale.as_str(),
                "steward budget change refused"
            );
            self.stats.rejected += 1;
            ProposalResult::rejected(None, refusal_for(&action), reduction.rationale)
        }
    }

    // ── Approval path ──

    /// Approve a queued escalation and apply it, skipping the laws.
    pub fn approve_escalated(&mut self, approval_id: Uuid) -> ApprovalResult {
        match self.queue.approve(approval_id) {
            Some(entry) => self.apply_approved(entry),
            None => {
                tracing::debug!(approval_id = %approval_id, "approval id not pending");
                ApprovalResult::NotFound
            }
        }
    }

    /// Reject a queued escalation. No state change.
    pub fn reject_escalated(&mut self, approval_id: Uuid, reason: &str) -> ApprovalResult {
        match self.queue.reject(approval_id, reason) {
            Some(entry) => {
                tracing::info!(
                    approval_id = %approval_id,
                    action = %entry.action,
                    reason,
                    "escalation rejected"
                );
                ApprovalResult::Rejected
            }
            None => {
                tracing::debug!(approval_id = %approval_id, "rejection id not pending");
                ApprovalResult::NotFound
            }
        }
    }

    /// Approve every pending entry ranked strictly below `rank`, applying
    /// each in submission order against the state left by the previous one.
    pub fn approve_all_below(&mut self, rank: AuthorizationRank) -> Vec<(Uuid, ApprovalResult)> {
        self.queue
            .approve_all_below(rank)
            .into_iter()
            .map(|entry| (entry.id, self.apply_approved(entry)))
            .collect()
    }

    fn apply_approved(&mut self, entry: PendingAction) -> ApprovalResult {
        let reduction = self.reducer.reduce(&self.state, &entry.action);
        if reduction.accepted {
            let record = self
                .record_for(
                    AuditKind::ApprovedEscalation,
                    &entry.agent_id,
                    &entry.action,
                )
                .with_approval_id(entry.id)
                .with_law_ids(entry.law_ids.clone())
                .with_rationale(reduction.rationale.clone());
            self.commit(reduction.new_state, record);
            self.stats.applied += 1;
            tracing::info!(
                approval_id = %entry.id,
                action = %entry.action,
                "escalation approved and applied"
            );
            ApprovalResult::Applied {
                rationale: reduction.rationale,
            }
        } else {
            self.stats.rejected += 1;
            tracing::warn!(
                approval_id = %entry.id,
                rationale = reduction.rationale.as_str(),
                "approved escalation refused by reducer"
            );
            ApprovalResult::Refused {
                refusal: refusal_for(&entry.action),
                rationale: reduction.rationale,
            }
        }
    }

    /// Prune resolution history older than `older_than`. Pending entries stay.
    pub fn clear_resolved(&mut self, older_than: Duration) -> usize {
        self.queue.clear_resolved(older_than)
    }

    // ── Steward conveniences ──

    pub fn increase_budget(&mut self, new_ceiling: u64) -> ProposalResult {
        let action = GovernanceAction::IncreaseBudget {
            id: self.ids.next_id(),
            new_ceiling,
        };
        let steward = self.steward_id.clone();
        self.propose(action, &steward)
    }

    pub fn reset_budget(&mut self) -> ProposalResult {
        let action = GovernanceAction::ResetBudget {
            id: self.ids.next_id(),
        };
        let steward = self.steward_id.clone();
        self.propose(action, &steward)
    }

    /// Widen the sandbox. Returns false when the prefix was already writable.
    pub fn add_writable_path(&mut self, prefix: &str) -> bool {
        if self.state.writable_paths().contains(prefix) {
            return false;
        }
        let next = self.state.with_writable_path(prefix);
        self.commit_workspace_change(
            next,
            "add_writable_path",
            format!("add writable path {}", prefix),
        );
        true
    }

    /// Narrow the sandbox. Returns false when the prefix was not writable.
    pub fn remove_writable_path(&mut self, prefix: &str) -> bool {
        if !self.state.writable_paths().contains(prefix) {
            return false;
        }
        let next = self.state.without_writable_path(prefix);
        self.commit_workspace_change(
            next,
            "remove_writable_path",
            format!("remove writable path {}", prefix),
        );
        true
    }

    pub fn add_protected_pattern(&mut self, pattern: &str) -> bool {
        if self.state.protected_patterns().contains(pattern) {
            return false;
        }
        let next = self.state.with_protected_pattern(pattern);
        self.commit_workspace_change(
            next,
            "add_protected_pattern",
            format!("add protected pattern {}", pattern),
        );
        true
    }

    pub fn remove_protected_pattern(&mut self, pattern: &str) -> bool {
        if !self.state.protected_patterns().contains(pattern) {
            return false;
        }
        let next = self.state.without_protected_pattern(pattern);
        self.commit_workspace_change(
            next,
            "remove_protected_pattern",
            format!("remove protected pattern {}", pattern),
        );
        true
    }

    // ── Read-only queries ──

    pub fn current_state(&self) -> &GovernanceState {
        &self.state
    }

    /// SHA-256 of the current state.
    pub fn state_hash(&self) -> Result<String, AuditError> {
        hasher::hash_state(&self.state)
    }

    /// Pending escalations in submission order.
    pub fn pending_approvals(&self) -> &[PendingAction] {
        self.queue.list_pending()
    }

    pub fn approval_queue(&self) -> &ApprovalQueue {
        &self.queue
    }

    /// Evaluate the laws against the current state without acting.
    pub fn explain(&self, action: &GovernanceAction) -> CompositionTrace {
        self.policy.evaluate(&self.state, action)
    }

    pub fn budget_status(&self) -> BudgetStatus {
        BudgetStatus::from(self.state.budget())
    }

    pub fn statistics(&self) -> OrchestratorStatistics {
        OrchestratorStatistics {
            queue: self.queue.statistics(),
            ..self.stats.clone()
        }
    }

    pub fn policy(&self) -> &GovernancePolicy {
        &self.policy
    }

    pub fn steward_id(&self) -> &str {
        &self.steward_id
    }

    // ── Commit ──

    fn record_for(
        &self,
        kind: AuditKind,
        agent_id: &str,
        action: &GovernanceAction,
    ) -> AuditRecord {
        AuditRecord::for_action(
            self.ids.next_id(),
            self.clock.now(),
            agent_id,
            kind,
            action,
        )
    }

    fn commit_workspace_change(&mut self, next: GovernanceState, kind: &str, description: String) {
        tracing::info!(
            steward = self.steward_id.as_str(),
            change = description.as_str(),
            "workspace changed"
        );
        let record = AuditRecord::new(
            self.ids.next_id(),
            self.clock.now(),
            self.steward_id.clone(),
            AuditKind::WorkspaceChange,
            kind,
            description,
            self.ids.next_id(),
        );
        self.commit(next, record);
    }

    /// Install `next` as the current state and audit it.
    ///
    /// # Panics
    ///
    /// Panics if `next` breaks budget reconciliation. That can only happen
    /// through a bug in the budget model, and continuing would mean
    /// enforcing a weaker level than spend warrants.
    fn commit(&mut self, next: GovernanceState, record: AuditRecord) {
        if let Err(violation) = next.budget().verify_reconciled() {
            tracing::error!(error = %violation, "budget reconciliation invariant broken");
            panic!("governance invariant violated: {}", violation);
        }

        let prior_spend = self.state.budget().current_spend();
        self.state = next;

        let hashed = hasher::hash_state(&self.state);
        let state_hash = self.hash_or_count_failure(hashed);
        let budget = self.state.budget();
        let mut record = record
            .with_spend(prior_spend, budget.current_spend())
            .with_enforcement(budget.enforcement())
            .with_state_hash(state_hash);

        if let Err(e) = self.sink.append(&mut record) {
            self.stats.audit_failures += 1;
            tracing::warn!(
                error = %e,
                record_id = %record.record_id,
                "audit append failed; transition stands"
            );
        }
    }

    // An unhashable state still commits; the record goes out with an empty
    // hash and the failure is counted.
    fn hash_or_count_failure(&mut self, hashed: Result<String, AuditError>) -> String {
        match hashed {
            Ok(hash) => hash,
            Err(e) => {
                self.stats.audit_failures += 1;
                tracing::warn!(error = %e, "failed to hash committed state");
                String::new()
            }
        }
    }
}

fn refusal_for(action: &GovernanceAction) -> RefusalKind {
    if action.is_steward_action() {
        RefusalKind::InvalidBudgetChange
    } else {
        RefusalKind::UnaffordableAction
    }
}

/// Map a queue resolution requested through `propose` onto a proposal result.
fn steward_resolution_result(approval_id: Uuid, result: ApprovalResult) -> ProposalResult {
    let mut proposal = match result {
        ApprovalResult::Applied { rationale } => ProposalResult::applied(None, rationale),
        ApprovalResult::Rejected => {
            ProposalResult::applied(None, format!("escalation {} rejected", approval_id))
        }
        ApprovalResult::Refused { refusal, rationale } => {
            ProposalResult::rejected(None, refusal, rationale)
        }
        ApprovalResult::NotFound => ProposalResult::rejected(
            None,
            RefusalKind::ApprovalNotFound,
            format!("no pending escalation {}", approval_id),
        ),
    };
    proposal.approval_id = Some(approval_id);
    proposal
}
