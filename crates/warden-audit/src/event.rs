// event.rs — Audit record data model.
//
// One record per committed state transition. Records carry the action's
// one-line description (never file contents or email bodies), the spend
// before and after, the resulting enforcement level and the ids of the
// laws that shaped the outcome. `previous_hash` is filled in by the sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{EnforcementLevel, GovernanceAction};

/// Which path through the engine produced the transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// An agent action allowed by policy and charged by the reducer.
    AgentAction,
    /// A previously escalated action applied after steward approval.
    ApprovedEscalation,
    /// A steward budget override (increase or reset).
    StewardIntervention,
    /// A steward change to writable paths or protected patterns.
    WorkspaceChange,
}

/// A single line in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub record_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub kind: AuditKind,
    /// `GovernanceAction` Display form, or a description of a workspace edit.
    pub action: String,
    /// snake_case action kind, e.g. `write_file`.
    pub action_kind: String,
    pub correlation_id: Uuid,
    /// Queue id when the transition came out of the approval queue.
    pub approval_id: Option<Uuid>,
    pub prior_spend: u64,
    pub new_spend: u64,
    pub enforcement: EnforcementLevel,
    /// Laws whose verdicts decided the outcome. Empty for steward paths.
    #[serde(default)]
    pub law_ids: Vec<String>,
    #[serde(default)]
    pub rationale: String,
    /// SHA-256 of the resulting state.
    pub state_hash: String,
    /// Hash of the previous record's line. `None` for the first record.
    pub previous_hash: Option<String>,
}

impl AuditRecord {
    /// A record with zero spend, `Normal` enforcement and no hash yet; set
    /// those with the `with_*` builders.
    pub fn new(
        record_id: Uuid,
        timestamp: DateTime<Utc>,
        agent_id: impl Into<String>,
        kind: AuditKind,
        action_kind: impl Into<String>,
        action: impl Into<String>,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            record_id,
            timestamp,
            agent_id: agent_id.into(),
            kind,
            action: action.into(),
            action_kind: action_kind.into(),
            correlation_id,
            approval_id: None,
            prior_spend: 0,
            new_spend: 0,
            enforcement: EnforcementLevel::Normal,
            law_ids: Vec::new(),
            rationale: String::new(),
            state_hash: String::new(),
            previous_hash: None,
        }
    }

    /// A record describing `action` by its Display form and kind.
    pub fn for_action(
        record_id: Uuid,
        timestamp: DateTime<Utc>,
        agent_id: impl Into<String>,
        kind: AuditKind,
        action: &GovernanceAction,
    ) -> Self {
        Self::new(
            record_id,
            timestamp,
            agent_id,
            kind,
            action.kind(),
            action.to_string(),
            action.correlation_id(),
        )
    }

    pub fn with_spend(mut self, prior: u64, new: u64) -> Self {
        self.prior_spend = prior;
        self.new_spend = new;
        self
    }

    pub fn with_enforcement(mut self, level: EnforcementLevel) -> Self {
        self.enforcement = level;
        self
    }

    pub fn with_law_ids(mut self, law_ids: Vec<String>) -> Self {
        self.law_ids = law_ids;
        self
    }

    pub fn with_approval_id(mut self, approval_id: Uuid) -> Self {
        self.approval_id = Some(approval_id);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_state_hash(mut self, state_hash: impl Into<String>) -> Self {
        self.state_hash = state_hash.into();
        self
    }
}
