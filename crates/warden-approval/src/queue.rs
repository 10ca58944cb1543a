// queue.rs — Pending escalations and their resolution history.
//
// An escalated action waits here until a steward approves or rejects it.
// Resolution moves the entry out of the pending list and records the
// outcome in a history keyed by id. Pending entries never expire; only the
// resolution history can be pruned by age.
//
// The queue is a plain single-owner value (`&mut self` for every change).
// The orchestrator that owns it provides the serialization point.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AuthorizationRank, Clock, GovernanceAction, IdSource};

/// An escalated action awaiting a steward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Queue id, also used as the approval id.
    pub id: Uuid,
    pub action: GovernanceAction,
    pub authorization_rank: AuthorizationRank,
    /// Aggregated reason from every escalating law.
    pub reason: String,
    pub submitted_at: DateTime<Utc>,
    pub agent_id: String,
    /// Ids of the laws that escalated, in law order.
    #[serde(default)]
    pub law_ids: Vec<String>,
}

/// How a queue entry was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    Approved { at: DateTime<Utc> },
    Rejected { reason: String, at: DateTime<Utc> },
}

impl Resolution {
    pub fn resolved_at(&self) -> DateTime<Utc> {
        match self {
            Resolution::Approved { at } | Resolution::Rejected { at, .. } => *at,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Resolution::Approved { .. })
    }
}

/// Snapshot counts for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatistics {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending_by_rank: BTreeMap<AuthorizationRank, usize>,
}

impl QueueStatistics {
    pub fn resolved(&self) -> usize {
        self.approved + self.rejected
    }
}

impl fmt::Display for QueueStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pending, {} approved, {} rejected",
            self.pending, self.approved, self.rejected
        )?;
        if !self.pending_by_rank.is_empty() {
            let ranks: Vec<String> = self
                .pending_by_rank
                .iter()
                .map(|(rank, count)| format!("{}={}", rank, count))
                .collect();
            write!(f, " ({})", ranks.join(", "))?;
        }
        Ok(())
    }
}

/// Store of escalated actions.
#[derive(Debug)]
pub struct ApprovalQueue {
    /// Submission order.
    pending: Vec<PendingAction>,
    resolutions: BTreeMap<Uuid, Resolution>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
}

impl ApprovalQueue {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdSource>) -> Self {
        Self {
            pending: Vec::new(),
            resolutions: BTreeMap::new(),
            clock,
            ids,
        }
    }

    /// Queue `action` for review. Returns the new entry's id.
    pub fn submit(
        &mut self,
        action: GovernanceAction,
        authorization_rank: AuthorizationRank,
        reason: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Uuid {
        self.submit_with_laws(
            action,
            authorization_rank,
            reason,
            agent_id,
            Vec::new(),
        )
    }

    /// Like [`submit`](Self::submit), also recording which laws escalated.
    pub fn submit_with_laws(
        &mut self,
        action: GovernanceAction,
        authorization_rank: AuthorizationRank,
        reason: impl Into<String>,
        agent_id: impl Into<String>,
        law_ids: Vec<String>,
    ) -> Uuid {
        let entry = PendingAction {
            id: self.ids.next_id(),
            action,
            authorization_rank,
            reason: reason.into(),
            submitted_at: self.clock.now(),
            agent_id: agent_id.into(),
            law_ids,
        };
        let id = entry.id;
        tracing::debug!(
            approval_id = %id,
            action = entry.action.kind(),
            rank = %entry.authorization_rank,
            "action queued for approval"
        );
        self.pending.push(entry);
        id
    }

    /// Pending entries in submission order.
    pub fn list_pending(&self) -> &[PendingAction] {
        &self.pending
    }

    pub fn get_pending(&self, id: Uuid) -> Option<&PendingAction> {
        self.pending.iter().find(|entry| entry.id == id)
    }

    /// Recorded resolution for a previously pending id.
    pub fn resolution(&self, id: Uuid) -> Option<&Resolution> {
        self.resolutions.get(&id)
    }

    /// Approve a pending entry. `None` when the id is unknown or already
    /// resolved; nothing changes in that case.
    pub fn approve(&mut self, id: Uuid) -> Option<PendingAction> {
        let entry = self.take(id)?;
        let at = self.clock.now();
        self.resolutions.insert(id, Resolution::Approved { at });
        tracing::debug!(approval_id = %id, "pending action approved");
        Some(entry)
    }

    /// Reject a pending entry with a reason. `None` when the id is unknown
    /// or already resolved.
    pub fn reject(&mut self, id: Uuid, reason: impl Into<String>) -> Option<PendingAction> {
        let entry = self.take(id)?;
        let at = self.clock.now();
        let reason = reason.into();
        tracing::debug!(
            approval_id = %id,
            reason = reason.as_str(),
            "pending action rejected"
        );
        self.resolutions.insert(id, Resolution::Rejected { reason, at });
        Some(entry)
    }

    /// Approve every pending entry whose rank is strictly below `rank`.
    /// Returned in submission order; higher-ranked entries stay pending.
    pub fn approve_all_below(&mut self, rank: AuthorizationRank) -> Vec<PendingAction> {
        let at = self.clock.now();
        let (approved, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|entry| entry.authorization_rank < rank);
        self.pending = kept;
        for entry in &approved {
            self.resolutions.insert(entry.id, Resolution::Approved { at });
        }
        tracing::debug!(count = approved.len(), below = %rank, "bulk approval");
        approved
    }

    /// Drop resolution records at least `older_than` old. Pending entries
    /// are never touched. Returns how many records were removed.
    pub fn clear_resolved(&mut self, older_than: Duration) -> usize {
        let now = self.clock.now();
        let before = self.resolutions.len();
        self.resolutions.retain(|_, resolution| {
            now.signed_duration_since(resolution.resolved_at()) < older_than
        });
        before - self.resolutions.len()
    }

    /// Pending entries submitted at least `older_than` ago. Report only;
    /// nothing is resolved.
    pub fn stale_pending(&self, older_than: Duration) -> Vec<&PendingAction> {
        let now = self.clock.now();
        self.pending
            .iter()
            .filter(|entry| now.signed_duration_since(entry.submitted_at) >= older_than)
            .collect()
    }

    pub fn statistics(&self) -> QueueStatistics {
        let mut pending_by_rank = BTreeMap::new();
        for entry in &self.pending {
            *pending_by_rank.entry(entry.authorization_rank).or_insert(0) += 1;
        }
        let approved = self
            .resolutions
            .values()
            .filter(|r| r.is_approved())
            .count();
        QueueStatistics {
            pending: self.pending.len(),
            approved,
            rejected: self.resolutions.len() - approved,
            pending_by_rank,
        }
    }

    fn take(&mut self, id: Uuid) -> Option<PendingAction> {
        let index = self.pending.iter().position(|entry| entry.id == id)?;
        Some(self.pending.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{ManualClock, SequentialIds};

    fn queue() -> (ApprovalQueue, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let queue = ApprovalQueue::new(clock.clone(), Arc::new(SequentialIds::default()));
        (queue, clock)
    }

    fn delete(n: u128) -> GovernanceAction {
        GovernanceAction::DeleteFile {
            id: Uuid::from_u128(1000 + n),
            path: format!("/workspace/{}", n),
        }
    }

    fn email(n: u128) -> GovernanceAction {
        GovernanceAction::SendEmail {
            id: Uuid::from_u128(2000 + n),
            to: "a@b.c".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        }
    }

    #[test]
    fn submit_assigns_injected_id_and_time() {
        let (mut q, clock) = queue();
        clock.advance(Duration::seconds(5));
        let id = q.submit(
            delete(1),
            AuthorizationRank::Sensitive,
            "deletion",
            "agent-1",
        );
        assert_eq!(id, Uuid::from_u128(1));
        let entry = q.get_pending(id).unwrap();
        assert_eq!(entry.submitted_at, clock.now());
        assert_eq!(entry.agent_id, "agent-1");
        assert!(entry.law_ids.is_empty());
    }

    #[test]
    fn pending_list_keeps_submission_order() {
        let (mut q, _) = queue();
        let a = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        let b = q.submit(email(2), AuthorizationRank::ExternalNetwork, "r", "x");
        let ids: Vec<Uuid> = q.list_pending().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn approve_returns_action_and_records_resolution() {
        let (mut q, clock) = queue();
        let id = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        clock.advance(Duration::minutes(3));
        let entry = q.approve(id).unwrap();
        assert_eq!(entry.action, delete(1));
        assert!(q.list_pending().is_empty());
        assert_eq!(
            q.resolution(id),
            Some(&Resolution::Approved { at: clock.now() })
        );
    }

    #[test]
    fn reject_records_reason() {
        let (mut q, _) = queue();
        let id = q.submit(email(1), AuthorizationRank::ExternalNetwork, "r", "x");
        assert!(q.reject(id, "not now").is_some());
        match q.resolution(id) {
            Some(Resolution::Rejected { reason, .. }) => assert_eq!(reason, "not now"),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn unknown_or_resolved_ids_are_no_ops() {
        let (mut q, _) = queue();
        assert!(q.approve(Uuid::from_u128(77)).is_none());
        assert!(q.reject(Uuid::from_u128(77), "x").is_none());

        let id = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        assert!(q.approve(id).is_some());
        assert!(q.approve(id).is_none(), "second approval is not found");
        assert!(q.reject(id, "late").is_none());
        assert!(
            q.resolution(id).unwrap().is_approved(),
            "first outcome stands"
        );
    }

    #[test]
    fn approve_all_below_is_strict_and_ordered() {
        let (mut q, _) = queue();
        let e1 = q.submit(email(1), AuthorizationRank::ExternalNetwork, "r", "x");
        let d1 = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        let e2 = q.submit(email(2), AuthorizationRank::ExternalNetwork, "r", "x");

        let approved = q.approve_all_below(AuthorizationRank::Sensitive);
        let ids: Vec<Uuid> = approved.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![e1, e2]);
        assert_eq!(q.list_pending().len(), 1);
        assert_eq!(q.list_pending()[0].id, d1);
        assert!(q.resolution(e2).unwrap().is_approved());
        assert!(q.resolution(d1).is_none());
    }

    #[test]
    fn clear_resolved_never_touches_pending() {
        let (mut q, clock) = queue();
        let old = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        q.approve(old);
        clock.advance(Duration::hours(2));
        let recent = q.submit(delete(2), AuthorizationRank::Sensitive, "r", "x");
        q.reject(recent, "no");
        let waiting = q.submit(delete(3), AuthorizationRank::Sensitive, "r", "x");
        clock.advance(Duration::hours(30));

        // `old` is 32h old, `recent` 30h: only `old` exceeds 31h.
        assert_eq!(q.clear_resolved(Duration::hours(31)), 1);
        assert!(q.resolution(old).is_none());
        assert!(q.resolution(recent).is_some());
        assert!(q.get_pending(waiting).is_some());
    }

    #[test]
    fn stale_pending_is_report_only() {
        let (mut q, clock) = queue();
        let id = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        clock.advance(Duration::days(2));
        assert_eq!(q.stale_pending(Duration::days(1)).len(), 1);
        assert!(q.stale_pending(Duration::days(3)).is_empty());
        assert!(q.get_pending(id).is_some());
    }

    #[test]
    fn statistics_count_by_rank() {
        let (mut q, _) = queue();
        q.submit(email(1), AuthorizationRank::ExternalNetwork, "r", "x");
        let d = q.submit(delete(1), AuthorizationRank::Sensitive, "r", "x");
        let d2 = q.submit(delete(2), AuthorizationRank::Sensitive, "r", "x");
        q.approve(d);
        q.reject(d2, "no");

        let stats = q.statistics();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.resolved(), 2);
        assert_eq!(
            stats.pending_by_rank.get(&AuthorizationRank::ExternalNetwork),
            Some(&1)
        );
        assert!(stats.to_string().starts_with("1 pending, 1 approved, 1 rejected"));
    }

    #[test]
    fn resolution_serializes_with_tag() {
        let json = serde_json::to_string(&Resolution::Rejected {
            reason: "no".to_string(),
            at: DateTime::<Utc>::UNIX_EPOCH,
        })
        .unwrap();
        assert!(json.contains("\"resolution\":\"rejected\""));
    }
}
