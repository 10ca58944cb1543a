// End-to-end governance scenarios against a default-configured orchestrator.

use std::sync::Arc;

use chrono::Duration;
use tempfile::tempdir;
use uuid::Uuid;
use warden_audit::{AuditKind, AuditLog, MemorySink};
use warden_core::{
    AuthorizationRank, EnforcementLevel, GovernanceAction, ManualClock, SequentialIds,
};
use warden_orchestrator::{
    ApprovalResult, GovernanceConfig, Orchestrator, ProposalOutcome, RefusalKind,
};
use warden_policy::LawDecision;

const AGENT: &str = "agent-7";

fn orchestrator() -> (Orchestrator, MemorySink, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let sink = MemorySink::new();
    let orchestrator = Orchestrator::from_config(
        &GovernanceConfig::default(),
        clock.clone(),
        Arc::new(SequentialIds::default()),
    )
    .unwrap()
    .with_audit_sink(sink.clone());
    (orchestrator, sink, clock)
}

fn research(n: u128, tokens: u64) -> GovernanceAction {
    GovernanceAction::Research {
        id: Uuid::from_u128(0x1000 + n),
        estimated_tokens: tokens,
    }
}

fn write(n: u128, path: &str) -> GovernanceAction {
    GovernanceAction::WriteFile {
        id: Uuid::from_u128(0x2000 + n),
        path: path.to_string(),
        content: "payload".to_string(),
    }
}

#[test]
fn budget_walks_through_every_enforcement_level() {
    let (mut o, sink, _) = orchestrator();

    let first = o.propose(research(1, 8_500), AGENT);
    assert_eq!(first.outcome, ProposalOutcome::Applied);
    assert_eq!(o.budget_status().enforcement, EnforcementLevel::Degraded);

    let second = o.propose(research(2, 1_100), AGENT);
    assert_eq!(second.outcome, ProposalOutcome::Applied);
    assert_eq!(o.current_state().budget().current_spend(), 9_600);
    assert_eq!(o.budget_status().enforcement, EnforcementLevel::Gated);

    // Gated: any action with a cost goes to a steward.
    let third = o.propose(research(3, 400), AGENT);
    assert_eq!(third.outcome, ProposalOutcome::Escalated);
    let trace = third.trace.as_ref().unwrap();
    assert_eq!(
        trace.deciding_law_ids(),
        vec!["enforcement_gate".to_string()]
    );
    assert_eq!(o.current_state().budget().current_spend(), 9_600);

    // Approval bypasses the laws and lands exactly on the ceiling.
    let approval = o.approve_escalated(third.approval_id.unwrap());
    assert!(approval.is_applied());
    assert_eq!(o.current_state().budget().current_spend(), 10_000);
    assert_eq!(o.budget_status().enforcement, EnforcementLevel::Gated);

    // Steward cuts the ceiling below spend: halted.
    assert!(o.increase_budget(9_000).is_applied());
    assert_eq!(o.budget_status().enforcement, EnforcementLevel::Halted);

    let halted = o.propose(research(4, 0), AGENT);
    assert_eq!(halted.outcome, ProposalOutcome::Denied);
    assert_eq!(halted.refusal, Some(RefusalKind::PolicyDenied));
    assert_eq!(o.current_state().budget().current_spend(), 10_000);

    // Steward actions are exempt from the laws, even when halted.
    assert!(o.increase_budget(50_000).is_applied());
    assert_eq!(o.budget_status().enforcement, EnforcementLevel::Normal);
    assert_eq!(
        o.propose(research(5, 100), AGENT).outcome,
        ProposalOutcome::Applied
    );

    let kinds: Vec<AuditKind> = sink.records().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AuditKind::AgentAction,
            AuditKind::AgentAction,
            AuditKind::ApprovedEscalation,
            AuditKind::StewardIntervention,
            AuditKind::StewardIntervention,
            AuditKind::AgentAction,
        ]
    );
}

#[test]
fn unaffordable_approval_is_refused() {
    let (mut o, _, _) = orchestrator();
    o.propose(research(1, 9_600), AGENT);
    let escalated = o.propose(research(2, 500), AGENT);
    assert_eq!(escalated.outcome, ProposalOutcome::Escalated);

    match o.approve_escalated(escalated.approval_id.unwrap()) {
        ApprovalResult::Refused { refusal, rationale } => {
            assert_eq!(refusal, RefusalKind::UnaffordableAction);
            assert!(rationale.contains("afford"));
        }
        other => panic!("expected Refused, got {:?}", other),
    }
    assert_eq!(o.current_state().budget().current_spend(), 9_600);
}

#[test]
fn protected_write_inside_sandbox_is_escalated() {
    let (mut o, _, _) = orchestrator();
    let result = o.propose(write(1, "/workspace/.ssh/key"), AGENT);
    assert_eq!(result.outcome, ProposalOutcome::Escalated);

    let trace = result.trace.unwrap();
    let decision_of = |id: &str| {
        trace
            .verdicts
            .iter()
            .find(|v| v.law_id == id)
            .map(|v| v.decision)
    };
    assert_eq!(decision_of("sandbox_boundary"), Some(LawDecision::Allow));
    assert_eq!(
        decision_of("protected_pattern"),
        Some(LawDecision::Escalate)
    );

    let pending = &o.pending_approvals()[0];
    assert_eq!(pending.authorization_rank, AuthorizationRank::Sensitive);
    assert_eq!(pending.agent_id, AGENT);
    assert!(pending.reason.starts_with("protected_pattern:"));
}

#[test]
fn write_outside_sandbox_is_denied() {
    let (mut o, sink, _) = orchestrator();
    let before = o.current_state().clone();
    let result = o.propose(write(1, "/etc/passwd"), AGENT);
    assert_eq!(result.outcome, ProposalOutcome::Denied);
    assert!(result.rationale.contains("sandbox_boundary"));
    assert_eq!(o.current_state(), &before);
    assert!(sink.is_empty());
    assert!(o.pending_approvals().is_empty());
}

#[test]
fn deny_wins_over_escalation() {
    // Deleting a protected file outside the sandbox: the sandbox denies,
    // while the pattern and deletion laws both escalate.
    let (mut o, _, _) = orchestrator();
    let action = GovernanceAction::DeleteFile {
        id: Uuid::from_u128(1),
        path: "/home/user/.ssh/authorized_keys".to_string(),
    };
    let result = o.propose(action, AGENT);
    assert_eq!(result.outcome, ProposalOutcome::Denied);
    let trace = result.trace.unwrap();
    assert_eq!(trace.verdicts_with(LawDecision::Escalate).count(), 2);
    assert!(o.pending_approvals().is_empty());
}

#[test]
fn replay_is_deterministic() {
    let actions = vec![
        research(1, 2_000),
        write(2, "/workspace/notes.md"),
        research(3, 6_500),
        write(4, "/workspace/out.txt"),
    ];

    let run = || {
        let (mut o, sink, _) = orchestrator();
        let results = o.propose_sequence(actions.clone(), AGENT);
        (results, o.state_hash().unwrap(), sink.records())
    };
    let (results_a, hash_a, records_a) = run();
    let (results_b, hash_b, records_b) = run();

    assert_eq!(results_a, results_b);
    assert_eq!(hash_a, hash_b);
    assert_eq!(records_a, records_b);
    assert_eq!(records_a.last().unwrap().state_hash, hash_a);
    assert!(results_a.iter().all(|r| r.is_applied()));
}

#[test]
fn pending_entries_outlive_history_pruning() {
    let (mut o, _, clock) = orchestrator();
    let approve_me = o
        .propose(write(1, "/workspace/.ssh/config"), AGENT)
        .approval_id
        .unwrap();
    let keep_waiting = o
        .propose(write(2, "/workspace/credentials.json"), AGENT)
        .approval_id
        .unwrap();
    assert!(o.approve_escalated(approve_me).is_applied());

    clock.advance(Duration::days(10));
    assert_eq!(o.clear_resolved(Duration::days(7)), 1);
    assert!(o.approval_queue().resolution(approve_me).is_none());
    assert_eq!(o.pending_approvals()[0].id, keep_waiting);
    assert_eq!(o.approval_queue().stale_pending(Duration::days(7)).len(), 1);
}

#[test]
fn audit_log_chain_survives_a_session() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("audit").join("warden.jsonl");
    let mut config = GovernanceConfig::default();
    config.audit.log_path = Some(log_path.clone());

    {
        let mut o = Orchestrator::from_config(
            &config,
            Arc::new(ManualClock::default()),
            Arc::new(SequentialIds::default()),
        )
        .unwrap();
        o.propose(research(1, 1_000), AGENT);
        let id = o
            .propose(write(2, "/workspace/.ssh/key"), AGENT)
            .approval_id
            .unwrap();
        o.approve_escalated(id);
        o.reset_budget();
    }

    assert_eq!(AuditLog::verify_chain(&log_path).unwrap(), 3);
    let records = AuditLog::read_all(&log_path).unwrap();
    assert_eq!(records[1].kind, AuditKind::ApprovedEscalation);
    assert_eq!(records[1].law_ids, vec!["protected_pattern".to_string()]);
    assert_eq!(records[2].new_spend, 0);
    assert_eq!(records[2].prior_spend, 1_100);
}
