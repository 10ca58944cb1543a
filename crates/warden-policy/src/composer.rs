// composer.rs — Deny-wins composition of the standard laws.
//
// Every law is evaluated, in declaration order, with no short-circuit: the
// trace records all six verdicts even when the first one already denies.
// The verdicts then compose:
//
//   any Deny      → Deny
//   any Escalate  → Escalate
//   otherwise     → Allow   (all-abstain included)

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawDecision, LawVerdict};
use crate::laws::{GovernanceLaw, STANDARD_LAWS};

/// How individual verdicts combine into one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionRule {
    /// A single `Deny` vetoes everything; otherwise a single `Escalate`
    /// routes to a steward.
    #[default]
    DenyWins,
}

impl CompositionRule {
    pub fn compose(&self, verdicts: &[LawVerdict]) -> LawDecision {
        match self {
            CompositionRule::DenyWins => {
                if verdicts.iter().any(|v| v.decision == LawDecision::Deny) {
                    LawDecision::Deny
                } else if verdicts.iter().any(|v| v.decision == LawDecision::Escalate) {
                    LawDecision::Escalate
                } else {
                    LawDecision::Allow
                }
            }
        }
    }
}

impl fmt::Display for CompositionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionRule::DenyWins => write!(f, "deny_wins"),
        }
    }
}

/// Full record of one policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionTrace {
    pub jurisdiction_id: String,
    pub composition_rule: CompositionRule,
    /// Correlation id of the evaluated action.
    pub correlation_id: Uuid,
    /// One verdict per law, in law declaration order.
    pub verdicts: Vec<LawVerdict>,
    /// Never `Abstain`.
    pub composed_decision: LawDecision,
}

impl CompositionTrace {
    /// Verdicts with the given decision, in law order.
    pub fn verdicts_with(&self, decision: LawDecision) -> impl Iterator<Item = &LawVerdict> + '_ {
        self.verdicts.iter().filter(move |v| v.decision == decision)
    }

    /// Verdicts that produced the composed decision. For an `Allow` this is
    /// every law that allowed (possibly none, when all abstained).
    pub fn deciding_verdicts(&self) -> Vec<&LawVerdict> {
        self.verdicts_with(self.composed_decision).collect()
    }

    /// Ids of the laws that produced the composed decision.
    pub fn deciding_law_ids(&self) -> Vec<String> {
        self.deciding_verdicts()
            .into_iter()
            .map(|v| v.law_id.clone())
            .collect()
    }

    /// `law_id: reason` for every escalating law, joined with `"; "`.
    pub fn escalation_reason(&self) -> String {
        join_reasons(self.verdicts_with(LawDecision::Escalate))
    }

    /// `law_id: reason` for every denying law, joined with `"; "`.
    pub fn denial_reason(&self) -> String {
        join_reasons(self.verdicts_with(LawDecision::Deny))
    }
}

fn join_reasons<'a>(verdicts: impl Iterator<Item = &'a LawVerdict>) -> String {
    verdicts
        .map(|v| format!("{}: {}", v.law_id, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl fmt::Display for CompositionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "jurisdiction {} ({}) action {}: {}",
            self.jurisdiction_id, self.composition_rule, self.correlation_id, self.composed_decision
        )?;
        for verdict in &self.verdicts {
            writeln!(f, "  {}", verdict)?;
        }
        Ok(())
    }
}

/// A jurisdiction's composed policy: an ordered law set plus a rule.
#[derive(Debug, Clone)]
pub struct GovernancePolicy {
    jurisdiction_id: String,
    rule: CompositionRule,
    laws: &'static [GovernanceLaw],
}

impl GovernancePolicy {
    /// The six standard laws under deny-wins.
    pub fn standard(jurisdiction_id: impl Into<String>) -> Self {
        Self {
            jurisdiction_id: jurisdiction_id.into(),
            rule: CompositionRule::DenyWins,
            laws: &STANDARD_LAWS,
        }
    }

    pub fn jurisdiction_id(&self) -> &str {
        &self.jurisdiction_id
    }

    pub fn rule(&self) -> CompositionRule {
        self.rule
    }

    pub fn laws(&self) -> &[GovernanceLaw] {
        self.laws
    }

    /// Evaluate every law against `action` and compose the verdicts.
    pub fn evaluate(&self, state: &GovernanceState, action: &GovernanceAction) -> CompositionTrace {
        let verdicts: Vec<LawVerdict> = self
            .laws
            .iter()
            .map(|law| {
                let verdict = law.evaluate(state, action);
                tracing::debug!(
                    law = verdict.law_id.as_str(),
                    decision = %verdict.decision,
                    action = action.kind(),
                    "law evaluated"
                );
                verdict
            })
            .collect();
        let composed_decision = self.rule.compose(&verdicts);

        CompositionTrace {
            jurisdiction_id: self.jurisdiction_id.clone(),
            composition_rule: self.rule,
            correlation_id: action.correlation_id(),
            verdicts,
            composed_decision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::fixtures;

    fn policy() -> GovernancePolicy {
        GovernancePolicy::standard("test")
    }

    fn verdict(id: &str, decision: LawDecision) -> LawVerdict {
        LawVerdict::new(id, decision, "r")
    }

    #[test]
    fn deny_wins_regardless_of_order() {
        let mut verdicts = vec![
            verdict("a", LawDecision::Allow),
            verdict("b", LawDecision::Escalate),
            verdict("c", LawDecision::Deny),
            verdict("d", LawDecision::Abstain),
        ];
        for _ in 0..verdicts.len() {
            verdicts.rotate_left(1);
            assert_eq!(
                CompositionRule::DenyWins.compose(&verdicts),
                LawDecision::Deny
            );
        }
    }

    #[test]
    fn escalate_without_deny_escalates() {
        let verdicts = vec![
            verdict("a", LawDecision::Allow),
            verdict("b", LawDecision::Abstain),
            verdict("c", LawDecision::Escalate),
        ];
        assert_eq!(
            CompositionRule::DenyWins.compose(&verdicts),
            LawDecision::Escalate
        );
    }

    #[test]
    fn all_abstain_composes_to_allow() {
        let verdicts = vec![
            verdict("a", LawDecision::Abstain),
            verdict("b", LawDecision::Abstain),
        ];
        assert_eq!(
            CompositionRule::DenyWins.compose(&verdicts),
            LawDecision::Allow
        );
        assert_eq!(CompositionRule::DenyWins.compose(&[]), LawDecision::Allow);
    }

    #[test]
    fn every_law_is_recorded_in_order() {
        // Sandbox denies first; the rest must still be evaluated.
        let trace = policy().evaluate(&fixtures::state(10_000, 0), &fixtures::delete("/etc/hosts"));
        assert_eq!(trace.verdicts.len(), 6);
        let ids: Vec<&str> = trace.verdicts.iter().map(|v| v.law_id.as_str()).collect();
        assert_eq!(ids[0], "enforcement_gate");
        assert_eq!(ids[5], "outbound_comm");
        assert_eq!(trace.composed_decision, LawDecision::Deny);
        assert_eq!(
            trace.deciding_law_ids(),
            vec!["sandbox_boundary".to_string()]
        );
        // The deletion law still escalated even though the result is a deny.
        assert_eq!(trace.verdicts_with(LawDecision::Escalate).count(), 1);
    }

    #[test]
    fn protected_write_inside_sandbox_escalates() {
        let trace = policy().evaluate(
            &fixtures::state(10_000, 0),
            &fixtures::write("/workspace/.ssh/key"),
        );
        assert_eq!(trace.composed_decision, LawDecision::Escalate);
        assert!(trace.escalation_reason().starts_with("protected_pattern:"));
    }

    #[test]
    fn research_is_allowed_with_mostly_abstentions() {
        let trace = policy().evaluate(&fixtures::state(10_000, 0), &fixtures::research(500));
        assert_eq!(trace.composed_decision, LawDecision::Allow);
        assert_eq!(trace.verdicts_with(LawDecision::Abstain).count(), 5);
        assert_eq!(
            trace.deciding_law_ids(),
            vec!["enforcement_gate".to_string()]
        );
    }

    #[test]
    fn escalation_reason_aggregates_every_escalating_law() {
        // Gated budget plus a deletion: two independent escalations.
        let trace = policy().evaluate(
            &fixtures::state(10_000, 9_600),
            &fixtures::delete("/workspace/old.txt"),
        );
        assert_eq!(trace.composed_decision, LawDecision::Escalate);
        let reason = trace.escalation_reason();
        assert!(reason.contains("enforcement_gate:"));
        assert!(reason.contains("deletion_approval:"));
        assert_eq!(reason.matches("; ").count(), 1);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let state = fixtures::state(10_000, 9_600);
        let action = fixtures::email();
        assert_eq!(
            policy().evaluate(&state, &action),
            policy().evaluate(&state, &action)
        );
    }

    #[test]
    fn trace_carries_jurisdiction_and_correlation() {
        let action = fixtures::shell("make");
        let trace = policy().evaluate(&fixtures::state(10_000, 0), &action);
        assert_eq!(trace.jurisdiction_id, "test");
        assert_eq!(trace.composition_rule, CompositionRule::DenyWins);
        assert_eq!(trace.correlation_id, action.correlation_id());
    }

    #[test]
    fn trace_serializes_decisions_as_snake_case() {
        let trace = policy().evaluate(&fixtures::state(10_000, 0), &fixtures::research(1));
        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"composition_rule\":\"deny_wins\""));
        assert!(json.contains("\"composed_decision\":\"allow\""));
    }
}
