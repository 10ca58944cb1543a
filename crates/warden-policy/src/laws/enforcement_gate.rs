// enforcement_gate.rs — Budget enforcement level as a policy gate.
//
// Jurisdiction: every action.
//
//   Halted              → Deny, whatever the cost
//   Gated and cost > 0  → Escalate
//   otherwise           → Allow

use warden_core::{EnforcementLevel, GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnforcementGateLaw;

impl Law for EnforcementGateLaw {
    fn id(&self) -> &'static str {
        "enforcement_gate"
    }

    fn evaluate(&self, state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        let budget = state.budget();
        let cost = action.token_cost();
        match budget.enforcement() {
            EnforcementLevel::Halted => LawVerdict::deny(
                self.id(),
                format!(
                    "budget halted at {}/{} tokens, all actions blocked until a steward intervenes",
                    budget.current_spend(),
                    budget.task_ceiling()
                ),
            ),
            EnforcementLevel::Gated if cost > 0 => LawVerdict::escalate(
                self.id(),
                format!(
                    "budget gated at {}/{} tokens, {} costs {} tokens and needs approval",
                    budget.current_spend(),
                    budget.task_ceiling(),
                    action.kind(),
                    cost
                ),
            ),
            level => LawVerdict::allow(
                self.id(),
                format!(
                    "enforcement {} permits {} ({} tokens)",
                    level,
                    action.kind(),
                    cost
                ),
            ),
        }
    }
}
