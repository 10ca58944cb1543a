// reducer.rs — Pure budget-mutation state transition.
//
// The reducer is budget arithmetic only. It never consults the laws and
// never inspects paths: by the time an action reaches it, policy (or a
// steward) has already decided the action may run. What is left is:
//
//   agent action   → charge `token_cost`, or refuse if it cannot be afforded
//   IncreaseBudget → replace the ceiling, relax the baseline, reconcile
//   ResetBudget    → zero spend, back to Normal
//   Approve/Reject → queue acknowledgements; state passes through unchanged
//
// The reducer never fails: every refusal is a `Reduction` with
// `accepted == false` and a rationale.

use crate::action::GovernanceAction;
use crate::state::GovernanceState;

/// Outcome of reducing one action against one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// Whether the action was applied.
    pub accepted: bool,
    /// Resulting state; equal to the input state when not accepted.
    pub new_state: GovernanceState,
    /// Human-readable explanation of what happened.
    pub rationale: String,
}

impl Reduction {
    fn accepted(new_state: GovernanceState, rationale: String) -> Self {
        Self {
            accepted: true,
            new_state,
            rationale,
        }
    }

    fn refused(state: &GovernanceState, rationale: String) -> Self {
        Self {
            accepted: false,
            new_state: state.clone(),
            rationale,
        }
    }
}

/// The budget reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetReducer;

impl BudgetReducer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce `action` against `state`. Deterministic and side-effect free.
    pub fn reduce(&self, state: &GovernanceState, action: &GovernanceAction) -> Reduction {
        match action {
            GovernanceAction::IncreaseBudget { new_ceiling, .. } => {
                increase_budget(state, *new_ceiling)
            }
            GovernanceAction::ResetBudget { .. } => {
                let budget = state.budget().reset();
                let rationale = format!(
                    "steward reset spend to 0/{} tokens, enforcement {}",
                    budget.task_ceiling(),
                    budget.enforcement()
                );
                Reduction::accepted(state.with_budget(budget), rationale)
            }
            GovernanceAction::ApproveAction { approval_id, .. } => Reduction::accepted(
                state.clone(),
                format!("approval {} acknowledged; budget unchanged", approval_id),
            ),
            GovernanceAction::RejectAction { approval_id, .. } => Reduction::accepted(
                state.clone(),
                format!(
                    "rejection of {} acknowledged; budget unchanged",
                    approval_id
                ),
            ),
            GovernanceAction::WriteFile { .. }
            | GovernanceAction::Research { .. }
            | GovernanceAction::SendEmail { .. }
            | GovernanceAction::DeleteFile { .. }
            | GovernanceAction::ExecuteShellCommand { .. } => charge(state, action),
        }
    }
}

fn charge(state: &GovernanceState, action: &GovernanceAction) -> Reduction {
    let budget = state.budget();
    let cost = action.token_cost();

    if !budget.can_afford(cost) {
        tracing::debug!(
            action = action.kind(),
            cost,
            remaining = budget.remaining(),
            "reducer refused unaffordable action"
        );
        return Reduction::refused(
            state,
            format!(
                "cannot afford {} tokens for {}: {} of {} tokens remaining",
                cost,
                action.kind(),
                budget.remaining(),
                budget.task_ceiling()
            ),
        );
    }

    // can_afford guarantees the sum neither overflows nor exceeds the ceiling.
    let new_budget = budget.with_spend(budget.current_spend() + cost);
    let mut rationale = format!(
        "charged {} tokens for {}: {}/{} spent",
        cost,
        action.kind(),
        new_budget.current_spend(),
        new_budget.task_ceiling()
    );
    if new_budget.enforcement() != budget.enforcement() {
        rationale.push_str(&format!(
            ", enforcement {} -> {}",
            budget.enforcement(),
            new_budget.enforcement()
        ));
    } else {
        rationale.push_str(&format!(", enforcement {}", new_budget.enforcement()));
    }

    Reduction::accepted(state.with_budget(new_budget), rationale)
}

fn increase_budget(state: &GovernanceState, new_ceiling: u64) -> Reduction {
    let budget = state.budget();
    // A steward override may loosen enforcement, so the baseline is relaxed
    // after the new ceiling is in place.
    match budget.with_ceiling(new_ceiling) {
        Ok(raised) => {
            let relaxed = raised.relaxed();
            let rationale = format!(
                "steward set ceiling {} -> {} tokens, enforcement {} -> {}",
                budget.task_ceiling(),
                relaxed.task_ceiling(),
                budget.enforcement(),
                relaxed.enforcement()
            );
            Reduction::accepted(state.with_budget(relaxed), rationale)
        }
        Err(e) => Reduction::refused(state, format!("budget change refused: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetState, EnforcementLevel};
    use uuid::Uuid;

    fn id() -> Uuid {
        Uuid::from_u128(0x42)
    }

    fn state(ceiling: u64, spend: u64) -> GovernanceState {
        GovernanceState::new(
            Uuid::from_u128(1),
            ["/workspace"],
            [".ssh"],
            BudgetState::new(ceiling, spend).unwrap(),
        )
    }

    fn research(tokens: u64) -> GovernanceAction {
        GovernanceAction::Research {
            id: id(),
            estimated_tokens: tokens,
        }
    }

    #[test]
    fn research_deducts_estimate() {
        let result = BudgetReducer.reduce(&state(10_000, 0), &research(500));
        assert!(result.accepted);
        assert_eq!(result.new_state.budget().current_spend(), 500);
        assert_eq!(result.new_state.budget().task_ceiling(), 10_000);
    }

    #[test]
    fn write_deducts_fixed_cost() {
        let action = GovernanceAction::WriteFile {
            id: id(),
            path: "/workspace/f.txt".to_string(),
            content: "data".to_string(),
        };
        let result = BudgetReducer.reduce(&state(10_000, 0), &action);
        assert!(result.accepted);
        assert_eq!(result.new_state.budget().current_spend(), 100);
    }

    #[test]
    fn reducer_ignores_paths() {
        // Sandbox enforcement belongs to the laws; the reducer only charges.
        let action = GovernanceAction::WriteFile {
            id: id(),
            path: "/etc/passwd".to_string(),
            content: String::new(),
        };
        assert!(BudgetReducer.reduce(&state(10_000, 0), &action).accepted);
    }

    #[test]
    fn sequential_actions_accumulate() {
        let r1 = BudgetReducer.reduce(&state(10_000, 0), &research(300));
        let r2 = BudgetReducer.reduce(&r1.new_state, &research(200));
        assert_eq!(r2.new_state.budget().current_spend(), 500);
    }

    #[test]
    fn unaffordable_action_is_refused_without_change() {
        let before = state(100, 0);
        let result = BudgetReducer.reduce(&before, &research(200));
        assert!(!result.accepted);
        assert_eq!(result.new_state, before);
        assert!(result.rationale.contains("afford"));
    }

    #[test]
    fn exact_budget_is_affordable() {
        let result = BudgetReducer.reduce(&state(500, 0), &research(500));
        assert!(result.accepted);
        assert_eq!(result.new_state.budget().current_spend(), 500);
    }

    #[test]
    fn affordability_matches_arithmetic() {
        for (spend, cost, ceiling) in [(0, 10, 10), (5, 6, 10), (9_999, 1, 10_000), (3, 0, 3)] {
            let result = BudgetReducer.reduce(&state(ceiling, spend), &research(cost));
            assert_eq!(result.accepted, spend + cost <= ceiling);
            if result.accepted {
                assert_eq!(result.new_state.budget().current_spend(), spend + cost);
            }
        }
    }

    #[test]
    fn crossing_thresholds_tightens_enforcement() {
        let degraded = BudgetReducer.reduce(&state(10_000, 0), &research(8_500));
        assert_eq!(
            degraded.new_state.budget().enforcement(),
            EnforcementLevel::Degraded
        );
        assert!(degraded.rationale.contains("normal -> degraded"));

        let gated = BudgetReducer.reduce(&degraded.new_state, &research(1_100));
        assert_eq!(
            gated.new_state.budget().enforcement(),
            EnforcementLevel::Gated
        );
        assert_eq!(gated.new_state.budget().current_spend(), 9_600);
    }

    #[test]
    fn overflowing_cost_is_refused() {
        let result = BudgetReducer.reduce(&state(10_000, 10), &research(u64::MAX));
        assert!(!result.accepted);
    }

    #[test]
    fn increase_budget_relaxes_enforcement() {
        let gated = state(1_000, 950);
        assert_eq!(gated.budget().enforcement(), EnforcementLevel::Gated);
        let action = GovernanceAction::IncreaseBudget {
            id: id(),
            new_ceiling: 20_000,
        };
        let result = BudgetReducer.reduce(&gated, &action);
        assert!(result.accepted);
        assert_eq!(result.new_state.budget().task_ceiling(), 20_000);
        assert_eq!(result.new_state.budget().current_spend(), 950);
        assert_eq!(
            result.new_state.budget().enforcement(),
            EnforcementLevel::Normal
        );
    }

    #[test]
    fn ceiling_below_spend_halts() {
        let action = GovernanceAction::IncreaseBudget {
            id: id(),
            new_ceiling: 5_000,
        };
        let result = BudgetReducer.reduce(&state(10_000, 6_000), &action);
        assert!(result.accepted);
        assert_eq!(
            result.new_state.budget().enforcement(),
            EnforcementLevel::Halted
        );
    }

    #[test]
    fn zero_ceiling_is_refused() {
        let before = state(1_000, 10);
        let action = GovernanceAction::IncreaseBudget {
            id: id(),
            new_ceiling: 0,
        };
        let result = BudgetReducer.reduce(&before, &action);
        assert!(!result.accepted);
        assert_eq!(result.new_state, before);
    }

    #[test]
    fn reset_zeroes_spend() {
        let reset = GovernanceAction::ResetBudget { id: id() };
        let result = BudgetReducer.reduce(&state(10_000, 9_800), &reset);
        assert!(result.accepted);
        assert_eq!(result.new_state.budget().current_spend(), 0);
        assert_eq!(
            result.new_state.budget().enforcement(),
            EnforcementLevel::Normal
        );
    }

    #[test]
    fn queue_acknowledgements_pass_state_through() {
        let before = state(10_000, 1_234);
        let approve = GovernanceAction::ApproveAction {
            id: id(),
            approval_id: Uuid::from_u128(99),
        };
        let reject = GovernanceAction::RejectAction {
            id: id(),
            approval_id: Uuid::from_u128(99),
            reason: "no".to_string(),
        };
        for action in [approve, reject] {
            let result = BudgetReducer.reduce(&before, &action);
            assert!(result.accepted);
            assert_eq!(result.new_state, before);
        }
    }

    #[test]
    fn original_state_is_never_mutated() {
        let before = state(10_000, 0);
        let _ = BudgetReducer.reduce(&before, &research(5_000));
        assert_eq!(before.budget().current_spend(), 0);
    }

    #[test]
    fn reduction_is_deterministic() {
        let s = state(10_000, 0);
        let a = research(500);
        assert_eq!(BudgetReducer.reduce(&s, &a), BudgetReducer.reduce(&s, &a));
    }
}
