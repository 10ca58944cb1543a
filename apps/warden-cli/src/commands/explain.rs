// explain.rs — Show how every law judges one action, without applying it.

use anyhow::Context;
use warden_core::GovernanceAction;
use warden_orchestrator::{GovernanceConfig, Orchestrator};
use warden_policy::CompositionTrace;

pub fn execute(
    config: &GovernanceConfig,
    action_json: &str,
    spend: Option<u64>,
) -> anyhow::Result<()> {
    let action: GovernanceAction = serde_json::from_str(action_json)
        .context("failed to parse --action as a governance action")?;
    let (trace, budget) = explain(config, &action, spend)?;

    println!("Action:  {}", action);
    println!(
        "Cost:    {} tokens, authorization rank {}",
        action.token_cost(),
        action.authorization_rank()
    );
    println!("Budget:  {}", budget);
    println!();
    print!("{}", trace);
    println!();
    println!("Decision: {}", trace.composed_decision);
    let deciding = trace.deciding_law_ids();
    if !deciding.is_empty() {
        println!("Decided by: {}", deciding.join(", "));
    }
    Ok(())
}

/// Evaluate `action` against a fresh engine built from `config`.
pub fn explain(
    config: &GovernanceConfig,
    action: &GovernanceAction,
    spend: Option<u64>,
) -> anyhow::Result<(CompositionTrace, String)> {
    let mut config = config.clone();
    config.audit.log_path = None;
    if let Some(spend) = spend {
        config.budget.initial_spend = spend;
    }
    let (clock, ids) = super::time_and_ids(true);
    let orchestrator = Orchestrator::from_config(&config, clock, ids)?;
    Ok((
        orchestrator.explain(action),
        orchestrator.budget_status().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_policy::LawDecision;

    fn parse(json: &str) -> GovernanceAction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn shell_command_needs_approval() {
        let action = parse(
            r#"{"kind": "execute_shell_command", "id": "00000000-0000-0000-0000-000000000001", "command": "rm -rf /"}"#,
        );
        let (trace, _) = explain(&GovernanceConfig::default(), &action, None).unwrap();
        assert_eq!(trace.composed_decision, LawDecision::Escalate);
        assert_eq!(
            trace.deciding_law_ids(),
            vec!["shell_command_approval".to_string()]
        );
        assert_eq!(trace.verdicts.len(), 6);
    }

    #[test]
    fn spend_override_changes_the_gate() {
        let action = parse(
            r#"{"kind": "research", "id": "00000000-0000-0000-0000-000000000001", "estimated_tokens": 10}"#,
        );
        let config = GovernanceConfig::default();

        let (normal, _) = explain(&config, &action, None).unwrap();
        assert_eq!(normal.composed_decision, LawDecision::Allow);

        let (gated, budget) = explain(&config, &action, Some(9_700)).unwrap();
        assert_eq!(gated.composed_decision, LawDecision::Escalate);
        assert!(budget.ends_with("enforcement gated"));
    }

    #[test]
    fn unparseable_action_is_an_error() {
        let result = execute(&GovernanceConfig::default(), "{\"kind\": \"launch\"}", None);
        assert!(result.is_err());
    }
}
