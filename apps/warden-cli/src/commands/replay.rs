// replay.rs — Propose a recorded action sequence, one JSON action per line.
//
// Agent and steward actions may be mixed. Agent actions are proposed as
// the replay's agent, steward actions as the configured steward.
// `approve_action` lines name the approval id an earlier escalation was
// queued under, which is stable across runs with `--deterministic`.
// Records go to the configured audit log, if any.

use std::path::Path;

use anyhow::Context;
use warden_core::GovernanceAction;
use warden_orchestrator::{GovernanceConfig, Orchestrator, ProposalResult};

pub fn execute(
    config: &GovernanceConfig,
    actions_path: &Path,
    agent: Option<&str>,
    deterministic: bool,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(actions_path)
        .with_context(|| format!("failed to read actions from {}", actions_path.display()))?;
    let actions = parse_actions(&content)?;
    let agent_id = agent.unwrap_or(&config.agent_id);

    let (clock, ids) = super::time_and_ids(deterministic);
    let mut orchestrator = Orchestrator::from_config(config, clock, ids)?;
    tracing::info!(
        actions = actions.len(),
        agent_id = %agent_id,
        deterministic,
        "replaying action sequence"
    );

    let results = replay(&mut orchestrator, actions.clone(), agent_id);
    for (action, result) in actions.iter().zip(&results) {
        if json {
            println!("{}", serde_json::to_string(result)?);
        } else {
            println!("{:<48} {}", action.to_string(), result);
        }
    }

    if !json {
        println!();
        println!("Budget:     {}", orchestrator.budget_status());
        println!("Proposals:  {}", orchestrator.statistics());
        println!("State hash: {}", orchestrator.state_hash()?);
        for pending in orchestrator.pending_approvals() {
            println!(
                "Pending:    {} {} ({}): {}",
                pending.id, pending.action, pending.authorization_rank, pending.reason
            );
        }
    }
    Ok(())
}

/// Parse one action per non-blank line. Lines starting with `#` are comments.
pub fn parse_actions(content: &str) -> anyhow::Result<Vec<GovernanceAction>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("invalid action on line {}", index + 1))
        })
        .collect()
}

/// Propose every action in order. Unlike `propose_sequence`, a refusal or
/// escalation does not end the run; later lines may resolve it.
pub fn replay(
    orchestrator: &mut Orchestrator,
    actions: Vec<GovernanceAction>,
    agent_id: &str,
) -> Vec<ProposalResult> {
    let steward_id = orchestrator.steward_id().to_string();
    actions
        .into_iter()
        .map(|action| {
            let proposer = if action.is_steward_action() {
                steward_id.as_str()
            } else {
                agent_id
            };
            orchestrator.propose(action, proposer)
        })
        .collect()
}
