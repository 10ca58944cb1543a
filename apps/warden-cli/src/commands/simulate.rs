// simulate.rs — Walk a fresh engine through every enforcement level.
//
// Spends 85% then 11% of the ceiling (degraded, then gated), proposes a
// further 4% (escalated and approved), has the steward cut the ceiling
// below spend (halted), shows that a free action is still blocked, then
// raises the ceiling and spends again. Uses a fixed clock and sequential
// ids, and never touches the configured audit log.

use std::fmt::Display;
use std::sync::Arc;

use uuid::Uuid;
use warden_audit::MemorySink;
use warden_core::{GovernanceAction, ManualClock, SequentialIds};
use warden_orchestrator::{GovernanceConfig, Orchestrator};

/// Below this, the 1% and 4% steps round down to zero tokens.
pub const MIN_CEILING: u64 = 100;

/// One line of simulation output.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationStep {
    pub label: String,
    pub outcome: String,
    pub budget: String,
}

pub fn execute(config: &GovernanceConfig, ceiling: Option<u64>) -> anyhow::Result<()> {
    let (steps, records) = run(config, ceiling)?;

    println!("{:<36} {:<44} BUDGET", "STEP", "OUTCOME");
    println!("{}", "-".repeat(120));
    for step in &steps {
        println!(
            "{:<36} {:<44} {}",
            step.label,
            truncate(&step.outcome, 44),
            step.budget
        );
    }
    println!();
    println!("{} audit record(s) written to memory.", records);
    Ok(())
}

/// Run the scenario and return its steps plus the number of audit records.
pub fn run(
    config: &GovernanceConfig,
    ceiling: Option<u64>,
) -> anyhow::Result<(Vec<SimulationStep>, usize)> {
    let mut config = config.clone();
    config.audit.log_path = None;
    config.budget.initial_spend = 0;
    if let Some(ceiling) = ceiling {
        config.budget.task_ceiling = ceiling;
    }
    let ceiling = config.budget.task_ceiling;
    if ceiling < MIN_CEILING {
        anyhow::bail!(
            "simulate needs a task ceiling of at least {} tokens, got {}",
            MIN_CEILING,
            ceiling
        );
    }
    let percent = |p: u64| ceiling.saturating_mul(p) / 100;

    let sink = MemorySink::new();
    let orchestrator = Orchestrator::from_config(
        &config,
        Arc::new(ManualClock::default()),
        Arc::new(SequentialIds::starting_at(1_000)),
    )?
    .with_audit_sink(sink.clone());
    let mut walk = Walk {
        orchestrator,
        agent: config.agent_id.clone(),
        steps: Vec::new(),
        next_id: 0,
    };

    walk.research(percent(85));
    walk.research(percent(11));
    if let Some(approval_id) = walk.research(percent(4)) {
        let approval = walk.orchestrator.approve_escalated(approval_id);
        walk.record("steward approves escalation", approval);
    }

    let cut = percent(90);
    let result = walk.orchestrator.increase_budget(cut);
    walk.record(format!("steward sets ceiling {}", cut), result);

    walk.research(0);

    let raised = ceiling.saturating_mul(5);
    let result = walk.orchestrator.increase_budget(raised);
    walk.record(format!("steward sets ceiling {}", raised), result);

    walk.research(percent(1));

    tracing::info!(
        steps = walk.steps.len(),
        statistics = %walk.orchestrator.statistics(),
        "simulation finished"
    );
    Ok((walk.steps, sink.len()))
}

struct Walk {
    orchestrator: Orchestrator,
    agent: String,
    steps: Vec<SimulationStep>,
    next_id: u128,
}

impl Walk {
    /// Propose a research action; returns the approval id if it escalated.
    fn research(&mut self, tokens: u64) -> Option<Uuid> {
        self.next_id += 1;
        let action = GovernanceAction::Research {
            id: Uuid::from_u128(self.next_id),
            estimated_tokens: tokens,
        };
        let result = self.orchestrator.propose(action, &self.agent);
        let approval_id = result.approval_id;
        self.record(format!("research {} tokens", tokens), result);
        approval_id
    }

    fn record(&mut self, label: impl Into<String>, outcome: impl Display) {
        let label = label.into();
        let outcome = outcome.to_string();
        tracing::debug!(step = %label, outcome = %outcome, "simulation step");
        self.steps.push(SimulationStep {
            label,
            outcome,
            budget: self.orchestrator.budget_status().to_string(),
        });
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}
