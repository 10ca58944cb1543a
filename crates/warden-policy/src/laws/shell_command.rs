// shell_command.rs — Shell execution always goes to a steward.

use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellCommandApprovalLaw;

impl Law for ShellCommandApprovalLaw {
    fn id(&self) -> &'static str {
        "shell_command_approval"
    }

    fn evaluate(&self, _state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        match action {
            GovernanceAction::ExecuteShellCommand { .. } => LawVerdict::escalate(
                self.id(),
                "shell commands can modify the system and require approval",
            ),
            GovernanceAction::WriteFile { .. }
            | GovernanceAction::Research { .. }
            | GovernanceAction::SendEmail { .. }
            | GovernanceAction::DeleteFile { .. }
            | GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => LawVerdict::abstain(self.id(), action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::law::LawDecision;
    use crate::laws::fixtures;

    #[test]
    fn any_command_escalates() {
        let state = fixtures::state(10_000, 0);
        for command in ["ls", "rm -rf /", ""] {
            let verdict = ShellCommandApprovalLaw.evaluate(&state, &fixtures::shell(command));
            assert_eq!(verdict.decision, LawDecision::Escalate);
        }
    }

    #[test]
    fn non_shell_actions_abstain() {
        let verdict =
            ShellCommandApprovalLaw.evaluate(&fixtures::state(10_000, 0), &fixtures::research(1));
        assert_eq!(verdict.decision, LawDecision::Abstain);
    }
}
