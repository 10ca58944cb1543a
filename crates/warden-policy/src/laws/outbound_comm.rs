// outbound_comm.rs — Messages leaving the workspace need approval.

use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutboundCommLaw;

impl Law for OutboundCommLaw {
    fn id(&self) -> &'static str {
        "outbound_comm"
    }

    fn evaluate(&self, _state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        match action {
            GovernanceAction::SendEmail { to, .. } => LawVerdict::escalate(
                self.id(),
                format!("outbound email to {} requires approval", to),
            ),
            GovernanceAction::WriteFile { .. }
            | GovernanceAction::Research { .. }
            | GovernanceAction::DeleteFile { .. }
            | GovernanceAction::ExecuteShellCommand { .. }
            | GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => LawVerdict::abstain(self.id(), action),
        }
    }
}
