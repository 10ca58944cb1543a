// deletion_approval.rs — Every deletion needs approval.

use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionApprovalLaw;

impl Law for DeletionApprovalLaw {
    fn id(&self) -> &'static str {
        "deletion_approval"
    }

    fn evaluate(&self, _state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        match action {
            GovernanceAction::DeleteFile { path, .. } => LawVerdict::escalate(
                self.id(),
                format!("deleting {} is irreversible and requires approval", path),
            ),
            GovernanceAction::WriteFile { .. }
            | GovernanceAction::Research { .. }
            | GovernanceAction::SendEmail { .. }
            | GovernanceAction::ExecuteShellCommand { .. }
            | GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => LawVerdict::abstain(self.id(), action),
        }
    }
}
