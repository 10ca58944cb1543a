// laws/mod.rs — The closed set of governance laws.
//
// The six laws and their order are fixed. `STANDARD_LAWS` is the order in
// which the composer evaluates them and the order their verdicts appear in
// every trace. There is no runtime registration.

mod deletion_approval;
mod enforcement_gate;
mod outbound_comm;
mod protected_pattern;
mod sandbox_boundary;
mod shell_command;

pub use deletion_approval::DeletionApprovalLaw;
pub use enforcement_gate::EnforcementGateLaw;
pub use outbound_comm::OutboundCommLaw;
pub use protected_pattern::ProtectedPatternLaw;
pub use sandbox_boundary::SandboxBoundaryLaw;
pub use shell_command::ShellCommandApprovalLaw;

use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

/// One of the six standard laws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernanceLaw {
    EnforcementGate(EnforcementGateLaw),
    SandboxBoundary(SandboxBoundaryLaw),
    ProtectedPattern(ProtectedPatternLaw),
    DeletionApproval(DeletionApprovalLaw),
    ShellCommandApproval(ShellCommandApprovalLaw),
    OutboundComm(OutboundCommLaw),
}

/// The standard law set, in evaluation order.
pub static STANDARD_LAWS: [GovernanceLaw; 6] = [
    GovernanceLaw::EnforcementGate(EnforcementGateLaw),
    GovernanceLaw::SandboxBoundary(SandboxBoundaryLaw),
    GovernanceLaw::ProtectedPattern(ProtectedPatternLaw),
    GovernanceLaw::DeletionApproval(DeletionApprovalLaw),
    GovernanceLaw::ShellCommandApproval(ShellCommandApprovalLaw),
    GovernanceLaw::OutboundComm(OutboundCommLaw),
];

impl Law for GovernanceLaw {
    fn id(&self) -> &'static str {
        match self {
            GovernanceLaw::EnforcementGate(law) => law.id(),
            GovernanceLaw::SandboxBoundary(law) => law.id(),
            GovernanceLaw::ProtectedPattern(law) => law.id(),
            GovernanceLaw::DeletionApproval(law) => law.id(),
            GovernanceLaw::ShellCommandApproval(law) => law.id(),
            GovernanceLaw::OutboundComm(law) => law.id(),
        }
    }

    fn evaluate(&self, state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        match self {
            GovernanceLaw::EnforcementGate(law) => law.evaluate(state, action),
            GovernanceLaw::SandboxBoundary(law) => law.evaluate(state, action),
            GovernanceLaw::ProtectedPattern(law) => law.evaluate(state, action),
            GovernanceLaw::DeletionApproval(law) => law.evaluate(state, action),
            GovernanceLaw::ShellCommandApproval(law) => law.evaluate(state, action),
            GovernanceLaw::OutboundComm(law) => law.evaluate(state, action),
        }
    }
}
