// sandbox_boundary.rs — Path-bearing actions must stay inside the sandbox.

use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

/// Allows a path under some writable prefix, denies any other path and
/// abstains on actions without a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SandboxBoundaryLaw;

impl Law for SandboxBoundaryLaw {
    fn id(&self) -> &'static str {
        "sandbox_boundary"
    }

    fn evaluate(&self, state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        let Some(path) = action.target_path() else {
            return LawVerdict::abstain(self.id(), action);
        };
        if state.is_path_allowed(path) {
            LawVerdict::allow(self.id(), format!("{} is inside the sandbox", path))
        } else {
            LawVerdict::deny(
                self.id(),
                format!("{} is outside every writable path", path),
            )
        }
    }
}
