// protected_pattern.rs — Protected path patterns need a steward's eye.

use warden_core::{GovernanceAction, GovernanceState};

use crate::law::{Law, LawVerdict};

/// Escalates a path containing a protected pattern, allows other paths and
/// abstains on actions without a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtectedPatternLaw;

impl Law for ProtectedPatternLaw {
    fn id(&self) -> &'static str {
        "protected_pattern"
    }

    fn evaluate(&self, state: &GovernanceState, action: &GovernanceAction) -> LawVerdict {
        let Some(path) = action.target_path() else {
            return LawVerdict::abstain(self.id(), action);
        };
        let matched = state
            .protected_patterns()
            .iter()
            .find(|pattern| path.contains(pattern.as_str()));
        match matched {
            Some(pattern) => LawVerdict::escalate(
                self.id(),
                format!("{} matches protected pattern {:?}", path, pattern),
            ),
            None => LawVerdict::allow(self.id(), format!("{} matches no protected pattern", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::law::LawDecision;
    use crate::laws::fixtures;

    #[test]
    fn protected_path_escalates() {
        let verdict = ProtectedPatternLaw.evaluate(
            &fixtures::state(10_000, 0),
            &fixtures::write("/workspace/.ssh/key"),
        );
        assert_eq!(verdict.decision, LawDecision::Escalate);
        assert!(verdict.reason.contains(".ssh"));
    }

    #[test]
    fn ordinary_path_allows() {
        let verdict = ProtectedPatternLaw.evaluate(
            &fixtures::state(10_000, 0),
            &fixtures::delete("/workspace/tmp.txt"),
        );
        assert_eq!(verdict.decision, LawDecision::Allow);
    }

    #[test]
    fn pattern_match_ignores_sandbox() {
        // Outside the sandbox is the boundary law's concern; this law only
        // looks for patterns.
        let verdict = ProtectedPatternLaw.evaluate(
            &fixtures::state(10_000, 0),
            &fixtures::write("/etc/credentials"),
        );
        assert_eq!(verdict.decision, LawDecision::Escalate);
    }

    #[test]
    fn pathless_actions_abstain() {
        let verdict = ProtectedPatternLaw.evaluate(
            &fixtures::state(10_000, 0),
            &fixtures::shell("cat ~/.ssh/id_rsa"),
        );
        assert_eq!(verdict.decision, LawDecision::Abstain);
    }
}
