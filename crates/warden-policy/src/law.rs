// law.rs — The Law interface and its verdict type.
//
// A law is a pure function from (state, action) to a verdict. Laws hold no
// state, never fail and never look at free text: only cost, path and the
// action's kind. Outside its jurisdiction a law abstains; abstention is not
// approval, and the composer keeps the two apart.

use std::fmt;

use serde::{Deserialize, Serialize};
use warden_core::{GovernanceAction, GovernanceState};

/// Decision of a single law, or the composed decision of a policy.
///
/// A composed decision is never `Abstain`: an all-abstain evaluation
/// composes to `Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LawDecision {
    Allow,
    Deny,
    Escalate,
    Abstain,
}

impl fmt::Display for LawDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LawDecision::Allow => write!(f, "allow"),
            LawDecision::Deny => write!(f, "deny"),
            LawDecision::Escalate => write!(f, "escalate"),
            LawDecision::Abstain => write!(f, "abstain"),
        }
    }
}

/// Output of one law for one (state, action) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawVerdict {
    pub law_id: String,
    pub decision: LawDecision,
    pub reason: String,
}

impl LawVerdict {
    pub fn new(law_id: &str, decision: LawDecision, reason: impl Into<String>) -> Self {
        Self {
            law_id: law_id.to_string(),
            decision,
            reason: reason.into(),
        }
    }

    pub fn allow(law_id: &str, reason: impl Into<String>) -> Self {
        Self::new(law_id, LawDecision::Allow, reason)
    }

    pub fn deny(law_id: &str, reason: impl Into<String>) -> Self {
        Self::new(law_id, LawDecision::Deny, reason)
    }

    pub fn escalate(law_id: &str, reason: impl Into<String>) -> Self {
        Self::new(law_id, LawDecision::Escalate, reason)
    }

    /// The action is outside this law's jurisdiction.
    pub fn abstain(law_id: &str, action: &GovernanceAction) -> Self {
        Self::new(
            law_id,
            LawDecision::Abstain,
            format!("{} is outside jurisdiction", action.kind()),
        )
    }
}

impl fmt::Display for LawVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.law_id, self.decision, self.reason)
    }
}

/// A stateless governance rule.
pub trait Law {
    /// Stable identifier, recorded in traces and audit records.
    fn id(&self) -> &'static str;

    /// Evaluate `action` against `state`. Must be deterministic.
    fn evaluate(&self, state: &GovernanceState, action: &GovernanceAction) -> LawVerdict;
}
