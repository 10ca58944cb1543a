// state.rs — The governance state snapshot.
//
// A GovernanceState is never mutated in place. Every accepted transition
// builds a new value; the path sets sit behind `Arc` so a budget-only
// transition shares them with its predecessor. Sets are ordered
// (`BTreeSet`) so the JSON encoding, and therefore the state hash, is stable.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::budget::BudgetState;

/// Sandbox boundary, protected patterns and budget for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceState {
    /// Stable identity, carried unchanged through every transition.
    state_id: Uuid,
    /// Path prefixes the agent may write under.
    writable_paths: Arc<BTreeSet<String>>,
    /// Substrings that mark a path as protected (e.g. ".ssh").
    protected_patterns: Arc<BTreeSet<String>>,
    budget: BudgetState,
}

impl GovernanceState {
    pub fn new<W, P>(
        state_id: Uuid,
        writable_paths: W,
        protected_patterns: P,
        budget: BudgetState,
    ) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            state_id,
            writable_paths: Arc::new(writable_paths.into_iter().map(Into::into).collect()),
            protected_patterns: Arc::new(protected_patterns.into_iter().map(Into::into).collect()),
            budget,
        }
    }

    pub fn state_id(&self) -> Uuid {
        self.state_id
    }

    pub fn writable_paths(&self) -> &BTreeSet<String> {
        &self.writable_paths
    }

    pub fn protected_patterns(&self) -> &BTreeSet<String> {
        &self.protected_patterns
    }

    pub fn budget(&self) -> &BudgetState {
        &self.budget
    }

    /// True when some writable prefix is a prefix of `path`.
    pub fn is_path_allowed(&self, path: &str) -> bool {
        self.writable_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// True when some protected pattern occurs anywhere in `path`.
    pub fn is_path_protected(&self, path: &str) -> bool {
        self.protected_patterns
            .iter()
            .any(|pattern| path.contains(pattern.as_str()))
    }

    /// New state with a different budget; path sets are shared.
    pub fn with_budget(&self, budget: BudgetState) -> Self {
        Self {
            state_id: self.state_id,
            writable_paths: Arc::clone(&self.writable_paths),
            protected_patterns: Arc::clone(&self.protected_patterns),
            budget,
        }
    }

    /// New state with `prefix` added to the sandbox.
    pub fn with_writable_path(&self, prefix: impl Into<String>) -> Self {
        let mut paths = (*self.writable_paths).clone();
        paths.insert(prefix.into());
        Self {
            writable_paths: Arc::new(paths),
            ..self.clone()
        }
    }

    /// New state with `prefix` removed from the sandbox.
    pub fn without_writable_path(&self, prefix: &str) -> Self {
        let mut paths = (*self.writable_paths).clone();
        paths.remove(prefix);
        Self {
            writable_paths: Arc::new(paths),
            ..self.clone()
        }
    }

    /// New state with `pattern` added to the protected set.
    pub fn with_protected_pattern(&self, pattern: impl Into<String>) -> Self {
        let mut patterns = (*self.protected_patterns).clone();
        patterns.insert(pattern.into());
        Self {
            protected_patterns: Arc::new(patterns),
            ..self.clone()
        }
    }

    /// New state with `pattern` removed from the protected set.
    pub fn without_protected_pattern(&self, pattern: &str) -> Self {
        let mut patterns = (*self.protected_patterns).clone();
        patterns.remove(pattern);
        Self {
            protected_patterns: Arc::new(patterns),
            ..self.clone()
        }
    }
}
