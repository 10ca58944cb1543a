// budget.rs — Token budget and monotonic enforcement levels.
//
// A BudgetState is an immutable value: every change to spend or ceiling
// produces a new value through the reconciling constructor. Reconciliation
// sets the enforcement level to
//
//   max(stored level, level calculated from spend / ceiling)
//
// so enforcement can never be weaker than current spend warrants, no matter
// what level a caller (or a stored snapshot) claims. The one deliberate
// exception is `relaxed()`, used only by steward overrides.

use std::cmp;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Fraction of the ceiling at which enforcement becomes `Degraded`.
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

/// Fraction of the ceiling at which enforcement becomes `Gated`.
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.95;

/// System-wide throttle derived from budget utilization.
///
/// Variant order is the restriction order: `Normal < Degraded < Gated < Halted`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementLevel {
    /// Spend below the warning threshold.
    #[default]
    Normal,
    /// Spend at or above the warning threshold.
    Degraded,
    /// Spend at or above the critical threshold; costly actions need approval.
    Gated,
    /// Spend above the ceiling; everything is denied until a steward intervenes.
    Halted,
}

impl EnforcementLevel {
    /// Level warranted by `spend` against `ceiling` under the given thresholds.
    ///
    /// `ceiling` must be non-zero. Exactly 100% utilization is `Gated`;
    /// only spend strictly above the ceiling halts.
    pub fn calculate(spend: u64, ceiling: u64, warning: f64, critical: f64) -> Self {
        if spend > ceiling {
            return EnforcementLevel::Halted;
        }
        let ratio = spend as f64 / ceiling as f64;
        if ratio >= critical {
            EnforcementLevel::Gated
        } else if ratio >= warning {
            EnforcementLevel::Degraded
        } else {
            EnforcementLevel::Normal
        }
    }
}

impl fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnforcementLevel::Normal => write!(f, "normal"),
            EnforcementLevel::Degraded => write!(f, "degraded"),
            EnforcementLevel::Gated => write!(f, "gated"),
            EnforcementLevel::Halted => write!(f, "halted"),
        }
    }
}

/// Spend ceiling, current spend and the reconciled enforcement level.
///
/// Fields are private so the only way to obtain a value is through a
/// reconciling constructor. Deserialization goes through [`BudgetRecord`]
/// and re-runs reconciliation rather than trusting the stored level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BudgetRecord")]
pub struct BudgetState {
    task_ceiling: u64,
    current_spend: u64,
    enforcement: EnforcementLevel,
    warning_threshold: f64,
    critical_threshold: f64,
}

/// Unreconciled wire form of a [`BudgetState`].
///
/// Stored snapshots may be stale or tampered with; converting a record into
/// a `BudgetState` validates the parameters and recomputes enforcement.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetRecord {
    pub task_ceiling: u64,
    pub current_spend: u64,
    #[serde(default)]
    pub enforcement: EnforcementLevel,
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
}

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_critical_threshold() -> f64 {
    DEFAULT_CRITICAL_THRESHOLD
}

impl TryFrom<BudgetRecord> for BudgetState {
    type Error = GovernanceError;

    fn try_from(record: BudgetRecord) -> Result<Self, Self::Error> {
        BudgetState::reconciled(
            record.task_ceiling,
            record.current_spend,
            record.enforcement,
            record.warning_threshold,
            record.critical_threshold,
        )
    }
}

impl BudgetState {
    /// Create a budget with the default 80% / 95% thresholds.
    pub fn new(task_ceiling: u64, current_spend: u64) -> Result<Self, GovernanceError> {
        Self::reconciled(
            task_ceiling,
            current_spend,
            EnforcementLevel::Normal,
            DEFAULT_WARNING_THRESHOLD,
            DEFAULT_CRITICAL_THRESHOLD,
        )
    }

    /// The reconciling constructor. Every other constructor funnels here
    /// (directly, or through `rebuild` once parameters are validated).
    ///
    /// `stored` is the caller's claimed level; the result is never weaker
    /// than the level calculated from spend.
    pub fn reconciled(
        task_ceiling: u64,
        current_spend: u64,
        stored: EnforcementLevel,
        warning_threshold: f64,
        critical_threshold: f64,
    ) -> Result<Self, GovernanceError> {
        validate(task_ceiling, warning_threshold, critical_threshold)?;
        let calculated = EnforcementLevel::calculate(
            current_spend,
            task_ceiling,
            warning_threshold,
            critical_threshold,
        );
        Ok(Self {
            task_ceiling,
            current_spend,
            enforcement: cmp::max(stored, calculated),
            warning_threshold,
            critical_threshold,
        })
    }

    /// Same budget with different thresholds, re-validated and reconciled.
    pub fn with_thresholds(&self, warning: f64, critical: f64) -> Result<Self, GovernanceError> {
        Self::reconciled(
            self.task_ceiling,
            self.current_spend,
            self.enforcement,
            warning,
            critical,
        )
    }

    /// New budget with `spend` recorded. Enforcement can only tighten.
    pub fn with_spend(&self, spend: u64) -> Self {
        self.rebuild(self.task_ceiling, spend, self.enforcement)
    }

    /// New budget with a different ceiling. Enforcement can only tighten.
    pub fn with_ceiling(&self, task_ceiling: u64) -> Result<Self, GovernanceError> {
        if task_ceiling == 0 {
            return Err(GovernanceError::InvalidBudget {
                reason: "task ceiling must be greater than zero".to_string(),
            });
        }
        Ok(self.rebuild(task_ceiling, self.current_spend, self.enforcement))
    }

    /// New budget with at least the given enforcement level.
    ///
    /// A weaker level than the current one is ignored, so setting spend and
    /// setting a level commute.
    pub fn with_enforcement(&self, level: EnforcementLevel) -> Self {
        self.rebuild(
            self.task_ceiling,
            self.current_spend,
            cmp::max(self.enforcement, level),
        )
    }

    /// Zero spend and return to `Normal`. Steward reset.
    pub fn reset(&self) -> Self {
        self.rebuild(self.task_ceiling, 0, EnforcementLevel::Normal)
    }

    /// Drop the stored baseline and derive enforcement from spend alone.
    ///
    /// This is the only path that can loosen enforcement. It is reserved for
    /// steward overrides such as raising the ceiling.
    pub fn relaxed(&self) -> Self {
        self.rebuild(
            self.task_ceiling,
            self.current_spend,
            EnforcementLevel::Normal,
        )
    }

    /// Maximum cumulative spend.
    pub fn task_ceiling(&self) -> u64 {
        self.task_ceiling
    }

    /// Tokens spent so far.
    pub fn current_spend(&self) -> u64 {
        self.current_spend
    }

    /// Reconciled enforcement level.
    pub fn enforcement(&self) -> EnforcementLevel {
        self.enforcement
    }

    pub fn warning_threshold(&self) -> f64 {
        self.warning_threshold
    }

    pub fn critical_threshold(&self) -> f64 {
        self.critical_threshold
    }

    /// Level warranted by spend alone, ignoring any stored baseline.
    pub fn calculated_level(&self) -> EnforcementLevel {
        EnforcementLevel::calculate(
            self.current_spend,
            self.task_ceiling,
            self.warning_threshold,
            self.critical_threshold,
        )
    }

    /// Tokens left before the ceiling (zero once over it).
    pub fn remaining(&self) -> u64 {
        self.task_ceiling.saturating_sub(self.current_spend)
    }

    /// Spend as a fraction of the ceiling (may exceed 1.0 when halted).
    pub fn utilization_ratio(&self) -> f64 {
        self.current_spend as f64 / self.task_ceiling as f64
    }

    /// Whether an action costing `cost` fits: `spend + cost <= ceiling`.
    pub fn can_afford(&self, cost: u64) -> bool {
        self.current_spend
            .checked_add(cost)
            .is_some_and(|total| total <= self.task_ceiling)
    }

    /// Check the monotonic reconciliation invariant.
    pub fn verify_reconciled(&self) -> Result<(), GovernanceError> {
        let calculated = self.calculated_level();
        if self.enforcement < calculated {
            return Err(GovernanceError::InvariantViolation {
                actual: self.enforcement,
                calculated,
            });
        }
        Ok(())
    }

    /// Rebuild with already-validated thresholds and a non-zero ceiling.
    fn rebuild(&self, task_ceiling: u64, current_spend: u64, stored: EnforcementLevel) -> Self {
        let calculated = EnforcementLevel::calculate(
            current_spend,
            task_ceiling,
            self.warning_threshold,
            self.critical_threshold,
        );
        Self {
            task_ceiling,
            current_spend,
            enforcement: cmp::max(stored, calculated),
            warning_threshold: self.warning_threshold,
            critical_threshold: self.critical_threshold,
        }
    }
}

fn validate(task_ceiling: u64, warning: f64, critical: f64) -> Result<(), GovernanceError> {
    if task_ceiling == 0 {
        return Err(GovernanceError::InvalidBudget {
            reason: "task ceiling must be greater than zero".to_string(),
        });
    }
    for (name, value) in [("warning", warning), ("critical", critical)] {
        // Written as a negated range check so NaN is rejected too.
        if !(value > 0.0 && value < 1.0) {
            return Err(GovernanceError::InvalidBudget {
                reason: format!(
                    "{} threshold {} must lie strictly between 0 and 1",
                    name, value
                ),
            });
        }
    }
    if warning > critical {
        return Err(GovernanceError::InvalidBudget {
            reason: format!(
                "warning threshold {} exceeds critical threshold {}",
                warning, critical
            ),
        });
    }
    Ok(())
}
