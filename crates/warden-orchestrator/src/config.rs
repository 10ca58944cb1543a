// config.rs — warden.toml configuration.
//
// Every field has a serde default, so an empty file (or no file at all)
// gives a working single-workspace setup:
//
//   jurisdiction_id = "workspace"
//   writable_paths = ["/workspace"]
//   protected_patterns = [".ssh", "credentials"]
//
//   [budget]
//   task_ceiling = 10000
//
//   [audit]
//   log_path = ".warden/audit.jsonl"

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warden_core::budget::{DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD};
use warden_core::{BudgetState, EnforcementLevel, GovernanceState, IdSource};

use crate::error::OrchestratorError;

/// Default file name, looked up in the working directory by the CLI.
pub const CONFIG_FILE_NAME: &str = "warden.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Name recorded in every composition trace.
    #[serde(default = "default_jurisdiction_id")]
    pub jurisdiction_id: String,

    /// Agent id used when a caller does not name one.
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    /// Id recorded for steward interventions.
    #[serde(default = "default_steward_id")]
    pub steward_id: String,

    #[serde(default = "default_writable_paths")]
    pub writable_paths: Vec<String>,

    #[serde(default = "default_protected_patterns")]
    pub protected_patterns: Vec<String>,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            jurisdiction_id: default_jurisdiction_id(),
            agent_id: default_agent_id(),
            steward_id: default_steward_id(),
            writable_paths: default_writable_paths(),
            protected_patterns: default_protected_patterns(),
            budget: BudgetConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_task_ceiling")]
    pub task_ceiling: u64,

    /// Spend already consumed when the engine starts.
    #[serde(default)]
    pub initial_spend: u64,

    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,

    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            task_ceiling: default_task_ceiling(),
            initial_spend: 0,
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSONL audit log. No log is written when unset.
    pub log_path: Option<PathBuf>,
}

fn default_jurisdiction_id() -> String {
    "workspace".to_string()
}

fn default_agent_id() -> String {
    "agent".to_string()
}

fn default_steward_id() -> String {
    "steward".to_string()
}

fn default_writable_paths() -> Vec<String> {
    vec!["/workspace".to_string()]
}

fn default_protected_patterns() -> Vec<String> {
    vec![".ssh".to_string(), "credentials".to_string()]
}

fn default_task_ceiling() -> u64 {
    10_000
}

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_critical_threshold() -> f64 {
    DEFAULT_CRITICAL_THRESHOLD
}

impl GovernanceConfig {
    pub fn load(path: &Path) -> Result<Self, OrchestratorError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| OrchestratorError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| OrchestratorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if it exists; defaults otherwise. A file that exists but
    /// does not parse is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
            Self::default()
        })
    }

    /// Reconciled initial state. Fails on a zero ceiling or bad thresholds.
    pub fn initial_state(&self, ids: &dyn IdSource) -> Result<GovernanceState, OrchestratorError> {
        let budget = BudgetState::reconciled(
            self.budget.task_ceiling,
            self.budget.initial_spend,
            EnforcementLevel::Normal,
            self.budget.warning_threshold,
            self.budget.critical_threshold,
        )?;
        Ok(GovernanceState::new(
            ids.next_id(),
            self.writable_paths.iter().cloned(),
            self.protected_patterns.iter().cloned(),
            budget,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;
    use warden_core::SequentialIds;

    #[test]
    fn empty_file_gives_defaults() {
        let config: GovernanceConfig = toml::from_str("").unwrap();
        assert_eq!(config, GovernanceConfig::default());
        assert_eq!(config.budget.task_ceiling, 10_000);
        assert!(config.audit.log_path.is_none());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config: GovernanceConfig = toml::from_str(
            r#"
jurisdiction_id = "lab"
writable_paths = ["/srv/lab", "/tmp/lab"]

[budget]
task_ceiling = 500
initial_spend = 450

[audit]
log_path = "/var/log/warden.jsonl"
"#,
        )
        .unwrap();
        assert_eq!(config.jurisdiction_id, "lab");
        assert_eq!(config.writable_paths.len(), 2);
        assert_eq!(config.protected_patterns, default_protected_patterns());
        assert_eq!(config.budget.task_ceiling, 500);
        assert!((config.budget.warning_threshold - 0.80).abs() < f64::EPSILON);
        assert_eq!(
            config.audit.log_path.as_deref(),
            Some(Path::new("/var/log/warden.jsonl"))
        );
    }

    #[test]
    fn initial_state_is_reconciled() {
        let mut config = GovernanceConfig::default();
        config.budget.task_ceiling = 500;
        config.budget.initial_spend = 450;
        let state = config.initial_state(&SequentialIds::default()).unwrap();
        assert_eq!(state.state_id(), Uuid::from_u128(1));
        assert_eq!(state.budget().enforcement(), EnforcementLevel::Degraded);
        assert!(state.is_path_allowed("/workspace/a"));
    }

    #[test]
    fn invalid_budget_is_rejected() {
        let mut config = GovernanceConfig::default();
        config.budget.task_ceiling = 0;
        match config.initial_state(&SequentialIds::default()) {
            Err(OrchestratorError::InvalidState(_)) => {}
            other => panic!("expected InvalidState, got {:?}", other),
        }

        let mut config = GovernanceConfig::default();
        config.budget.warning_threshold = 0.99;
        assert!(config.initial_state(&SequentialIds::default()).is_err());
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "task_ceiling = [").unwrap();
        match GovernanceConfig::load(&path) {
            Err(OrchestratorError::ConfigParse { .. }) => {}
            other => panic!("expected ConfigParse, got {:?}", other),
        }
        assert_eq!(
            GovernanceConfig::load_or_default(&path),
            GovernanceConfig::default()
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            GovernanceConfig::load(&path),
            Err(OrchestratorError::ConfigRead { .. })
        ));
        assert_eq!(
            GovernanceConfig::load_or_default(&path),
            GovernanceConfig::default()
        );
    }
}
