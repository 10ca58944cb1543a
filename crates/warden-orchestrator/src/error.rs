// error.rs — Errors from setting up an orchestrator.
//
// Proposals themselves never fail: denials, reducer refusals and unknown
// approval ids are outcomes, not errors. What can fail is loading the
// configuration, building the initial state and opening the audit log.

use std::path::PathBuf;

use thiserror::Error;
use warden_audit::AuditError;
use warden_core::GovernanceError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid governance state: {0}")]
    InvalidState(#[from] GovernanceError),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),
}
