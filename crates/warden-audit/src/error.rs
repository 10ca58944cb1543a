// error.rs — Error types for audit sinks and the audit log.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to open or create the audit log file.
    #[error("failed to open audit log at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a record to the log.
    #[error("failed to append audit record: {0}")]
    WriteFailed(#[from] std::io::Error),

    /// A record or state could not be encoded, or a log line is malformed.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The hash chain is broken: a record was inserted, removed or edited.
    #[error(
        "integrity check failed at line {line}: expected hash {expected}, got {actual}"
    )]
    IntegrityViolation {
        line: usize,
        expected: String,
        actual: String,
    },
}
