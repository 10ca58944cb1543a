//! # warden-audit
//!
//! Audit trail for committed governance transitions.
//!
//! Each applied action, approved escalation, steward override and workspace
//! edit produces one [`AuditRecord`], handed to an [`AuditSink`]. The
//! [`AuditLog`] sink writes JSONL with a SHA-256 hash chain so tampering can
//! be detected; [`MemorySink`] keeps records in memory for tests and
//! simulations.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use uuid::Uuid;
//! use warden_audit::{AuditKind, AuditLog, AuditRecord, AuditSink};
//! use warden_core::GovernanceAction;
//!
//! let mut log = AuditLog::open("/tmp/warden-audit.jsonl").unwrap();
//! let action = GovernanceAction::ResetBudget { id: Uuid::new_v4() };
//! let mut record = AuditRecord::for_action(
//!     Uuid::new_v4(),
//!     Utc::now(),
//!     "steward",
//!     AuditKind::StewardIntervention,
//!     &action,
//! );
//! log.append(&mut record).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;
pub mod sink;

pub use error::AuditError;
pub use event::{AuditKind, AuditRecord};
pub use log::AuditLog;
pub use sink::{AuditSink, MemorySink, NullSink};
