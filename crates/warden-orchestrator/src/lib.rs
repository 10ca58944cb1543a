//! # warden-orchestrator
//!
//! The governance control loop.
//!
//! An [`Orchestrator`] owns the current [`warden_core::GovernanceState`], the
//! standard [`warden_policy::GovernancePolicy`], an approval queue and an
//! audit sink. [`Orchestrator::propose`] routes an action through them:
//! denied, escalated to a steward, or charged against the budget.
//! [`GovernanceHandle`] shares one orchestrator between threads.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use warden_core::{GovernanceAction, ManualClock, SequentialIds};
//! use warden_orchestrator::{GovernanceConfig, Orchestrator, ProposalOutcome};
//!
//! let mut orchestrator = Orchestrator::from_config(
//!     &GovernanceConfig::default(),
//!     Arc::new(ManualClock::default()),
//!     Arc::new(SequentialIds::default()),
//! )
//! .unwrap();
//!
//! let write = GovernanceAction::WriteFile {
//!     id: Uuid::from_u128(7),
//!     path: "/etc/passwd".to_string(),
//!     content: String::new(),
//! };
//! let result = orchestrator.propose(write, "agent");
//! assert_eq!(result.outcome, ProposalOutcome::Denied);
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod orchestrator;
pub mod status;

pub use config::{AuditConfig, BudgetConfig, GovernanceConfig, CONFIG_FILE_NAME};
pub use error::OrchestratorError;
pub use handle::GovernanceHandle;
pub use orchestrator::{ApprovalResult, Orchestrator, ProposalOutcome, ProposalResult, RefusalKind};
pub use status::{BudgetStatus, OrchestratorStatistics};
