//! # warden-approval
//!
//! Holds escalated actions until a steward resolves them.
//!
//! Every entry gets its id and timestamp from the injected
//! [`warden_core::IdSource`] and [`warden_core::Clock`], so a replay with
//! the same capabilities produces the same queue. Resolving an unknown id
//! is a no-op, not an error.

pub mod queue;

pub use queue::{ApprovalQueue, PendingAction, QueueStatistics, Resolution};
