//! # warden-policy
//!
//! Governance laws and their deny-wins composition.
//!
//! Six independent, stateless [`Law`]s each look at a proposed action and
//! return a [`LawVerdict`]. A [`GovernancePolicy`] evaluates all of them,
//! in a fixed order, and composes the verdicts into a single
//! [`CompositionTrace`].
//!
//! ## Key invariants
//!
//! - **Deny wins**: any `Deny` verdict makes the composed decision `Deny`.
//! - **Escalate without deny**: otherwise any `Escalate` escalates.
//! - **No short-circuit**: the trace always holds one verdict per law.
//! - **Abstain is not Allow**: laws abstain outside their jurisdiction; an
//!   all-abstain evaluation composes to `Allow`.

pub mod composer;
pub mod law;
pub mod laws;

pub use composer::{CompositionRule, CompositionTrace, GovernancePolicy};
pub use law::{Law, LawDecision, LawVerdict};
pub use laws::{GovernanceLaw, STANDARD_LAWS};
