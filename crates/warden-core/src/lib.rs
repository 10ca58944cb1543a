//! # warden-core
//!
//! Budget model, governance state and action taxonomy for warden.
//!
//! Everything in this crate is a plain immutable value or a pure function.
//! A [`GovernanceState`] snapshot holds the sandbox boundary, the protected
//! path patterns and a [`BudgetState`]; the [`BudgetReducer`] turns a state
//! and a [`GovernanceAction`] into the next state.
//!
//! ## Key invariants
//!
//! - **Monotonic enforcement**: a budget's enforcement level is never weaker
//!   than the level its spend warrants. Only steward overrides relax it.
//! - **Affordability**: an agent action is charged only when
//!   `spend + cost <= ceiling`.
//! - **No ambient inputs**: time and ids come from the injected [`Clock`]
//!   and [`IdSource`] capabilities.
//!
//! ## Quick Example
//!
//! ```rust
//! use warden_core::{BudgetReducer, BudgetState, EnforcementLevel};
//! use warden_core::{GovernanceAction, GovernanceState};
//! use uuid::Uuid;
//!
//! let state = GovernanceState::new(
//!     Uuid::nil(),
//!     ["/workspace"],
//!     [".ssh"],
//!     BudgetState::new(10_000, 0).unwrap(),
//! );
//! let research = GovernanceAction::Research { id: Uuid::nil(), estimated_tokens: 8_500 };
//! let reduction = BudgetReducer.reduce(&state, &research);
//! assert!(reduction.accepted);
//! assert_eq!(reduction.new_state.budget().enforcement(), EnforcementLevel::Degraded);
//! ```

pub mod action;
pub mod budget;
pub mod clock;
pub mod error;
pub mod reducer;
pub mod state;

pub use action::{AuthorizationRank, GovernanceAction};
pub use budget::{BudgetRecord, BudgetState, EnforcementLevel};
pub use clock::{Clock, IdSource, ManualClock, RandomIds, SequentialIds, SystemClock};
pub use error::GovernanceError;
pub use reducer::{BudgetReducer, Reduction};
pub use state::GovernanceState;
