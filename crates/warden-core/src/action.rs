// action.rs — The closed set of proposable actions.
//
// Agent-originated actions are evaluated by the laws and charged against
// the budget. Steward-originated actions bypass the laws and cost nothing.
// Every variant carries a correlation id linking it to the audit trail.
//
// Adding a variant forces a decision in `authorization_rank`, `token_cost`,
// `target_path`, `is_steward_action` and in every law and the reducer,
// because all of them match exhaustively.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed cost of writing a file, in tokens.
pub const WRITE_FILE_COST: u64 = 100;
/// Fixed cost of deleting a file, in tokens.
pub const DELETE_FILE_COST: u64 = 50;
/// Fixed cost of sending an email, in tokens.
pub const SEND_EMAIL_COST: u64 = 150;
/// Fixed cost of running a shell command, in tokens.
pub const SHELL_COMMAND_COST: u64 = 200;

/// Path fragments that make a write look sensitive regardless of the
/// configured protected patterns.
pub const SENSITIVE_PATH_MARKERS: &[&str] = &[
    ".ssh",
    "credentials",
    ".env",
    ".aws",
    ".gnupg",
    "id_rsa",
    "secret",
];

/// Intrinsic authorization rank of an action, from least to most privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationRank {
    ReadOnly,
    SandboxWrite,
    ExternalNetwork,
    Sensitive,
    SystemMod,
}

impl fmt::Display for AuthorizationRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationRank::ReadOnly => write!(f, "read_only"),
            AuthorizationRank::SandboxWrite => write!(f, "sandbox_write"),
            AuthorizationRank::ExternalNetwork => write!(f, "external_network"),
            AuthorizationRank::Sensitive => write!(f, "sensitive"),
            AuthorizationRank::SystemMod => write!(f, "system_mod"),
        }
    }
}

/// An action proposed to the engine.
///
/// Serializes as `{"kind": "write_file", "id": "...", "path": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GovernanceAction {
    // ── Agent-originated ──
    WriteFile {
        id: Uuid,
        path: String,
        content: String,
    },
    Research {
        id: Uuid,
        estimated_tokens: u64,
    },
    SendEmail {
        id: Uuid,
        to: String,
        subject: String,
        body: String,
    },
    DeleteFile {
        id: Uuid,
        path: String,
    },
    ExecuteShellCommand {
        id: Uuid,
        command: String,
    },

    // ── Steward-originated ──
    IncreaseBudget {
        id: Uuid,
        new_ceiling: u64,
    },
    ResetBudget {
        id: Uuid,
    },
    ApproveAction {
        id: Uuid,
        approval_id: Uuid,
    },
    RejectAction {
        id: Uuid,
        approval_id: Uuid,
        reason: String,
    },
}

impl GovernanceAction {
    /// Correlation id for audit linkage.
    pub fn correlation_id(&self) -> Uuid {
        match self {
            GovernanceAction::WriteFile { id, .. }
            | GovernanceAction::Research { id, .. }
            | GovernanceAction::SendEmail { id, .. }
            | GovernanceAction::DeleteFile { id, .. }
            | GovernanceAction::ExecuteShellCommand { id, .. }
            | GovernanceAction::IncreaseBudget { id, .. }
            | GovernanceAction::ResetBudget { id }
            | GovernanceAction::ApproveAction { id, .. }
            | GovernanceAction::RejectAction { id, .. } => *id,
        }
    }

    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            GovernanceAction::WriteFile { .. } => "write_file",
            GovernanceAction::Research { .. } => "research",
            GovernanceAction::SendEmail { .. } => "send_email",
            GovernanceAction::DeleteFile { .. } => "delete_file",
            GovernanceAction::ExecuteShellCommand { .. } => "execute_shell_command",
            GovernanceAction::IncreaseBudget { .. } => "increase_budget",
            GovernanceAction::ResetBudget { .. } => "reset_budget",
            GovernanceAction::ApproveAction { .. } => "approve_action",
            GovernanceAction::RejectAction { .. } => "reject_action",
        }
    }

    /// Intrinsic rank. Writes to a sensitive-looking path rank as `Sensitive`.
    pub fn authorization_rank(&self) -> AuthorizationRank {
        match self {
            GovernanceAction::Research { .. } => AuthorizationRank::ReadOnly,
            GovernanceAction::WriteFile { path, .. } => {
                if looks_sensitive(path) {
                    AuthorizationRank::Sensitive
                } else {
                    AuthorizationRank::SandboxWrite
                }
            }
            GovernanceAction::SendEmail { .. } => AuthorizationRank::ExternalNetwork,
            GovernanceAction::DeleteFile { .. } => AuthorizationRank::Sensitive,
            GovernanceAction::ExecuteShellCommand { .. }
            | GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => AuthorizationRank::SystemMod,
        }
    }

    /// Declared token cost. Steward actions are free.
    pub fn token_cost(&self) -> u64 {
        match self {
            GovernanceAction::WriteFile { .. } => WRITE_FILE_COST,
            GovernanceAction::Research {
                estimated_tokens, ..
            } => *estimated_tokens,
            GovernanceAction::SendEmail { .. } => SEND_EMAIL_COST,
            GovernanceAction::DeleteFile { .. } => DELETE_FILE_COST,
            GovernanceAction::ExecuteShellCommand { .. } => SHELL_COMMAND_COST,
            GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => 0,
        }
    }

    /// Filesystem path for the path-bearing variants.
    pub fn target_path(&self) -> Option<&str> {
        match self {
            GovernanceAction::WriteFile { path, .. }
            | GovernanceAction::DeleteFile { path, .. } => Some(path),
            GovernanceAction::Research { .. }
            | GovernanceAction::SendEmail { .. }
            | GovernanceAction::ExecuteShellCommand { .. }
            | GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => None,
        }
    }

    /// Steward actions skip law evaluation entirely.
    pub fn is_steward_action(&self) -> bool {
        match self {
            GovernanceAction::IncreaseBudget { .. }
            | GovernanceAction::ResetBudget { .. }
            | GovernanceAction::ApproveAction { .. }
            | GovernanceAction::RejectAction { .. } => true,
            GovernanceAction::WriteFile { .. }
            | GovernanceAction::Research { .. }
            | GovernanceAction::SendEmail { .. }
            | GovernanceAction::DeleteFile { .. }
            | GovernanceAction::ExecuteShellCommand { .. } => false,
        }
    }
}

/// One-line description for audit records and logs. Never includes file
/// contents or email bodies.
impl fmt::Display for GovernanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GovernanceAction::WriteFile { path, content, .. } => {
                write!(f, "write_file {} ({} bytes)", path, content.len())
            }
            GovernanceAction::Research {
                estimated_tokens, ..
            } => write!(f, "research ({} tokens)", estimated_tokens),
            GovernanceAction::SendEmail { to, subject, .. } => {
                write!(f, "send_email to {} ({:?})", to, subject)
            }
            GovernanceAction::DeleteFile { path, .. } => write!(f, "delete_file {}", path),
            GovernanceAction::ExecuteShellCommand { command, .. } => {
                write!(f, "execute_shell_command {:?}", command)
            }
            GovernanceAction::IncreaseBudget { new_ceiling, .. } => {
                write!(f, "increase_budget to {}", new_ceiling)
            }
            GovernanceAction::ResetBudget { .. } => write!(f, "reset_budget"),
            GovernanceAction::ApproveAction { approval_id, .. } => {
                write!(f, "approve_action {}", approval_id)
            }
            GovernanceAction::RejectAction {
                approval_id,
                reason,
                ..
            } => write!(f, "reject_action {} ({})", approval_id, reason),
        }
    }
}

fn looks_sensitive(path: &str) -> bool {
    SENSITIVE_PATH_MARKERS
        .iter()
        .any(|marker| path.contains(marker))
}
