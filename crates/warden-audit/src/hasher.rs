// hasher.rs — SHA-256 hashing of log lines and governance states.
//
// Hashes are lowercase hex. A state hash is taken over the compact JSON
// encoding; path sets are ordered, so equal states always hash equally.

use sha2::{Digest, Sha256};
use warden_core::GovernanceState;

use crate::error::AuditError;

/// Hash arbitrary bytes to a 64-character lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// Hash of a governance state snapshot.
pub fn hash_state(state: &GovernanceState) -> Result<String, AuditError> {
    let encoded = serde_json::to_vec(state)?;
    Ok(hash_bytes(&encoded))
}
