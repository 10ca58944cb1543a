// sink.rs — The audit sink capability.
//
// The engine hands every committed transition to an AuditSink. Sinks are
// observers: the orchestrator logs a failing append and keeps the state it
// has already committed.

use std::sync::{Arc, Mutex};

use crate::error::AuditError;
use crate::event::AuditRecord;
use crate::hasher;

/// Append-only destination for audit records.
pub trait AuditSink: Send {
    /// Record `record`. The sink sets `previous_hash` to chain it to the
    /// record before it.
    fn append(&mut self, record: &mut AuditRecord) -> Result<(), AuditError>;
}

/// In-memory sink. Clones share the same buffer, so a test can keep one
/// handle and give the other to an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    records: Vec<AuditRecord>,
    last_hash: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&mut self, record: &mut AuditRecord) -> Result<(), AuditError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        record.previous_hash = inner.last_hash.clone();
        let json = serde_json::to_string(record)?;
        inner.last_hash = Some(hasher::hash_str(&json));
        inner.records.push(record.clone());
        Ok(())
    }
}

/// Sink that accepts and drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AuditSink for NullSink {
    fn append(&mut self, _record: &mut AuditRecord) -> Result<(), AuditError> {
        Ok(())
    }
}
