// log.rs — Append-only JSONL audit log.
//
// One JSON record per line. Each record's `previous_hash` is the SHA-256
// of the previous raw line, so inserting, deleting or editing a line
// breaks the chain and `verify_chain` reports where.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AuditError;
use crate::event::AuditRecord;
use crate::hasher;
use crate::sink::AuditSink;

/// An append-only audit log backed by a JSONL file.
pub struct AuditLog {
    writer: BufWriter<File>,
    path: PathBuf,
    /// Hash of the last line written; becomes the next `previous_hash`.
    last_hash: Option<String>,
}

impl AuditLog {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// An existing log is continued: the hash of its last line seeds the
    /// chain for new records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| AuditError::OpenFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let last_hash = if path.exists() {
            Self::read_last_hash(&path)?
        } else {
            None
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            last_hash,
        })
    }

    /// Read every record, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>, AuditError> {
        let mut records = Vec::new();
        for line in Self::lines(path.as_ref())? {
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Check every link of the hash chain. Returns the number of records
    /// verified, or `IntegrityViolation` naming the first broken line.
    pub fn verify_chain(path: impl AsRef<Path>) -> Result<usize, AuditError> {
        let file = Self::open_read(path.as_ref())?;
        let mut previous_hash: Option<String> = None;
        let mut verified = 0;

        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord = serde_json::from_str(&line)?;
            if record.previous_hash != previous_hash {
                return Err(AuditError::IntegrityViolation {
                    line: line_num + 1,
                    expected: previous_hash.unwrap_or_else(|| "None".to_string()),
                    actual: record.previous_hash.unwrap_or_else(|| "None".to_string()),
                });
            }
            // Hash the raw line; re-serializing could reorder fields.
            previous_hash = Some(hasher::hash_str(&line));
            verified += 1;
        }

        Ok(verified)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_last_hash(path: &Path) -> Result<Option<String>, AuditError> {
        let last_line = Self::lines(path)?.pop();
        Ok(last_line.map(|line| hasher::hash_str(&line)))
    }

    fn lines(path: &Path) -> Result<Vec<String>, AuditError> {
        let file = Self::open_read(path)?;
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    fn open_read(path: &Path) -> Result<File, AuditError> {
        File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl AuditSink for AuditLog {
    fn append(&mut self, record: &mut AuditRecord) -> Result<(), AuditError> {
        record.previous_hash = self.last_hash.clone();
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        // Only advance the chain once the line is on disk.
        self.last_hash = Some(hasher::hash_str(&json));
        tracing::debug!(
            path = %self.path.display(),
            record_id = %record.record_id,
            "audit record appended"
        );
        Ok(())
    }
}
