// audit.rs — Audit subcommands: verify, tail.
//
// Both read the JSONL log written by `AuditLog`. A missing log is reported
// and is not an error; a broken hash chain is.

use std::path::PathBuf;

use clap::Subcommand;
use warden_audit::{AuditError, AuditLog};
use warden_orchestrator::GovernanceConfig;

/// Used when neither `--log` nor `[audit] log_path` is given.
pub const DEFAULT_AUDIT_LOG: &str = ".warden/audit.jsonl";

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit log hash chain integrity.
    Verify {
        /// Path to audit log (defaults to the configured log, then .warden/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent audit records.
    Tail {
        /// Path to audit log (defaults to the configured log, then .warden/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of records to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &GovernanceConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = resolve_log_path(log.as_ref(), config);
            if !path.exists() {
                println!("{}: no audit log", path.display());
                return Ok(());
            }

            match AuditLog::verify_chain(&path) {
                Ok(count) => println!("{}: {} record(s), chain ok", path.display(), count),
                Err(AuditError::IntegrityViolation {
                    line,
                    expected,
                    actual,
                }) => {
                    println!("{}: chain broken at line {}", path.display(), line);
                    println!("  record links to  {}", actual);
                    println!("  prior record is  {}", expected);
                    anyhow::bail!("audit log {} failed verification", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        AuditCommands::Tail { log, n } => {
            let path = resolve_log_path(log.as_ref(), config);
            if !path.exists() {
                println!("{}: no audit log", path.display());
                return Ok(());
            }

            let records = AuditLog::read_all(&path)?;
            let start = records.len().saturating_sub(*n);
            let recent = &records[start..];

            if recent.is_empty() {
                println!("No audit records.");
                return Ok(());
            }

            println!(
                "{:<20} {:<12} {:<22} {:<22} {:>13} {:<9}",
                "TIMESTAMP", "AGENT", "KIND", "ACTION", "SPEND", "LEVEL"
            );
            println!("{}", "-".repeat(104));

            for record in recent {
                println!(
                    "{:<20} {:<12} {:<22} {:<22} {:>13} {:<9}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.agent_id,
                    format!("{:?}", record.kind),
                    record.action_kind,
                    format!("{}->{}", record.prior_spend, record.new_spend),
                    record.enforcement.to_string(),
                );
            }
        }
    }

    Ok(())
}

fn resolve_log_path(explicit: Option<&PathBuf>, config: &GovernanceConfig) -> PathBuf {
    explicit
        .cloned()
        .or_else(|| config.audit.log_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIT_LOG))
}
