use crate::domain::models::ModelSnapshot;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One committed changeset as recorded in the audit log.
#[derive(Debug, Serialize)]
pub struct CommitRecord {
    pub model: String,
    pub source: String,
    pub target: String,
    pub transactions: usize,
    /// Digest of the model file as it was opened.
    pub digest: String,
}

#[derive(Serialize)]
struct AuditEvent<'r> {
    ts: u64,
    action: &'static str,
    data: &'r CommitRecord,
}

/// `$HOME/.config/batch-editor/audit.jsonl`, when `HOME` is set.
pub fn audit_log_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/batch-editor/audit.jsonl"))
}

/// Append `record` as one JSON line to `log`.
pub fn append_commit(log: &Path, record: &CommitRecord) -> anyhow::Result<()> {
    let event = AuditEvent {
        ts: unix_secs(),
        action: "commit",
        data: record,
    };
    if let Some(parent) = log.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log)?;
    writeln!(file, "{}", serde_json::to_string(&event)?)?;
    Ok(())
}

/// Record a commit in the audit log. A log that cannot be written is
/// reported but never undoes the commit.
pub fn audit_commit(record: &CommitRecord) {
    let Some(log) = audit_log_path() else {
        debug!(model = %record.model, "HOME not set; commit not audited");
        return;
    };
    match append_commit(&log, record) {
        Ok(()) => debug!(log = %log.display(), transactions = record.transactions, "commit audited"),
        Err(err) => warn!(log = %log.display(), error = %err, "cannot append to the audit log"),
    }
}

fn unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn digest_bytes(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}

pub fn digest_file(path: &Path) -> anyhow::Result<String> {
    Ok(digest_bytes(&std::fs::read(path)?))
}

/// Parse a snapshot and return it with the digest of the bytes it came from.
pub fn load_snapshot(path: &Path) -> anyhow::Result<(ModelSnapshot, String)> {
    let raw = std::fs::read(path)?;
    let snapshot: ModelSnapshot = serde_json::from_slice(&raw)?;
    Ok((snapshot, digest_bytes(&raw)))
}

pub fn save_snapshot(path: &Path, snapshot: &ModelSnapshot) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}
