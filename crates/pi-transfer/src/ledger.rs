//! Append-only record of transfer attempts.
//!
//! Every completion attempt that reaches the provider produces one [`LogEntry`].
//! The file-backed ledger keeps a pretty-printed JSON array and starts a new
//! array if the existing file cannot be parsed, so a damaged ledger never
//! blocks a transfer.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ledger lock poisoned")]
    Poisoned,
}

/// One ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub data: serde_json::Value,
    pub destination_wallet: Option<String>,
}

/// Receives the outcome of every send attempt.
pub trait TransactionLog: Send + Sync {
    fn record(&self, entry: &LogEntry) -> Result<(), LedgerError>;
}

/// JSON array on disk, rewritten in full on each append.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing entries, or an empty list if the file is missing, empty or corrupt.
    fn load(&self) -> Vec<serde_json::Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable ledger, starting a new one");
                return Vec::new();
            }
        };
        if content.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(single) => vec![single],
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt ledger, starting a new one");
                Vec::new()
            }
        }
    }
}

impl TransactionLog for JsonFileLedger {
    fn record(&self, entry: &LogEntry) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().map_err(|_| LedgerError::Poisoned)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries = self.load();
        entries.push(serde_json::to_value(entry)?);
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;

        tracing::info!(path = %self.path.display(), success = entry.success, "Transaction logged");
        Ok(())
    }
}

/// In-memory ledger. Clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl TransactionLog for MemoryLedger {
    fn record(&self, entry: &LogEntry) -> Result<(), LedgerError> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Poisoned)?
            .push(entry.clone());
        Ok(())
    }
}
