//! Durable home for access tokens obtained by reauthentication.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::constants::ACCESS_TOKEN_KEY;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store lock poisoned")]
    Poisoned,
}

/// Receives every newly obtained access token. Writes are append-only.
pub trait TokenStore: Send + Sync {
    fn persist(&self, access_token: &str) -> Result<(), TokenStoreError>;
}

/// Appends `PI_ACCESS_TOKEN=<token>` lines to an env file.
///
/// Older entries stay in place; [`crate::config::latest_env_value`] reads the last one back.
#[derive(Debug, Clone)]
pub struct EnvFileTokenStore {
    path: PathBuf,
}

impl EnvFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for EnvFileTokenStore {
    fn persist(&self, access_token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(file, "\n{ACCESS_TOKEN_KEY}={access_token}")?;
        tracing::info!(path = %self.path.display(), "Saved access token to env file");
        Ok(())
    }
}

/// Keeps tokens in memory. Useful where no env file should be touched.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Vec<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tokens persisted so far, oldest first.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens
            .lock()
            .map(|tokens| tokens.clone())
            .unwrap_or_default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn persist(&self, access_token: &str) -> Result<(), TokenStoreError> {
        self.tokens
            .lock()
            .map_err(|_| TokenStoreError::Poisoned)?
            .push(access_token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::latest_env_value;

    #[test]
    fn test_env_file_store_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PI_CLIENT_ID=abc\nPI_ACCESS_TOKEN=first").unwrap();

        let store = EnvFileTokenStore::new(&path);
        store.persist("second").unwrap();
        store.persist("third").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("PI_CLIENT_ID=abc\nPI_ACCESS_TOKEN=first"));
        assert!(content.contains("PI_ACCESS_TOKEN=second"));
        assert_eq!(
            latest_env_value(&path, ACCESS_TOKEN_KEY).as_deref(),
            Some("third")
        );
    }

    #[test]
    fn test_env_file_store_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(".env");

        EnvFileTokenStore::new(&path).persist("tok").unwrap();
        assert_eq!(
            latest_env_value(&path, ACCESS_TOKEN_KEY).as_deref(),
            Some("tok")
        );
    }

    #[test]
    fn test_memory_store_keeps_order() {
        let store = MemoryTokenStore::new();
        store.persist("a").unwrap();
        store.persist("b").unwrap();
        assert_eq!(store.tokens(), vec!["a".to_string(), "b".to_string()]);
    }
}
