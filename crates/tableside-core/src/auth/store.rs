//! Durable key/value persistence for session credentials.
//!
//! The session manager stores two entries: the bearer token and the
//! serialized profile snapshot. Persistence survives process restarts
//! but not an explicit logout. Three backends are provided:
//!
//! - `FileStore`: one file per key under the platform cache directory
//! - `KeyringStore`: OS keychain via the `keyring` crate
//! - `MemoryStore`: non-durable, for tests and ephemeral sessions

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use keyring::Entry;
use parking_lot::Mutex;

/// Store key for the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Store key for the cached profile snapshot (JSON-serialized).
pub const USER_KEY: &str = "user";

/// Keychain service name for `KeyringStore` entries
const SERVICE_NAME: &str = "tableside";

/// Key/value persistence consumed by the session manager.
///
/// Individual operations carry no cross-key transactionality; the session
/// manager's own write discipline keeps token and profile paired.
pub trait CredentialStore: Send + Sync {
    /// Read a value. Absent keys yield `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one file per key under a dedicated directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create credential directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credential file: {}", key))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.key_path(key), value)
            .with_context(|| format!("Failed to write credential file: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove credential file: {}", key))?;
        }
        Ok(())
    }
}

/// OS keychain store. Each key maps to a keyring entry under a fixed
/// service name.
pub struct KeyringStore;

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read credential from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store credential in keychain")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

/// In-memory store. Contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store currently holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "t1").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));

        // Overwrite
        store.set(TOKEN_KEY, "t2").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t2"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        // Removing an absent key is not an error
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileStore::new(dir.path().to_path_buf()).unwrap();
            store.set(TOKEN_KEY, "persisted-token").unwrap();
        }

        // A fresh instance over the same directory sees the value
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            store.get(TOKEN_KEY).unwrap().as_deref(),
            Some("persisted-token")
        );

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        store.remove(TOKEN_KEY).unwrap();
    }
}
