//! Durable storage for the persisted session credential.
//!
//! Every backend holds a single value under the fixed `authToken` key.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

/// Key the session credential is persisted under
pub const AUTH_TOKEN_KEY: &str = "authToken";

const SERVICE_NAME: &str = "taskdesk";

pub trait CredentialStore: Send + Sync {
    /// Read the persisted value, `None` if nothing is stored
    fn load(&self) -> Result<Option<String>>;

    /// Replace the persisted value
    fn store(&self, value: &str) -> Result<()>;

    /// Remove the persisted value; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

/// Stores the credential as a file in the application data directory.
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", AUTH_TOKEN_KEY))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credential file: {}", path.display()))?;
        Ok(Some(contents))
    }

    fn store(&self, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        let path = self.path();
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write credential file: {}", path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove credential file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Stores the credential in the OS keychain.
pub struct KeyringCredentialStore {
    entry: Entry,
}

impl KeyringCredentialStore {
    pub fn new() -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, AUTH_TOKEN_KEY)
            .context("Failed to create keyring entry")?;
        Ok(Self { entry })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve credential from keychain"),
        }
    }

    fn store(&self, value: &str) -> Result<()> {
        self.entry
            .set_password(value)
            .context("Failed to store credential in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

/// In-process storage, for tests and embedding.
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn store(&self, value: &str) -> Result<()> {
        *self.slot() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);
        store.store(r#"{"token":"t"}"#).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(r#"{"token":"t"}"#));
        assert!(store.path().ends_with("authToken.json"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_value("abc");
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
