//! Sled-based settings store.
//!
//! Holds the two user settings the pipeline reads before triggering a
//! summarization: `apiKey` (required) and `prompt` (optional).

use crate::error::SummaError;
use std::path::Path;
use tracing::debug;

pub const API_KEY: &str = "apiKey";
pub const PROMPT: &str = "prompt";

/// Key-value settings backed by sled.
pub struct SettingsStore {
    db: sled::Db,
}

impl SettingsStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SummaError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Read a string setting. Blank values read as absent.
    pub fn get(&self, key: &str) -> Result<Option<String>, SummaError> {
        match self.db.get(key.as_bytes())? {
            Some(data) => {
                let value = String::from_utf8_lossy(&data).into_owned();
                Ok((!value.trim().is_empty()).then_some(value))
            }
            None => Ok(None),
        }
    }

    /// Write a string setting, trimmed
    pub fn set(&self, key: &str, value: &str) -> Result<(), SummaError> {
        debug!(key, "storing setting");
        self.db.insert(key.as_bytes(), value.trim().as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    /// Remove a setting, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool, SummaError> {
        let existed = self.db.remove(key.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    pub fn api_key(&self) -> Result<Option<String>, SummaError> {
        self.get(API_KEY)
    }

    pub fn prompt(&self) -> Result<Option<String>, SummaError> {
        self.get(PROMPT)
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), SummaError> {
        if key.trim().is_empty() {
            return Err(SummaError::MissingCredential);
        }
        self.set(API_KEY, key)
    }

    pub fn set_prompt(&self, prompt: &str) -> Result<(), SummaError> {
        if prompt.trim().is_empty() {
            return Err(SummaError::MissingPrompt);
        }
        self.set(PROMPT, prompt)
    }

    /// Drop both settings
    pub fn clear(&self) -> Result<(), SummaError> {
        self.remove(API_KEY)?;
        self.remove(PROMPT)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings")).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_settings_read_as_none() {
        let (_dir, store) = store();
        assert_eq!(store.api_key().unwrap(), None);
        assert_eq!(store.prompt().unwrap(), None);
    }

    #[test]
    fn values_are_trimmed_and_persisted() {
        let (_dir, store) = store();
        store.set_api_key("  abc123 \n").unwrap();
        store.set_prompt("Be brief.").unwrap();
        assert_eq!(store.api_key().unwrap().as_deref(), Some("abc123"));
        assert_eq!(store.prompt().unwrap().as_deref(), Some("Be brief."));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let (_dir, store) = store();
        let err = store.set_api_key("   ").unwrap_err();
        assert_eq!(err, SummaError::MissingCredential);
        assert_eq!(store.api_key().unwrap(), None);
    }

    #[test]
    fn clear_removes_everything() {
        let (_dir, store) = store();
        store.set_api_key("abc").unwrap();
        store.set_prompt("p").unwrap();
        store.clear().unwrap();
        assert_eq!(store.api_key().unwrap(), None);
        assert_eq!(store.prompt().unwrap(), None);
        assert!(!store.remove(API_KEY).unwrap());
    }
}
