//! Key-value persistence and the typed stores built on it.
//!
//! ```text
//! SettingsStore ─┐
//!                ├─▶ Arc<dyn KeyValueStore> ─▶ FileStore   (one JSON file per key)
//! VocabularyStore┘                          └▶ MemoryStore (in-process map)
//! ```
//!
//! The typed stores never return errors: loads fall back to built-in
//! defaults and saves log failures.

pub mod file;
pub mod memory;
pub mod settings;
pub mod vocabulary;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use settings::SettingsStore;
pub use vocabulary::VocabularyStore;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

pub const KEY_VOCABULARY: &str = "echo_kids_vocabulary";
pub const KEY_SETTINGS: &str = "echo_kids_settings";
pub const KEY_CATEGORIES: &str = "echo_kids_categories";
pub const KEY_FAVORITES: &str = "echo_kids_favorites";

/// Every key written by the application, in the order they are cleared.
pub const ALL_KEYS: [&str; 4] = [KEY_VOCABULARY, KEY_SETTINGS, KEY_CATEGORIES, KEY_FAVORITES];

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("stored value could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// KeyValueStore trait
// ---------------------------------------------------------------------------

/// Device key-value storage holding string values.
///
/// Object safe so the typed stores can share an `Arc<dyn KeyValueStore>`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove every key in `keys`; missing keys are not an error.
    async fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Keys are used as file names, so they are limited to `[A-Za-z0-9_-]`.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Remove every application key from `store`.  Failures are logged.
pub async fn clear_all_data(store: &dyn KeyValueStore) {
    match store.remove_items(&ALL_KEYS).await {
        Ok(()) => log::info!("storage: cleared all application data"),
        Err(e) => log::error!("storage: error clearing data: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_keys_are_valid() {
        for key in ALL_KEYS {
            validate_key(key).unwrap();
        }
    }

    #[test]
    fn path_like_keys_are_rejected() {
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("").is_err());
    }

    #[tokio::test]
    async fn clear_all_data_removes_every_key() {
        let store = MemoryStore::new();
        for key in ALL_KEYS {
            store.set_item(key, "[]").await.unwrap();
        }
        store.set_item("unrelated", "1").await.unwrap();

        clear_all_data(&store).await;

        for key in ALL_KEYS {
            assert!(store.get_item(key).await.unwrap().is_none());
        }
        assert_eq!(store.get_item("unrelated").await.unwrap().as_deref(), Some("1"));
    }
}
