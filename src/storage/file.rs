//! File-backed key-value store: one `<key>.json` file per key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{validate_key, KeyValueStore, StorageError};

/// Stores each value as `<dir>/<key>.json`, creating `dir` on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write beside the target then rename; readers never see a partial value.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove_items(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            let path = self.path_for(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_key_is_none() {
        let dir = tempdir().expect("temp dir");
        let store = FileStore::new(dir.path());
        assert!(store.get_item("echo_kids_settings").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let dir = tempdir().expect("temp dir");
        let store = FileStore::new(dir.path().join("nested"));
        store.set_item("echo_kids_settings", "{\"volume\":0.5}").await.unwrap();

        let value = store.get_item("echo_kids_settings").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"volume\":0.5}"));
        assert_eq!(store.dir(), dir.path().join("nested"));
        assert!(store.dir().join("echo_kids_settings.json").exists());
        assert!(!store.dir().join("echo_kids_settings.json.tmp").exists());
    }

    #[tokio::test]
    async fn remove_items_ignores_missing_files() {
        let dir = tempdir().expect("temp dir");
        let store = FileStore::new(dir.path());
        store.set_item("a", "1").await.unwrap();
        store.remove_items(&["a", "b"]).await.unwrap();
        assert!(store.get_item("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let store = FileStore::new(dir.path());
        let err = store.set_item("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
