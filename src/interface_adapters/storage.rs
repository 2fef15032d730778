use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::ports::TokenStorage;

// In-memory storage adapter; state is lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    pub values: Arc<Mutex<HashMap<String, String>>>,
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let values = self.values.lock().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), String> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, String> {
        let mut values = self.values.lock().await;
        Ok(values.remove(key).is_some())
    }
}

// Durable storage adapter: one file per key under a directory.
#[derive(Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, String> {
        // Keys become file names, so keep them to a safe charset.
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        {
            return Err(format!("invalid storage key: {key:?}"));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("read {}: {err}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), String> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|err| format!("create {}: {err}", self.dir.display()))?;

        // Write then rename so a crash never leaves a half-written token.
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|err| format!("write {}: {err}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|err| format!("rename {}: {err}", path.display()))
    }

    async fn remove(&self, key: &str) -> Result<bool, String> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(format!("remove {}: {err}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        FileStorage::new(dir.path())
            .set("access_token", "a1".to_string())
            .await
            .expect("set");

        let reopened = FileStorage::new(dir.path());

        assert_eq!(reopened.get("access_token").await.expect("get"), Some("a1".to_string()));
    }

    #[tokio::test]
    async fn file_storage_remove_reports_whether_key_existed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());
        storage.set("session", "{}".to_string()).await.expect("set");

        assert!(storage.remove("session").await.expect("remove"));
        assert!(!storage.remove("session").await.expect("remove again"));
        assert_eq!(storage.get("session").await.expect("get"), None);
    }

    #[tokio::test]
    async fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path());

        assert!(storage.set("../escape", "x".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn memory_storage_round_trips_values() {
        let storage = MemoryStorage::default();
        storage.set("refresh_token", "r1".to_string()).await.expect("set");

        assert_eq!(storage.get("refresh_token").await.expect("get"), Some("r1".to_string()));
        assert!(storage.remove("refresh_token").await.expect("remove"));
    }
}
