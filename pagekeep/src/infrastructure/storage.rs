// pagekeep/src/infrastructure/storage.rs
use crate::domain::error::{HostError, HostResult};
use crate::domain::services::storage::KeyValueStore;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{instrument, trace};

/// Key/value store persisted as one JSON object in a file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_object(&self) -> HostResult<Map<String, Value>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(HostError::Storage(format!(
                "{}: storage root is not an object",
                self.path.display()
            ))),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    async fn write_object(&self, map: Map<String, Value>) -> HostResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        let text = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| storage_error(&self.path, e))?;

        // replaced via rename, never written in place
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| storage_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> HostError {
    HostError::Storage(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    #[instrument(skip(self), level = "trace")]
    async fn get(&self, key: &str) -> HostResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_object().await?.get(key).cloned())
    }

    #[instrument(skip(self, value), level = "trace")]
    async fn set(&self, key: &str, value: Value) -> HostResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_object().await?;
        map.insert(key.to_string(), value);
        trace!("Writing {} keys to {}", map.len(), self.path.display());
        self.write_object(map).await
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> HostResult<Option<Value>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> HostResult<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn given_missing_file_when_getting_then_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("storage.json"));
        assert_eq!(store.get("savedPages").await.unwrap(), None);
    }

    #[tokio::test]
    async fn given_values_when_set_then_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = JsonFileStore::new(&path);
        store.set("savedPages", json!([{"url": "u"}])).await.unwrap();
        store.set("other", json!(1)).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("savedPages").await.unwrap(),
            Some(json!([{"url": "u"}]))
        );
        assert_eq!(reopened.get("other").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn given_corrupt_file_when_getting_then_surfaces_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("savedPages").await,
            Err(HostError::Storage(_))
        ));
    }
}
