// pagekeep/src/infrastructure/downloads.rs
use crate::domain::error::{HostError, HostResult};
use crate::domain::services::downloads::{DownloadHost, DownloadId, DownloadRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

const INVALID_FILENAME: &str = "Invalid filename";
const INVALID_ID: &str = "Invalid downloadId";
const FILE_DELETED: &str = "Download file already deleted";

/// One record of the download history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadItem {
    pub id: DownloadId,
    pub filename: PathBuf,
    pub start_time: DateTime<Utc>,
    pub exists: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadHistory {
    last_id: u64,
    items: Vec<DownloadItem>,
}

impl DownloadHistory {
    fn find(&self, id: DownloadId) -> HostResult<&DownloadItem> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| HostError::Download(INVALID_ID.to_string()))
    }
}

/// Writes downloads below a root directory and keeps a JSON history that
/// maps download ids to files.
#[derive(Debug)]
pub struct FsDownloadHost {
    root: PathBuf,
    history_path: PathBuf,
    lock: Mutex<()>,
}

impl FsDownloadHost {
    pub fn new(root: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            history_path: history_path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// History record for `id`, if the host still knows it.
    pub async fn item(&self, id: DownloadId) -> HostResult<Option<DownloadItem>> {
        let _guard = self.lock.lock().await;
        let history = self.load_history().await?;
        Ok(history.find(id).ok().cloned())
    }

    async fn load_history(&self) -> HostResult<DownloadHistory> {
        match tokio::fs::read_to_string(&self.history_path).await {
            Ok(text) if text.trim().is_empty() => Ok(DownloadHistory::default()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| HostError::Download(format!("Corrupt download history: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DownloadHistory::default()),
            Err(e) => Err(HostError::Download(e.to_string())),
        }
    }

    async fn save_history(&self, history: &DownloadHistory) -> HostResult<()> {
        if let Some(parent) = self.history_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HostError::Download(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(history)
            .map_err(|e| HostError::Download(e.to_string()))?;
        tokio::fs::write(&self.history_path, text)
            .await
            .map_err(|e| HostError::Download(e.to_string()))
    }
}

/// Split a relative download path into safe components.
pub fn validate_filename(filename: &str) -> HostResult<Vec<&str>> {
    let invalid = || HostError::Download(INVALID_FILENAME.to_string());
    if filename.is_empty() || filename.starts_with('/') || filename.contains('\\') {
        return Err(invalid());
    }
    let parts: Vec<&str> = filename.split('/').collect();
    let valid = parts.iter().all(|part| {
        !part.is_empty()
            && *part != "."
            && *part != ".."
            && !part.chars().any(|c| c.is_control() || c == ':')
    });
    if valid {
        Ok(parts)
    } else {
        Err(invalid())
    }
}

/// First free path for `target`, adding ` (1)`, ` (2)`, … before the
/// extension when the name is taken.
async fn uniquify(target: PathBuf) -> PathBuf {
    if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return target;
    }
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = target.with_file_name(format!("{} ({}){}", stem, n, extension));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}

#[async_trait]
impl DownloadHost for FsDownloadHost {
    #[instrument(skip(self, request), level = "debug", fields(filename = %request.filename))]
    async fn download(&self, request: DownloadRequest) -> HostResult<DownloadId> {
        let parts = validate_filename(&request.filename)?;
        let target = parts
            .iter()
            .fold(self.root.clone(), |path, part| path.join(part));

        let _guard = self.lock.lock().await;
        let mut history = self.load_history().await?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HostError::Download(e.to_string()))?;
        }
        let target = uniquify(target).await;
        tokio::fs::write(&target, request.contents.as_bytes())
            .await
            .map_err(|e| HostError::Download(e.to_string()))?;

        history.last_id += 1;
        let id = DownloadId(history.last_id);
        history.items.push(DownloadItem {
            id,
            filename: target.clone(),
            start_time: Utc::now(),
            exists: true,
        });
        self.save_history(&history).await?;

        debug!("Download {} written to {}", id, target.display());
        Ok(id)
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_file(&self, id: DownloadId) -> HostResult<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.load_history().await?;
        let item = history.find(id)?.clone();

        if !item.exists {
            return Err(HostError::Download(FILE_DELETED.to_string()));
        }
        match tokio::fs::remove_file(&item.filename).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(HostError::Download(e.to_string())),
        }

        if let Some(entry) = history.items.iter_mut().find(|i| i.id == id) {
            entry.exists = false;
        }
        self.save_history(&history).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn erase(&self, id: DownloadId) -> HostResult<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.load_history().await?;
        let before = history.items.len();
        history.items.retain(|item| item.id != id);
        if history.items.len() != before {
            self.save_history(&history).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn show(&self, id: DownloadId) -> HostResult<()> {
        let item = {
            let _guard = self.lock.lock().await;
            self.load_history().await?.find(id)?.clone()
        };
        if !item.exists || !tokio::fs::try_exists(&item.filename).await.unwrap_or(false) {
            return Err(HostError::Download(FILE_DELETED.to_string()));
        }
        open::that(&item.filename).map_err(|e| HostError::Download(e.to_string()))
    }
}
