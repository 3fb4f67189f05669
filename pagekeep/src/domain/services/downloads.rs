// pagekeep/src/domain/services/downloads.rs
use crate::domain::error::HostResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference issued by the download host for a submitted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Path relative to the download directory, `/` separated
    pub filename: String,
    pub contents: String,
}

#[async_trait]
pub trait DownloadHost: Send + Sync + fmt::Debug {
    async fn download(&self, request: DownloadRequest) -> HostResult<DownloadId>;

    /// Delete the downloaded file from disk.
    async fn remove_file(&self, id: DownloadId) -> HostResult<()>;

    /// Forget the download in the host's history.
    async fn erase(&self, id: DownloadId) -> HostResult<()>;

    /// Reveal the downloaded file to the user.
    async fn show(&self, id: DownloadId) -> HostResult<()>;
}
