// pagekeep/src/domain/services/tabs.rs
use crate::domain::error::HostResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
}

/// The live document of a tab as handed to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub url: String,
    pub title: String,
    pub html: String,
}

#[async_trait]
pub trait TabHost: Send + Sync + fmt::Debug {
    /// The tab the user is currently looking at, if any.
    async fn active_tab(&self) -> HostResult<Option<Tab>>;

    /// Load `url` into a new tab and make it active.
    async fn open_tab(&self, url: &str) -> HostResult<Tab>;

    /// Gain access to the tab's document. Restricted pages are refused with
    /// `HostError::Injection`; `Ok(None)` means the page yielded nothing.
    async fn document(&self, tab: TabId) -> HostResult<Option<PageDocument>>;

    /// Open a new tab displaying `html`.
    async fn create_tab(&self, html: &str, title: &str) -> HostResult<TabId>;
}
