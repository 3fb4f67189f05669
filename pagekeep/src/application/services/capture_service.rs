// pagekeep/src/application/services/capture_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::capture::CaptureMode;
use crate::domain::services::downloads::DownloadId;
use crate::domain::services::tabs::{Tab, TabId};
use async_trait::async_trait;
use std::fmt::Debug;

/// Service interface for capturing pages into offline files
#[async_trait]
pub trait CaptureService: Send + Sync + Debug {
    /// Capture tab `tab` with the given extraction mode, download the
    /// result and record it in the catalog
    async fn capture(
        &self,
        mode: CaptureMode,
        tab: TabId,
        url: &str,
        title: &str,
    ) -> ApplicationResult<DownloadId>;

    /// Rich capture: CSS, inline scripts and images inlined
    async fn save_page(&self, tab: TabId, url: &str, title: &str) -> ApplicationResult<DownloadId> {
        self.capture(CaptureMode::Rich, tab, url, title).await
    }

    /// Light capture: style blocks, linked stylesheets and body markup
    async fn save_page_raw(
        &self,
        tab: TabId,
        url: &str,
        title: &str,
    ) -> ApplicationResult<DownloadId> {
        self.capture(CaptureMode::Raw, tab, url, title).await
    }

    /// Capture whatever tab is active
    async fn save_active_page(&self, mode: CaptureMode) -> ApplicationResult<(Tab, DownloadId)>;

    /// Open a new tab showing the raw markup of `tab`, no resource inlining
    async fn clone_page(&self, tab: TabId) -> ApplicationResult<TabId>;

    /// Open a new tab displaying `html`
    async fn create_cloned_tab(&self, html: &str, title: &str) -> ApplicationResult<TabId>;

    /// Resolve an optional tab id to a tab, falling back to the active one
    async fn resolve_tab(&self, tab: Option<TabId>) -> ApplicationResult<TabId>;
}
