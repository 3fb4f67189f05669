// pagekeep/src/application/services/capture_service_impl.rs
use std::sync::Arc;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::extractor::ResourceExtractor;
use crate::application::services::capture_service::CaptureService;
use crate::application::services::catalog_service::CatalogService;
use crate::application::templates::offline_page::{assemble, assemble_raw};
use crate::domain::capture::{derive_filename, CaptureMode};
use crate::domain::catalog::CatalogEntry;
use crate::domain::resource::Extraction;
use crate::domain::services::downloads::{DownloadHost, DownloadId, DownloadRequest};
use crate::domain::services::tabs::{PageDocument, Tab, TabHost, TabId};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct CaptureServiceImpl {
    tabs: Arc<dyn TabHost>,
    downloads: Arc<dyn DownloadHost>,
    catalog: Arc<dyn CatalogService>,
    extractor: ResourceExtractor,
    subdirectory: String,
}

impl CaptureServiceImpl {
    pub fn new(
        tabs: Arc<dyn TabHost>,
        downloads: Arc<dyn DownloadHost>,
        catalog: Arc<dyn CatalogService>,
        extractor: ResourceExtractor,
        subdirectory: impl Into<String>,
    ) -> Self {
        Self {
            tabs,
            downloads,
            catalog,
            extractor,
            subdirectory: subdirectory.into(),
        }
    }

    fn download_path(&self, title: &str) -> String {
        let filename = derive_filename(Some(title));
        let subdirectory = self.subdirectory.trim_matches('/');
        if subdirectory.is_empty() {
            filename
        } else {
            format!("{}/{}", subdirectory, filename)
        }
    }

    async fn page_document(&self, tab: TabId) -> ApplicationResult<PageDocument> {
        self.tabs
            .document(tab)
            .await?
            .ok_or(ApplicationError::NoExtractionResult)
    }

    async fn extract(&self, mode: CaptureMode, page: &PageDocument) -> Extraction {
        match mode {
            CaptureMode::Rich => Extraction::Rich(self.extractor.extract(page).await),
            CaptureMode::Raw => Extraction::Raw(self.extractor.extract_raw(page)),
        }
    }
}

#[async_trait]
impl CaptureService for CaptureServiceImpl {
    #[instrument(skip(self), level = "debug")]
    async fn capture(
        &self,
        mode: CaptureMode,
        tab: TabId,
        url: &str,
        title: &str,
    ) -> ApplicationResult<DownloadId> {
        let page = self.page_document(tab).await?;

        let contents = match self.extract(mode, &page).await {
            Extraction::Rich(bundle) => assemble(url, title, &bundle),
            Extraction::Raw(content) => assemble_raw(url, title, &content),
        };

        let filename = self.download_path(title);
        debug!("Submitting download {} ({} bytes)", filename, contents.len());
        let download_id = self
            .downloads
            .download(DownloadRequest { filename, contents })
            .await?;

        self.catalog
            .append(CatalogEntry::new(url, title, download_id))
            .await?;

        info!("Saved {} as download {}", url, download_id);
        Ok(download_id)
    }

    #[instrument(skip(self), level = "debug")]
    async fn save_active_page(&self, mode: CaptureMode) -> ApplicationResult<(Tab, DownloadId)> {
        let tab = self
            .tabs
            .active_tab()
            .await?
            .ok_or(ApplicationError::NoActiveTab)?;

        let download_id = self.capture(mode, tab.id, &tab.url, &tab.title).await?;
        Ok((tab, download_id))
    }

    #[instrument(skip(self), level = "debug")]
    async fn clone_page(&self, tab: TabId) -> ApplicationResult<TabId> {
        let page = self.page_document(tab).await?;
        let html = ResourceExtractor::raw_markup(&page);
        self.create_cloned_tab(&html, &page.title).await
    }

    #[instrument(skip(self, html), level = "debug")]
    async fn create_cloned_tab(&self, html: &str, title: &str) -> ApplicationResult<TabId> {
        Ok(self.tabs.create_tab(html, title).await?)
    }

    #[instrument(skip(self), level = "trace")]
    async fn resolve_tab(&self, tab: Option<TabId>) -> ApplicationResult<TabId> {
        match tab {
            Some(id) => Ok(id),
            None => self
                .tabs
                .active_tab()
                .await?
                .map(|t| t.id)
                .ok_or(ApplicationError::NoActiveTab),
        }
    }
}
