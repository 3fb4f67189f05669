// pagekeep/src/application/services/catalog_service_impl.rs
use std::sync::Arc;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::catalog_service::CatalogService;
use crate::domain::catalog::{CatalogEntry, ClearReport};
use crate::domain::repositories::catalog_repository::CatalogRepository;
use crate::domain::services::downloads::DownloadHost;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

#[derive(Debug)]
pub struct CatalogServiceImpl<R: CatalogRepository> {
    repository: Arc<R>,
    downloads: Arc<dyn DownloadHost>,
    // guards the read-modify-write of the stored list
    write_lock: Mutex<()>,
}

impl<R: CatalogRepository> CatalogServiceImpl<R> {
    pub fn new(repository: Arc<R>, downloads: Arc<dyn DownloadHost>) -> Self {
        Self {
            repository,
            downloads,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<R: CatalogRepository + 'static> CatalogService for CatalogServiceImpl<R> {
    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> ApplicationResult<Vec<CatalogEntry>> {
        Ok(self.repository.get_all().await?)
    }

    #[instrument(skip(self, entry), level = "debug", fields(url = %entry.url, id = %entry.download_id))]
    async fn append(&self, entry: CatalogEntry) -> ApplicationResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.repository.get_all().await?;
        entries.push(entry);
        self.repository.replace_all(&entries).await?;

        debug!("Catalog now holds {} entries", entries.len());
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn reveal(&self, index: usize) -> ApplicationResult<CatalogEntry> {
        let entry = self
            .repository
            .get_all()
            .await?
            .into_iter()
            .nth(index)
            .ok_or(ApplicationError::EntryNotFound(index + 1))?;

        self.downloads.show(entry.download_id).await?;
        Ok(entry)
    }

    #[instrument(skip(self), level = "debug")]
    async fn clear_all(&self) -> ApplicationResult<ClearReport> {
        let _guard = self.write_lock.lock().await;

        let entries = self.repository.get_all().await?;
        let mut report = ClearReport {
            entries: entries.len(),
            ..Default::default()
        };

        for entry in &entries {
            report.removal_attempts += 1;
            if let Err(e) = self.downloads.remove_file(entry.download_id).await {
                error!("Error removing file {}: {}", entry.download_id, e);
                report.removal_failures += 1;
            }

            report.erase_attempts += 1;
            if let Err(e) = self.downloads.erase(entry.download_id).await {
                error!("Error erasing download {}: {}", entry.download_id, e);
                report.erase_failures += 1;
            }
        }

        // only after every deletion attempt has finished
        self.repository.replace_all(&[]).await?;

        debug!("Cleared catalog: {:?}", report);
        Ok(report)
    }
}
