// pagekeep/src/infrastructure/di/service_container.rs
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::extractor::ResourceExtractor;
use crate::application::messaging::MessageRouter;
use crate::application::services::capture_service::CaptureService;
use crate::application::services::catalog_service::CatalogService;
use crate::application::{CaptureServiceImpl, CatalogServiceImpl};
use crate::config::Settings;
use crate::domain::services::downloads::DownloadHost;
use crate::domain::services::fetcher::ResourceFetcher;
use crate::domain::services::storage::KeyValueStore;
use crate::domain::services::tabs::TabHost;
use crate::infrastructure::downloads::FsDownloadHost;
use crate::infrastructure::http::HttpFetcher;
use crate::infrastructure::repositories::catalog_repository::StorageCatalogRepository;
use crate::infrastructure::storage::JsonFileStore;
use crate::infrastructure::tabs::LocalTabHost;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Composition root: wires the host ports into the application services.
pub struct ServiceContainer {
    // Host ports
    pub tab_host: Arc<dyn TabHost>,
    pub download_host: Arc<dyn DownloadHost>,
    pub store: Arc<dyn KeyValueStore>,

    // Application services
    pub catalog_service: Arc<dyn CatalogService>,
    pub capture_service: Arc<dyn CaptureService>,
}

impl ServiceContainer {
    /// Build the production ports from `config` and wire all services
    #[instrument(skip(config), level = "debug")]
    pub fn new(config: &Settings) -> ApplicationResult<Self> {
        let fetcher: Arc<dyn ResourceFetcher> = Arc::new(
            HttpFetcher::new(&config.user_agent)
                .map_err(|e| ApplicationError::from(e).context("Failed to create fetcher"))?,
        );
        let tab_host = Arc::new(LocalTabHost::new(
            fetcher.clone(),
            config.clone_dir(),
            config.open_clones,
        ));
        let download_host = Arc::new(FsDownloadHost::new(
            config.download_dir.clone(),
            config.download_history_path(),
        ));
        let store = Arc::new(JsonFileStore::new(config.storage_path()));

        debug!(
            "Downloads below {}, data in {}",
            config.download_dir.display(),
            config.data_dir.display()
        );
        Ok(Self::with_ports(config, fetcher, tab_host, download_host, store))
    }

    /// Wire the services around caller supplied ports
    pub fn with_ports(
        config: &Settings,
        fetcher: Arc<dyn ResourceFetcher>,
        tab_host: Arc<dyn TabHost>,
        download_host: Arc<dyn DownloadHost>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let repository = Arc::new(StorageCatalogRepository::new(store.clone()));
        let catalog_service: Arc<dyn CatalogService> =
            Arc::new(CatalogServiceImpl::new(repository, download_host.clone()));

        let capture_service: Arc<dyn CaptureService> = Arc::new(CaptureServiceImpl::new(
            tab_host.clone(),
            download_host.clone(),
            catalog_service.clone(),
            ResourceExtractor::new(fetcher),
            config.subdirectory.clone(),
        ));

        Self {
            tab_host,
            download_host,
            store,
            catalog_service,
            capture_service,
        }
    }

    /// Router answering messaging requests with this container's services
    pub fn message_router(&self) -> MessageRouter {
        MessageRouter::new(self.capture_service.clone())
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("tab_host", &"Arc<dyn TabHost>")
            .field("download_host", &"Arc<dyn DownloadHost>")
            .field("store", &"Arc<dyn KeyValueStore>")
            .field("catalog_service", &"Arc<dyn CatalogService>")
            .field("capture_service", &"Arc<dyn CaptureService>")
            .finish()
    }
}
