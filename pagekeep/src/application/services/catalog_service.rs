// pagekeep/src/application/services/catalog_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::catalog::{CatalogEntry, ClearReport};
use async_trait::async_trait;
use std::fmt::Debug;

/// Service interface for the saved-page catalog
#[async_trait]
pub trait CatalogService: Send + Sync + Debug {
    /// All saved pages in the order they were saved
    async fn list(&self) -> ApplicationResult<Vec<CatalogEntry>>;

    /// Append one entry. Appends are serialized so concurrent saves in
    /// one process never overwrite each other.
    async fn append(&self, entry: CatalogEntry) -> ApplicationResult<()>;

    /// Ask the download host to reveal the file of entry `index` (0-based)
    async fn reveal(&self, index: usize) -> ApplicationResult<CatalogEntry>;

    /// Delete every downloaded file, erase its history record, then empty
    /// the catalog. Individual deletion failures are logged and counted.
    async fn clear_all(&self) -> ApplicationResult<ClearReport>;
}
