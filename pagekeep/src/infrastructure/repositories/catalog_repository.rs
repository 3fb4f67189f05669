// pagekeep/src/infrastructure/repositories/catalog_repository.rs
use crate::domain::catalog::{CatalogEntry, CATALOG_KEY};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::catalog_repository::CatalogRepository;
use crate::domain::services::storage::KeyValueStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{instrument, trace};

/// Catalog kept as one JSON array under [`CATALOG_KEY`] in a key/value store.
#[derive(Debug, Clone)]
pub struct StorageCatalogRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StorageCatalogRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogRepository for StorageCatalogRepository {
    #[instrument(skip(self), level = "trace")]
    async fn get_all(&self) -> DomainResult<Vec<CatalogEntry>> {
        let Some(value) = self.store.get(CATALOG_KEY).await? else {
            trace!("No catalog stored yet");
            return Ok(Vec::new());
        };
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| DomainError::DeserializationError(e.to_string()))
    }

    #[instrument(skip(self, entries), level = "trace", fields(count = entries.len()))]
    async fn replace_all(&self, entries: &[CatalogEntry]) -> DomainResult<()> {
        let value = serde_json::to_value(entries)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        self.store.set(CATALOG_KEY, value).await?;
        Ok(())
    }
}
