// pagekeep/src/domain/repositories/catalog_repository.rs
use crate::domain::catalog::CatalogEntry;
use crate::domain::error::DomainResult;
use async_trait::async_trait;

/// Repository for the saved-page catalog.
///
/// The catalog is stored as a single value, so writes replace the whole list.
#[async_trait]
pub trait CatalogRepository: std::fmt::Debug + Send + Sync {
    /// All entries in insertion order; an absent catalog reads as empty
    async fn get_all(&self) -> DomainResult<Vec<CatalogEntry>>;

    /// Overwrite the stored catalog
    async fn replace_all(&self, entries: &[CatalogEntry]) -> DomainResult<()>;
}
