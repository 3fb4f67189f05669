// pagekeep/src/application/mod.rs
pub mod error;
pub mod extractor;
pub mod messaging;
pub mod services;
pub mod templates;

// Re-export key services for easier imports
pub use services::capture_service_impl::CaptureServiceImpl;
pub use services::catalog_service_impl::CatalogServiceImpl;
