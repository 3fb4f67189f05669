// pagekeep/src/application/services/mod.rs
pub mod capture_service;
pub mod capture_service_impl;
pub mod catalog_service;
pub mod catalog_service_impl;

pub use capture_service::CaptureService;
pub use catalog_service::CatalogService;
