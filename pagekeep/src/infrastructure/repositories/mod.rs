// pagekeep/src/infrastructure/repositories/mod.rs
pub mod catalog_repository;
