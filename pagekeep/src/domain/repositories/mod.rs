// pagekeep/src/domain/repositories/mod.rs
pub mod catalog_repository;
