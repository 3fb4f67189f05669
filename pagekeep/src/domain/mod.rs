// pagekeep/src/domain/mod.rs
pub mod capture;
pub mod catalog;
pub mod error;
pub mod repositories;
pub mod resource;
pub mod services;
