// pagekeep/src/infrastructure/mod.rs
pub mod di;
pub mod downloads;
pub mod http;
pub mod repositories;
pub mod storage;
pub mod tabs;
