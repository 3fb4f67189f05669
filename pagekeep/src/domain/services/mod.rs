// pagekeep/src/domain/services/mod.rs
//! Ports to the host platform. Each call is one request/response exchange
//! with a single success path and a single error path.
pub mod downloads;
pub mod fetcher;
pub mod storage;
pub mod tabs;
