// pagekeep/src/domain/services/storage.rs
use crate::domain::error::HostResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

/// Local key/value storage holding JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> HostResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> HostResult<()>;
}
