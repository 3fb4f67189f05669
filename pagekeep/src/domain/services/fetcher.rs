// pagekeep/src/domain/services/fetcher.rs
use crate::domain::error::HostResult;
use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub bytes: Vec<u8>,
    /// Media type without parameters, when the source reported one
    pub content_type: Option<String>,
}

impl FetchedResource {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Fetches subresources (images, linked stylesheets) on behalf of a page.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + Debug {
    async fn fetch(&self, url: &Url) -> HostResult<FetchedResource>;
}
