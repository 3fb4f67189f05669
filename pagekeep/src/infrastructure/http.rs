// pagekeep/src/infrastructure/http.rs
use crate::domain::error::{DomainError, DomainResult, HostError, HostResult};
use crate::domain::services::fetcher::{FetchedResource, ResourceFetcher};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

/// Fetches `http(s)://` resources over the network and `file://` resources
/// from disk. No request timeout is imposed.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| DomainError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_http(&self, url: &Url) -> HostResult<FetchedResource> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| HostError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Fetch(format!("HTTP {} for {}", status, url)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(media_type);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HostError::Fetch(e.to_string()))?;

        debug!("Fetched {} bytes ({:?})", bytes.len(), content_type);
        Ok(FetchedResource {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> HostResult<FetchedResource> {
        match url.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "file" => fetch_file(url).await,
            other => Err(HostError::Fetch(format!("Unsupported URL scheme: {}", other))),
        }
    }
}

#[instrument(level = "debug")]
async fn fetch_file(url: &Url) -> HostResult<FetchedResource> {
    let path = url
        .to_file_path()
        .map_err(|_| HostError::Fetch(format!("Invalid file URL: {}", url)))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| HostError::Fetch(format!("{}: {}", path.display(), e)))?;
    Ok(FetchedResource {
        bytes,
        content_type: None,
    })
}

/// Media type of a `Content-Type` header value, parameters stripped.
fn media_type(header: &str) -> Option<String> {
    let mime = header.split(';').next()?.trim().to_ascii_lowercase();
    (!mime.is_empty()).then_some(mime)
}
