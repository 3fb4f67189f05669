// pagekeep/src/util/testing.rs
//! Shared test support: one-time logging, an environment guard and
//! in-memory implementations of the host ports.

use crate::config::{ENV_DATA_DIR, ENV_DOWNLOAD_DIR, ENV_SUBDIRECTORY};
use crate::domain::error::{HostError, HostResult};
use crate::domain::services::downloads::{DownloadHost, DownloadId, DownloadRequest};
use crate::domain::services::fetcher::{FetchedResource, ResourceFetcher};
use crate::domain::services::storage::KeyValueStore;
use crate::domain::services::tabs::{PageDocument, Tab, TabHost, TabId};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use url::Url;

static TEST_ENV: OnceLock<()> = OnceLock::new();

/// Initializes logging for tests exactly once.
pub fn init_test_env() {
    TEST_ENV.get_or_init(|| {
        setup_test_logging();
        info!("Test environment initialized");
    });
}

fn setup_test_logging() {
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let noisy_modules = ["html5ever", "reqwest", "mio", "want", "hyper_util", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

const GUARDED_VARS: [&str; 3] = [ENV_DOWNLOAD_DIR, ENV_SUBDIRECTORY, ENV_DATA_DIR];

/// Restores the `PAGEKEEP_*` environment on drop.
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    pub fn new() -> Self {
        Self {
            saved: GUARDED_VARS
                .iter()
                .map(|name| (*name, env::var(name).ok()))
                .collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }
}

// poisoning only happens when a test already panicked
fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Serves canned resources keyed by URL; everything else is a 404.
#[derive(Debug, Default)]
pub struct StubFetcher {
    resources: Mutex<HashMap<String, FetchedResource>>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        locked(&self.resources).insert(
            url.to_string(),
            FetchedResource {
                bytes: bytes.into(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl ResourceFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> HostResult<FetchedResource> {
        locked(&self.requests).push(url.to_string());
        locked(&self.resources)
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| HostError::Fetch(format!("HTTP 404 Not Found for {}", url)))
    }
}

#[derive(Debug)]
struct StubPage {
    tab: Tab,
    document: HostResult<Option<String>>,
}

#[derive(Debug, Default)]
struct StubTabs {
    last_id: u64,
    active: Option<TabId>,
    pages: BTreeMap<TabId, StubPage>,
    created: Vec<(String, String)>,
}

impl StubTabs {
    fn add(&mut self, url: &str, title: &str, document: HostResult<Option<String>>) -> TabId {
        self.last_id += 1;
        let id = TabId(self.last_id);
        let tab = Tab {
            id,
            url: url.to_string(),
            title: title.to_string(),
        };
        self.pages.insert(id, StubPage { tab, document });
        self.active = Some(id);
        id
    }
}

/// Tab host over pages registered up front.
#[derive(Debug, Default)]
pub struct StubTabHost {
    tabs: Mutex<StubTabs>,
}

impl StubTabHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a readable page and make it active
    pub fn add_page(&self, url: &str, title: &str, html: &str) -> TabId {
        locked(&self.tabs).add(url, title, Ok(Some(html.to_string())))
    }

    /// Register a page whose document comes back empty
    pub fn add_empty_page(&self, url: &str, title: &str) -> TabId {
        locked(&self.tabs).add(url, title, Ok(None))
    }

    /// Register a page the host refuses to hand out
    pub fn add_restricted_page(&self, url: &str, error: HostError) -> TabId {
        locked(&self.tabs).add(url, url, Err(error))
    }

    /// `(html, title)` of every tab opened through `create_tab`
    pub fn created(&self) -> Vec<(String, String)> {
        locked(&self.tabs).created.clone()
    }
}

#[async_trait]
impl TabHost for StubTabHost {
    async fn active_tab(&self) -> HostResult<Option<Tab>> {
        let tabs = locked(&self.tabs);
        Ok(tabs
            .active
            .and_then(|id| tabs.pages.get(&id))
            .map(|page| page.tab.clone()))
    }

    async fn open_tab(&self, url: &str) -> HostResult<Tab> {
        let mut tabs = locked(&self.tabs);
        let tab = tabs
            .pages
            .values()
            .find(|page| page.tab.url == url)
            .map(|page| page.tab.clone())
            .ok_or_else(|| HostError::Tab(format!("Cannot open {}", url)))?;
        tabs.active = Some(tab.id);
        Ok(tab)
    }

    async fn document(&self, tab: TabId) -> HostResult<Option<PageDocument>> {
        let tabs = locked(&self.tabs);
        let page = tabs
            .pages
            .get(&tab)
            .ok_or_else(|| HostError::Injection(format!("No tab with id: {}.", tab)))?;
        let html = page.document.clone()?;
        Ok(html.map(|html| PageDocument {
            url: page.tab.url.clone(),
            title: page.tab.title.clone(),
            html,
        }))
    }

    async fn create_tab(&self, html: &str, title: &str) -> HostResult<TabId> {
        let mut tabs = locked(&self.tabs);
        tabs.created.push((html.to_string(), title.to_string()));
        let url = format!("blob:clone-{}", tabs.created.len());
        Ok(tabs.add(&url, title, Ok(Some(html.to_string()))))
    }
}

#[derive(Debug, Default)]
struct StubDownloads {
    last_id: u64,
    requests: BTreeMap<DownloadId, DownloadRequest>,
    removal_attempts: Vec<DownloadId>,
    erase_attempts: Vec<DownloadId>,
    shown: Vec<DownloadId>,
}

/// Download host that keeps submitted files in memory and counts every
/// removal and erase attempt. Failures can be switched on per operation.
#[derive(Debug, Default)]
pub struct StubDownloadHost {
    state: Mutex<StubDownloads>,
    download_error: Option<String>,
    fail_removals: bool,
    fail_erasures: bool,
}

impl StubDownloadHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_downloads(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    pub fn failing_erasures(mut self) -> Self {
        self.fail_erasures = true;
        self
    }

    /// Requests still held, by id
    pub fn requests(&self) -> Vec<(DownloadId, DownloadRequest)> {
        locked(&self.state)
            .requests
            .iter()
            .map(|(id, request)| (*id, request.clone()))
            .collect()
    }

    pub fn removal_attempts(&self) -> Vec<DownloadId> {
        locked(&self.state).removal_attempts.clone()
    }

    pub fn erase_attempts(&self) -> Vec<DownloadId> {
        locked(&self.state).erase_attempts.clone()
    }

    pub fn shown(&self) -> Vec<DownloadId> {
        locked(&self.state).shown.clone()
    }
}

#[async_trait]
impl DownloadHost for StubDownloadHost {
    async fn download(&self, request: DownloadRequest) -> HostResult<DownloadId> {
        if let Some(message) = &self.download_error {
            return Err(HostError::Download(message.clone()));
        }
        let mut state = locked(&self.state);
        state.last_id += 1;
        let id = DownloadId(state.last_id);
        state.requests.insert(id, request);
        Ok(id)
    }

    async fn remove_file(&self, id: DownloadId) -> HostResult<()> {
        let mut state = locked(&self.state);
        state.removal_attempts.push(id);
        if self.fail_removals {
            return Err(HostError::Download("Download file already deleted".to_string()));
        }
        state.requests.remove(&id);
        Ok(())
    }

    async fn erase(&self, id: DownloadId) -> HostResult<()> {
        let mut state = locked(&self.state);
        state.erase_attempts.push(id);
        if self.fail_erasures {
            return Err(HostError::Download("Invalid downloadId".to_string()));
        }
        Ok(())
    }

    async fn show(&self, id: DownloadId) -> HostResult<()> {
        let mut state = locked(&self.state);
        if !state.requests.contains_key(&id) {
            return Err(HostError::Download("Download file already deleted".to_string()));
        }
        state.shown.push(id);
        Ok(())
    }
}

/// In-memory key/value store. Reads can be made to yield to the scheduler
/// after taking their snapshot, and writes can be made to fail.
#[derive(Debug, Default)]
pub struct StubStore {
    values: Mutex<HashMap<String, Value>>,
    yield_on_read: bool,
    write_error: Option<String>,
    writes: Mutex<usize>,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets another task run between a read and the write that follows it
    pub fn yielding_reads(mut self) -> Self {
        self.yield_on_read = true;
        self
    }

    pub fn failing_writes(mut self, message: &str) -> Self {
        self.write_error = Some(message.to_string());
        self
    }

    /// Number of `set` calls, failed ones included
    pub fn writes(&self) -> usize {
        *locked(&self.writes)
    }
}

#[async_trait]
impl KeyValueStore for StubStore {
    async fn get(&self, key: &str) -> HostResult<Option<Value>> {
        let value = locked(&self.values).get(key).cloned();
        if self.yield_on_read {
            tokio::task::yield_now().await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> HostResult<()> {
        *locked(&self.writes) += 1;
        if let Some(message) = &self.write_error {
            return Err(HostError::Storage(message.clone()));
        }
        locked(&self.values).insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn given_changed_variables_when_guard_dropped_then_restored() {
        init_test_env();
        env::remove_var(ENV_SUBDIRECTORY);
        {
            let _guard = EnvGuard::new();
            env::set_var(ENV_SUBDIRECTORY, "temporary");
        }
        assert!(env::var(ENV_SUBDIRECTORY).is_err());
    }

    #[tokio::test]
    async fn given_failing_writes_when_setting_then_value_is_not_stored() {
        let store = StubStore::new().failing_writes("QUOTA_BYTES quota exceeded");

        let err = store.set("k", Value::from(1)).await.unwrap_err();

        assert_eq!(err, HostError::Storage("QUOTA_BYTES quota exceeded".to_string()));
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn given_restricted_page_when_reading_document_then_host_error_is_returned() {
        let host = StubTabHost::new();
        let id = host.add_restricted_page(
            "chrome://settings",
            HostError::Injection("Cannot access a chrome:// URL".to_string()),
        );

        assert_eq!(
            host.document(id).await.unwrap_err().to_string(),
            "Cannot access a chrome:// URL"
        );
    }
}
