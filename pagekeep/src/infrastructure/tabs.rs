// pagekeep/src/infrastructure/tabs.rs
use crate::domain::error::{HostError, HostResult};
use crate::domain::services::fetcher::ResourceFetcher;
use crate::domain::services::tabs::{PageDocument, Tab, TabHost, TabId};
use async_trait::async_trait;
use select::document::Document;
use select::predicate::Name;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use url::Url;

/// Schemes whose documents the extractor may read.
const ACCESSIBLE_SCHEMES: &[&str] = &["http", "https", "file"];

#[derive(Debug, Clone)]
struct LoadedTab {
    tab: Tab,
    /// `None` for pages the host refuses to hand out
    html: Option<String>,
}

#[derive(Debug, Default)]
struct TabTable {
    last_id: u64,
    active: Option<TabId>,
    tabs: BTreeMap<TabId, LoadedTab>,
}

impl TabTable {
    fn insert(&mut self, url: String, title: String, html: Option<String>) -> Tab {
        self.last_id += 1;
        let tab = Tab {
            id: TabId(self.last_id),
            url,
            title,
        };
        self.tabs.insert(
            tab.id,
            LoadedTab {
                tab: tab.clone(),
                html,
            },
        );
        self.active = Some(tab.id);
        tab
    }
}

/// Tabs backed by documents loaded through a [`ResourceFetcher`].
///
/// Cloned tabs are written to HTML files in `clone_dir` and, when
/// `open_clones` is set, opened in the system browser.
#[derive(Debug)]
pub struct LocalTabHost {
    fetcher: Arc<dyn ResourceFetcher>,
    clone_dir: PathBuf,
    open_clones: bool,
    table: Mutex<TabTable>,
}

impl LocalTabHost {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, clone_dir: impl Into<PathBuf>, open_clones: bool) -> Self {
        Self {
            fetcher,
            clone_dir: clone_dir.into(),
            open_clones,
            table: Mutex::new(TabTable::default()),
        }
    }
}

/// Parse a user supplied location: an absolute URL or a local file path.
pub fn parse_location(location: &str) -> HostResult<Url> {
    if let Ok(url) = Url::parse(location) {
        // a single letter "scheme" is a Windows drive
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }
    let path = Path::new(location);
    let absolute = std::fs::canonicalize(path)
        .map_err(|e| HostError::Tab(format!("Cannot open {}: {}", location, e)))?;
    Url::from_file_path(&absolute)
        .map_err(|_| HostError::Tab(format!("Cannot open {}: not a valid path", location)))
}

/// Text of the document's `<title>`, trimmed.
pub fn page_title(html: &str) -> String {
    Document::from(html)
        .find(Name("title"))
        .next()
        .map(|n| n.text().trim().to_owned())
        .unwrap_or_default()
}

#[async_trait]
impl TabHost for LocalTabHost {
    async fn active_tab(&self) -> HostResult<Option<Tab>> {
        let table = self.table.lock().await;
        Ok(table
            .active
            .and_then(|id| table.tabs.get(&id))
            .map(|loaded| loaded.tab.clone()))
    }

    #[instrument(skip(self), level = "debug")]
    async fn open_tab(&self, location: &str) -> HostResult<Tab> {
        let url = parse_location(location)?;

        let (title, html) = if ACCESSIBLE_SCHEMES.contains(&url.scheme()) {
            let resource = self
                .fetcher
                .fetch(&url)
                .await
                .map_err(|e| HostError::Tab(e.to_string()))?;
            let html = resource.text();
            let title = page_title(&html);
            (title, Some(html))
        } else {
            debug!("Opening restricted page {}", url);
            (String::new(), None)
        };

        // untitled pages show their address
        let title = if title.is_empty() { url.to_string() } else { title };
        let tab = self.table.lock().await.insert(url.to_string(), title, html);
        debug!("Opened tab {} for {}", tab.id, tab.url);
        Ok(tab)
    }

    #[instrument(skip(self), level = "debug")]
    async fn document(&self, tab: TabId) -> HostResult<Option<PageDocument>> {
        let table = self.table.lock().await;
        let loaded = table
            .tabs
            .get(&tab)
            .ok_or_else(|| HostError::Injection(format!("No tab with id: {}.", tab)))?;

        let Some(html) = &loaded.html else {
            let scheme = loaded.tab.url.split(':').next().unwrap_or_default();
            return Err(HostError::Injection(format!(
                "Cannot access a {}:// URL",
                scheme
            )));
        };

        if html.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(PageDocument {
            url: loaded.tab.url.clone(),
            title: loaded.tab.title.clone(),
            html: html.clone(),
        }))
    }

    #[instrument(skip(self, html), level = "debug")]
    async fn create_tab(&self, html: &str, title: &str) -> HostResult<TabId> {
        tokio::fs::create_dir_all(&self.clone_dir)
            .await
            .map_err(|e| HostError::Tab(e.to_string()))?;

        let (_, path) = tempfile::Builder::new()
            .prefix("clone-")
            .suffix(".html")
            .tempfile_in(&self.clone_dir)
            .and_then(|file| file.keep().map_err(|e| e.error))
            .map_err(|e| HostError::Tab(e.to_string()))?;
        tokio::fs::write(&path, html)
            .await
            .map_err(|e| HostError::Tab(e.to_string()))?;

        let url = Url::from_file_path(&path)
            .map_err(|_| HostError::Tab(format!("Invalid path: {}", path.display())))?;
        let tab = self
            .table
            .lock()
            .await
            .insert(url.to_string(), title.to_string(), Some(html.to_string()));

        if self.open_clones {
            open::that(&path).map_err(|e| HostError::Tab(e.to_string()))?;
        }
        debug!("Cloned tab {} at {}", tab.id, path.display());
        Ok(tab.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::HttpFetcher;
    use std::fs;

    fn host(dir: &Path) -> LocalTabHost {
        let fetcher = Arc::new(HttpFetcher::new("pagekeep-test").unwrap());
        LocalTabHost::new(fetcher, dir.join("clones"), false)
    }

    #[test]
    fn given_html_when_reading_title_then_trims_text() {
        assert_eq!(
            page_title("<html><head><title>  Hello </title></head></html>"),
            "Hello"
        );
        assert_eq!(page_title("<p>no title</p>"), "");
    }

    #[tokio::test]
    async fn given_local_file_when_opening_tab_then_document_is_available() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<html><head><title>Local</title></head><body>x</body></html>").unwrap();
        let host = host(dir.path());

        let tab = host.open_tab(page.to_str().unwrap()).await.unwrap();

        assert_eq!(tab.title, "Local");
        assert!(tab.url.starts_with("file://"));
        assert_eq!(host.active_tab().await.unwrap(), Some(tab.clone()));
        let document = host.document(tab.id).await.unwrap().unwrap();
        assert!(document.html.contains("<body>x</body>"));
    }

    #[tokio::test]
    async fn given_restricted_scheme_when_reading_document_then_injection_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());

        let tab = host.open_tab("chrome://settings").await.unwrap();

        let err = host.document(tab.id).await.unwrap_err();
        assert_eq!(err, HostError::Injection("Cannot access a chrome:// URL".to_string()));
    }

    #[tokio::test]
    async fn given_unknown_tab_when_reading_document_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());

        let err = host.document(TabId(42)).await.unwrap_err();
        assert_eq!(err.to_string(), "No tab with id: 42.");
    }

    #[tokio::test]
    async fn given_html_when_creating_tab_then_writes_clone_and_activates_it() {
        let dir = tempfile::tempdir().unwrap();
        let host = host(dir.path());

        let id = host.create_tab("<html><body>copy</body></html>", "Copy").await.unwrap();

        let active = host.active_tab().await.unwrap().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.title, "Copy");
        let path = Url::parse(&active.url).unwrap().to_file_path().unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "<html><body>copy</body></html>");
    }
}
