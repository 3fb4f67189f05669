// pagekeep/src/domain/catalog.rs
use crate::domain::services::downloads::DownloadId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key holding the whole catalog as one JSON array.
pub const CATALOG_KEY: &str = "savedPages";

/// Label shown when the catalog has no entries.
pub const EMPTY_PLACEHOLDER: &str = "No pages saved yet";

/// Metadata of one saved page. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub url: String,
    pub title: String,
    pub download_id: DownloadId,
    #[serde(alias = "date")]
    pub saved_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>, download_id: DownloadId) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            download_id,
            saved_at: Utc::now(),
        }
    }

    /// Title if present, otherwise the page URL.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of a clear-all run. Counts include failed attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub entries: usize,
    pub removal_attempts: usize,
    pub removal_failures: usize,
    pub erase_attempts: usize,
    pub erase_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_entry_without_title_when_label_then_falls_back_to_url() {
        let entry = CatalogEntry::new("https://example.com", "", DownloadId(1));
        assert_eq!(entry.label(), "https://example.com");

        let entry = CatalogEntry::new("https://example.com", "Example", DownloadId(1));
        assert_eq!(entry.to_string(), "Example");
    }

    #[test]
    fn given_entry_when_serialized_then_uses_storage_field_names() {
        let entry = CatalogEntry::new("https://example.com", "Example", DownloadId(7));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["downloadId"], 7);
        assert!(value["savedAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn given_legacy_date_field_when_deserialized_then_reads_saved_at() {
        let json = r#"{"url":"u","title":"t","downloadId":3,"date":"2024-05-01T10:00:00.000Z"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.download_id, DownloadId(3));
        assert_eq!(entry.saved_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }
}
