// pagekeep/src/domain/resource.rs
use serde::{Deserialize, Serialize};

/// An image harvested from the page and inlined as a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedImage {
    pub source_url: String,
    pub alt_text: String,
    pub data_uri: String,
}

/// Everything collected from one page during a rich capture.
///
/// Images whose fetch failed are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    /// Outer markup of the document root
    pub html: String,
    /// One entry per stylesheet or `<style>` block, in document order
    pub css: Vec<String>,
    /// Inline script bodies; external scripts are never fetched
    pub js: Vec<String>,
    pub images: Vec<CapturedImage>,
}

impl ResourceBundle {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Default::default()
        }
    }
}

/// Result of the light extraction path: markup plus style references kept
/// as live links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBundle {
    /// `<style>` blocks followed by `<link rel="stylesheet">` tags
    pub styles: String,
    /// Inner markup of `<body>`
    pub body: String,
}

/// Extraction output, one variant per capture mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Rich(ResourceBundle),
    Raw(RawBundle),
}
