// pagekeep/src/application/extractor.rs
use crate::domain::resource::{CapturedImage, RawBundle, ResourceBundle};
use crate::domain::services::fetcher::{FetchedResource, ResourceFetcher};
use crate::domain::services::tabs::PageDocument;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use select::document::Document;
use select::node::Node;
use select::predicate::Name;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

const DEFAULT_MIME: &str = "application/octet-stream";
const DATA_PREFIX: &str = "data:";
const DATA_DEFAULT_MIME: &str = "text/plain";

/// Stylesheet as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SheetSource {
    Inline(String),
    Linked(String),
}

/// Everything the extractor needs from the parsed document, owned so the
/// parse tree can be dropped before any fetch is awaited.
#[derive(Debug, Default)]
struct PagePlan {
    html: String,
    sheets: Vec<SheetSource>,
    style_blocks: Vec<String>,
    images: Vec<(String, String)>,
    scripts: Vec<String>,
}

impl PagePlan {
    fn from_html(html: &str) -> Self {
        let document = Document::from(html);
        let mut plan = PagePlan {
            html: root_markup(&document),
            ..Default::default()
        };

        for node in document.find(is_sheet_source) {
            if is_style(&node) {
                plan.sheets.push(SheetSource::Inline(node.text()));
            } else if let Some(href) = node.attr("href") {
                plan.sheets.push(SheetSource::Linked(href.to_string()));
            }
        }

        plan.style_blocks = document.find(Name("style")).map(|n| n.text()).collect();

        plan.images = document
            .find(Name("img"))
            .filter_map(|n| {
                let src = n.attr("src")?.trim();
                if src.is_empty() {
                    return None;
                }
                Some((src.to_string(), n.attr("alt").unwrap_or_default().to_string()))
            })
            .collect();

        plan.scripts = document
            .find(Name("script"))
            .filter(|n| n.attr("src").is_none())
            .map(|n| n.text())
            .filter(|text| !text.is_empty())
            .collect();

        plan
    }
}

fn is_style(node: &Node) -> bool {
    node.name() == Some("style")
}

fn is_sheet_source(node: &Node) -> bool {
    is_style(node) || is_stylesheet_link(node)
}

fn is_stylesheet_link(node: &Node) -> bool {
    node.name() == Some("link")
        && node.attr("rel").is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
}

/// Serialized outer markup of the document root element.
fn root_markup(document: &Document) -> String {
    document
        .find(Name("html"))
        .next()
        .map(|n| n.html())
        .unwrap_or_default()
}

/// Harvests a page's resources.
///
/// Individual resources that cannot be read are logged and skipped; the
/// extraction itself never fails.
#[derive(Debug, Clone)]
pub struct ResourceExtractor {
    fetcher: Arc<dyn ResourceFetcher>,
}

impl ResourceExtractor {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { fetcher }
    }

    #[instrument(skip(self, page), level = "debug", fields(url = %page.url))]
    pub async fn extract(&self, page: &PageDocument) -> ResourceBundle {
        let plan = PagePlan::from_html(&page.html);
        let base = Url::parse(&page.url).ok();

        let mut bundle = ResourceBundle::new(plan.html);

        for sheet in &plan.sheets {
            match sheet {
                SheetSource::Inline(text) => bundle.css.push(css_rules(text).join("\n")),
                SheetSource::Linked(href) => {
                    if let Some(text) = self.linked_sheet(base.as_ref(), href).await {
                        bundle.css.push(css_rules(&text).join("\n"));
                    }
                }
            }
        }

        bundle.css.extend(plan.style_blocks);

        // one image at a time, in document order
        for (src, alt) in &plan.images {
            if let Some((source_url, data_uri)) = self.image_data_uri(base.as_ref(), src).await {
                bundle.images.push(CapturedImage {
                    source_url,
                    alt_text: alt.clone(),
                    data_uri,
                });
            }
        }

        bundle.js = plan.scripts;

        debug!(
            "Extracted {} css, {} js, {} images",
            bundle.css.len(),
            bundle.js.len(),
            bundle.images.len()
        );
        bundle
    }

    /// Light extraction: style blocks, live stylesheet links and body markup.
    #[instrument(skip(self, page), level = "debug", fields(url = %page.url))]
    pub fn extract_raw(&self, page: &PageDocument) -> RawBundle {
        let document = Document::from(page.html.as_str());
        let base = Url::parse(&page.url).ok();

        let mut styles = String::new();
        for style in document.find(Name("style")) {
            styles.push_str("<style>");
            styles.push_str(&style.text());
            styles.push_str("</style>\n");
        }
        for link in document.find(is_stylesheet_link) {
            let Some(href) = link.attr("href") else {
                continue;
            };
            let href = resolve(base.as_ref(), href)
                .map(String::from)
                .unwrap_or_else(|| href.to_string());
            styles.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", href));
        }

        let body = document
            .find(Name("body"))
            .next()
            .map(|b| b.inner_html())
            .unwrap_or_default();

        RawBundle { styles, body }
    }

    /// Outer markup of the document root, untouched.
    pub fn raw_markup(page: &PageDocument) -> String {
        root_markup(&Document::from(page.html.as_str()))
    }

    async fn linked_sheet(&self, base: Option<&Url>, href: &str) -> Option<String> {
        let url = resolve(base, href)?;
        let same_origin = base.is_some_and(|b| b.origin() == url.origin());
        if !same_origin {
            debug!("Skipping cross-origin stylesheet: {}", url);
            return None;
        }
        match self.fetcher.fetch(&url).await {
            Ok(resource) => Some(resource.text()),
            Err(e) => {
                debug!("Stylesheet not accessible: {}: {}", url, e);
                None
            }
        }
    }

    async fn image_data_uri(&self, base: Option<&Url>, src: &str) -> Option<(String, String)> {
        if src.starts_with(DATA_PREFIX) {
            return match reencode_data_uri(src) {
                Some(data_uri) => Some((src.to_string(), data_uri)),
                None => {
                    warn!("Failed to decode inline image: {:.40}", src);
                    None
                }
            };
        }
        let Some(url) = resolve(base, src) else {
            warn!("Failed to fetch image: {}: unresolvable URL", src);
            return None;
        };
        match self.fetcher.fetch(&url).await {
            Ok(resource) => Some((url.to_string(), to_data_uri(&resource, &url))),
            Err(e) => {
                warn!("Failed to fetch image: {}: {}", url, e);
                None
            }
        }
    }
}

fn resolve(base: Option<&Url>, reference: &str) -> Option<Url> {
    match base {
        Some(base) => base.join(reference).ok(),
        None => Url::parse(reference).ok(),
    }
}

/// Encode a fetched resource as a `data:` URI.
pub fn to_data_uri(resource: &FetchedResource, url: &Url) -> String {
    let mime = resource
        .content_type
        .as_deref()
        .filter(|m| !m.is_empty())
        .or_else(|| mime_from_path(url.path()))
        .unwrap_or(DEFAULT_MIME);
    format!("data:{};base64,{}", mime, BASE64.encode(&resource.bytes))
}

/// Decode an inline `data:` URI, base64 or percent-encoded, and encode it
/// again as base64. Media type parameters are dropped.
pub fn reencode_data_uri(src: &str) -> Option<String> {
    let (metadata, payload) = src.strip_prefix(DATA_PREFIX)?.split_once(',')?;
    let mut parts = metadata.split(';').map(str::trim);
    let mime = parts.next().filter(|m| !m.is_empty()).unwrap_or(DATA_DEFAULT_MIME);
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let cleaned: Vec<u8> = payload.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        BASE64.decode(cleaned).ok()?
    } else {
        percent_decode(payload)?
    };
    Some(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}

/// `None` on a truncated or non-hex escape. `+` is literal.
fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

pub fn mime_from_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        "ico" => Some("image/x-icon"),
        "css" => Some("text/css"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}

/// Split a stylesheet into the serialized text of its top-level rules.
///
/// Rules the parser cannot recover are dropped. A sheet that fails to parse
/// at all is kept whole.
pub fn css_rules(sheet: &str) -> Vec<String> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let parsed = match StyleSheet::parse(sheet, options) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse stylesheet, keeping it verbatim: {}", e);
            let sheet = sheet.trim();
            return if sheet.is_empty() { Vec::new() } else { vec![sheet.to_string()] };
        }
    };

    parsed
        .rules
        .0
        .iter()
        .filter_map(|rule| match rule.to_css_string(printer_options()) {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                debug!("Skipping unprintable css rule: {}", e);
                None
            }
        })
        .collect()
}

fn printer_options() -> PrinterOptions<'static> {
    PrinterOptions {
        minify: true,
        ..PrinterOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{HostError, HostResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct MapFetcher {
        resources: HashMap<String, FetchedResource>,
        requested: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
            self.resources.insert(
                url.to_string(),
                FetchedResource {
                    bytes: bytes.to_vec(),
                    content_type: content_type.map(String::from),
                },
            );
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for MapFetcher {
        async fn fetch(&self, url: &Url) -> HostResult<FetchedResource> {
            self.requested.lock().unwrap().push(url.to_string());
            self.resources
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| HostError::Fetch(format!("404 Not Found: {}", url)))
        }
    }

    fn page(html: &str) -> PageDocument {
        PageDocument {
            url: "https://example.com/dir/index.html".to_string(),
            title: "Example".to_string(),
            html: html.to_string(),
        }
    }

    #[test]
    fn given_sheet_with_comments_when_splitting_then_returns_one_entry_per_rule() {
        let sheet = "/* header */\n body { color: red; }\n@media print { p { margin: 0 } }\n a::before { content: \"}\"; }";
        let rules = css_rules(sheet);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], "body{color:red}");
        assert!(rules[1].starts_with("@media print"));
        assert!(rules[1].contains("margin:0"));
        assert!(rules[2].starts_with("a:before") || rules[2].starts_with("a::before"));
        assert!(rules[2].contains("\"}\""));
    }

    #[test]
    fn given_unquoted_url_with_semicolon_when_splitting_then_rule_stays_whole() {
        let rules = css_rules("@import url(a;b.css);\nbody{color:red}");
        assert_eq!(rules.len(), 2);
        assert!(rules[0].starts_with("@import"));
        assert!(rules[0].contains("a;b.css"));
        assert_eq!(rules[1], "body{color:red}");
    }

    #[test]
    fn given_empty_sheet_when_splitting_then_no_rules() {
        assert!(css_rules("  /* only a comment */ ").is_empty());
    }

    #[tokio::test]
    async fn given_page_when_extracting_then_collects_css_js_and_images() {
        let fetcher = MapFetcher::default().with(
            "https://example.com/dir/a.png",
            &[0x89, 0x50, 0x4e, 0x47],
            Some("image/png"),
        );
        let extractor = ResourceExtractor::new(Arc::new(fetcher));
        let html = r#"<html><head><style>body{color:red}</style></head>
            <body><p>Hi</p><img src="a.png" alt="x">
            <script>console.log(1)</script>
            <script src="https://cdn.example.org/lib.js"></script>
            <script></script></body></html>"#;

        let bundle = extractor.extract(&page(html)).await;

        assert!(bundle.html.starts_with("<html>"));
        assert!(bundle.html.contains("<p>Hi</p>"));
        // once as a stylesheet, once as a literal style block
        assert_eq!(bundle.css, vec!["body{color:red}", "body{color:red}"]);
        assert_eq!(bundle.js, vec!["console.log(1)"]);
        assert_eq!(bundle.images.len(), 1);
        let image = &bundle.images[0];
        assert_eq!(image.source_url, "https://example.com/dir/a.png");
        assert_eq!(image.alt_text, "x");
        assert_eq!(image.data_uri, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn given_failing_image_when_extracting_then_image_is_omitted_and_rest_survives() {
        let fetcher = MapFetcher::default().with("https://example.com/ok.gif", b"GIF89a", None);
        let extractor = ResourceExtractor::new(Arc::new(fetcher));
        let html = r#"<html><head><style>p{}</style></head><body>
            <img src="/missing.png" alt="gone"><img src="" alt="empty"><img src="/ok.gif">
            <script>var a = 1;</script></body></html>"#;

        let bundle = extractor.extract(&page(html)).await;

        assert_eq!(bundle.images.len(), 1);
        assert_eq!(bundle.images[0].source_url, "https://example.com/ok.gif");
        assert_eq!(bundle.images[0].alt_text, "");
        assert!(bundle.images[0].data_uri.starts_with("data:image/gif;base64,"));
        assert_eq!(bundle.css.len(), 2);
        assert_eq!(bundle.js, vec!["var a = 1;"]);
        assert!(!bundle.html.is_empty());
    }

    #[tokio::test]
    async fn given_linked_sheets_when_extracting_then_only_same_origin_is_read() {
        let fetcher = Arc::new(
            MapFetcher::default()
                .with("https://example.com/site.css", b"h1 { color: red }", Some("text/css"))
                .with("https://cdn.other.org/x.css", b"h2 {}", Some("text/css")),
        );
        let extractor = ResourceExtractor::new(fetcher.clone());
        let html = r#"<html><head>
            <link rel="stylesheet" href="/site.css">
            <link rel="stylesheet" href="https://cdn.other.org/x.css">
            <link rel="stylesheet" href="/broken.css">
            <link rel="icon" href="/favicon.ico">
            </head><body></body></html>"#;

        let bundle = extractor.extract(&page(html)).await;

        assert_eq!(bundle.css, vec!["h1{color:red}"]);
        let requested = fetcher.requested.lock().unwrap().clone();
        assert!(!requested.iter().any(|u| u.contains("cdn.other.org")));
    }

    #[tokio::test]
    async fn given_inline_data_image_when_extracting_then_reencoded_without_fetch() {
        let fetcher = Arc::new(MapFetcher::default());
        let extractor = ResourceExtractor::new(fetcher.clone());
        let html = r#"<html><body><img src="data:image/gif;base64,R0lG ODlh" alt="dot"></body></html>"#;

        let bundle = extractor.extract(&page(html)).await;

        assert_eq!(bundle.images[0].data_uri, "data:image/gif;base64,R0lGODlh");
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn given_quoted_svg_data_image_when_extracting_then_payload_is_base64() {
        let extractor = ResourceExtractor::new(Arc::new(MapFetcher::default()));
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
        let html = format!(
            r#"<html><body><img src='data:image/svg+xml;utf8,{}' alt="d"></body></html>"#,
            svg
        );

        let bundle = extractor.extract(&page(&html)).await;

        assert_eq!(bundle.images.len(), 1);
        let data_uri = &bundle.images[0].data_uri;
        assert_eq!(
            data_uri,
            &format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
        );
        assert!(!data_uri.contains('"'));
        assert!(!data_uri.contains('<'));
    }

    #[rstest::rstest]
    #[case("data:,A%20B", Some("data:text/plain;base64,QSBC"))]
    #[case("data:image/png;BASE64,AQ==", Some("data:image/png;base64,AQ=="))]
    #[case("data:text/plain,100%", None)]
    #[case("data:text/plain,%zz", None)]
    #[case("data:image/png;base64", None)]
    fn given_data_uri_when_reencoding_then_normalizes_to_base64(
        #[case] src: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(reencode_data_uri(src).as_deref(), expected);
    }

    #[test]
    fn given_page_when_extracting_raw_then_keeps_links_live() {
        let extractor = ResourceExtractor::new(Arc::new(MapFetcher::default()));
        let html = r#"<html><head><style>p{margin:0}</style>
            <link rel="stylesheet" href="/main.css"></head>
            <body><h1>Title</h1></body></html>"#;

        let raw = extractor.extract_raw(&page(html));

        assert_eq!(
            raw.styles,
            "<style>p{margin:0}</style>\n<link rel=\"stylesheet\" href=\"https://example.com/main.css\">\n"
        );
        assert_eq!(raw.body.trim(), "<h1>Title</h1>");
    }

    #[rstest::rstest]
    #[case("https://e.com/a.PNG", None, "data:image/png;base64,AQ==")]
    #[case("https://e.com/a", Some("image/webp"), "data:image/webp;base64,AQ==")]
    #[case("https://e.com/blob", None, "data:application/octet-stream;base64,AQ==")]
    fn given_resource_when_encoding_then_picks_mime(
        #[case] url: &str,
        #[case] content_type: Option<&str>,
        #[case] expected: &str,
    ) {
        let resource = FetchedResource {
            bytes: vec![1],
            content_type: content_type.map(String::from),
        };
        assert_eq!(to_data_uri(&resource, &Url::parse(url).unwrap()), expected);
    }
}
