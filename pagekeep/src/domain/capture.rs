// pagekeep/src/domain/capture.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used when a page has no title.
pub const FALLBACK_NAME: &str = "webpage";

/// Maximum length of the derived file stem, before the extension.
pub const MAX_STEM_LEN: usize = 50;

pub const HTML_EXTENSION: &str = ".html";

/// Which extraction path a capture takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    /// CSS rules, inline scripts and images inlined as data URIs
    #[default]
    Rich,
    /// `<style>` blocks, live stylesheet links and raw body markup
    Raw,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Rich => write!(f, "rich"),
            CaptureMode::Raw => write!(f, "raw"),
        }
    }
}

/// Derive the download filename from a page title.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, the result is
/// lowercased and cut to 50 characters, then `.html` is appended.
pub fn derive_filename(title: Option<&str>) -> String {
    let source = match title {
        Some(t) if !t.is_empty() => t,
        _ => FALLBACK_NAME,
    };

    let stem: String = source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    format!("{}{}", stem, HTML_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Hello World"), "hello_world.html")]
    #[case(Some("Rust: The Book!"), "rust__the_book_.html")]
    #[case(Some(""), "webpage.html")]
    #[case(None, "webpage.html")]
    #[case(Some("Ünïcödé"), "_n_c_d_.html")]
    fn given_title_when_deriving_filename_then_sanitizes(
        #[case] title: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(derive_filename(title), expected);
    }

    #[test]
    fn given_long_title_when_deriving_filename_then_truncates_to_fifty() {
        let title = "a".repeat(120);
        let name = derive_filename(Some(&title));
        assert_eq!(name.len(), MAX_STEM_LEN + HTML_EXTENSION.len());
        assert!(name.starts_with(&"a".repeat(50)));
    }

    #[test]
    fn given_arbitrary_titles_when_deriving_filename_then_charset_and_length_hold() {
        let titles = [
            "A & B <C> \"D\" 'E'",
            "日本語のタイトル — with dashes",
            "   leading and trailing   ",
            "MiXeD CaSe 123 !@#$%^&*()",
            "tab\tnew\nline",
        ];
        for title in titles {
            let name = derive_filename(Some(title));
            assert!(name.len() <= 55, "{} too long", name);
            let stem = name.strip_suffix(".html").expect("html extension");
            assert!(stem
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }

    #[test]
    fn given_capture_mode_when_serialized_then_uses_camel_case() {
        assert_eq!(serde_json::to_string(&CaptureMode::Raw).unwrap(), "\"raw\"");
        assert_eq!(CaptureMode::default(), CaptureMode::Rich);
    }
}
