// pagekeep/src/application/templates/offline_page.rs
use crate::domain::resource::{RawBundle, ResourceBundle};
use chrono::Local;
use tracing::instrument;

const RICH_BASE_STYLE: &str = r#"    /* Embedded CSS styles */
    body {
      font-family: Arial, sans-serif;
      line-height: 1.6;
      margin: 0;
      padding: 20px;
      max-width: 1200px;
      margin: 0 auto;
    }
    .offline-banner {
      background-color: #f8f9fa;
      padding: 10px;
      margin-bottom: 20px;
      border-radius: 4px;
      border: 1px solid #ddd;
      font-size: 14px;
    }
    .offline-banner a {
      color: #1a73e8;
    }
    img {
      max-width: 100%;
      height: auto;
    }"#;

const RAW_BASE_STYLE: &str = r#"    body {
      font-family: Arial, sans-serif;
      max-width: 1200px;
      margin: 0 auto;
      padding: 20px;
    }
    .banner {
      background: #f0f0f0;
      padding: 10px;
      margin-bottom: 20px;
      border-radius: 5px;
    }
    img { max-width: 100%; height: auto; }"#;

/// Escape text for HTML text and attribute positions.
///
/// `&` goes first so the entities produced for the other characters are
/// not escaped a second time.
pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Local time in the "saved on" banner.
pub fn saved_on_now() -> String {
    Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Assemble the self-contained document of a rich capture.
pub fn assemble(url: &str, title: &str, resources: &ResourceBundle) -> String {
    assemble_at(url, title, resources, &saved_on_now())
}

#[instrument(skip(resources), level = "debug")]
pub fn assemble_at(url: &str, title: &str, resources: &ResourceBundle, saved_on: &str) -> String {
    let page_title = if title.is_empty() { url } else { title };
    let escaped_url = escape_html(url);

    let images = resources
        .images
        .iter()
        .map(|img| {
            format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_html(&img.data_uri),
                escape_html(&img.alt_text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta http-equiv="X-UA-Compatible" content="IE=edge">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
{base_style}
  </style>

  <!-- Embedded CSS from page -->
  <style>
    {css}
  </style>
</head>
<body>
  <div class="offline-banner">
    This is an offline copy of <a href="{url}">{url}</a> saved on {saved_on}.
  </div>

  <!-- Main content -->
  {html}

  <!-- Embedded JavaScript -->
  <script>
    {js}
  </script>

  {images}

</body>
</html>"#,
        title = escape_html(page_title),
        base_style = RICH_BASE_STYLE,
        css = resources.css.join("\n"),
        url = escaped_url,
        saved_on = saved_on,
        html = resources.html,
        js = resources.js.join("\n"),
        images = images,
    )
}

/// Assemble the lighter document whose stylesheets stay linked.
pub fn assemble_raw(url: &str, title: &str, content: &RawBundle) -> String {
    assemble_raw_at(url, title, content, &saved_on_now())
}

#[instrument(skip(content), level = "debug")]
pub fn assemble_raw_at(url: &str, title: &str, content: &RawBundle, saved_on: &str) -> String {
    let escaped_url = escape_html(url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
{base_style}
  </style>
  {styles}
</head>
<body>
  <div class="banner">
    This is an offline copy of <a href="{url}">{url}</a> saved on {saved_on}.
  </div>
  {body}
</body>
</html>"#,
        title = escape_html(title),
        base_style = RAW_BASE_STYLE,
        styles = content.styles,
        url = escaped_url,
        saved_on = saved_on,
        body = content.body,
    )
}
