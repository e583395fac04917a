//! Task sources: URL lists, URL files and image extraction from web pages.

use scraper::{Html, Selector};
use std::path::Path;
use url::Url;

use crate::error::{FetchError, Result};
use crate::pipeline::Fetcher;
use crate::types::{DownloadTask, HintMetadata};

/// URL path extensions treated as direct image links.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Parse newline-delimited URLs. Blank lines and `#` comments are skipped and
/// surrounding whitespace is trimmed.
pub fn parse_url_list(text: &str) -> Vec<DownloadTask> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(DownloadTask::new)
        .collect()
}

/// Read a URL list file.
pub async fn read_url_file(path: &Path) -> Result<Vec<DownloadTask>> {
    let text = tokio::fs::read_to_string(path).await?;
    let tasks = parse_url_list(&text);
    tracing::debug!("Read {} URLs from {:?}", tasks.len(), path);
    Ok(tasks)
}

/// Whether the URL path ends with a supported image extension.
pub fn is_direct_image_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(&format!(".{ext}")))
}

/// Extract every `<img>` on a page as a download task.
///
/// `src` is preferred over `data-src`. Relative URLs are resolved against
/// `base_url`, and only http(s) results are kept. `title` and `alt` become
/// hint metadata.
pub fn extract_image_urls(html: &str, base_url: &str) -> Vec<DownloadTask> {
    let Ok(img_selector) = Selector::parse("img") else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();
    let document = Html::parse_document(html);

    let mut tasks = Vec::new();
    for img in document.select(&img_selector) {
        let element = img.value();
        let src = element
            .attr("src")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| element.attr("data-src").map(str::trim))
            .filter(|s| !s.is_empty());
        let Some(src) = src else {
            continue;
        };

        let resolved = match &base {
            Some(base) => base.join(src),
            None => Url::parse(src),
        };
        let Ok(url) = resolved else {
            tracing::trace!("Skipping unparseable image URL: {src}");
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }

        let hints = HintMetadata::from_parts(
            element.attr("title").unwrap_or_default(),
            element.attr("alt").unwrap_or_default(),
            "",
        );
        tasks.push(DownloadTask::with_hints(url.to_string(), hints));
    }
    tasks
}

/// Fetch `page_url` with `fetcher` and extract its images.
pub async fn tasks_from_page(
    fetcher: &dyn Fetcher,
    page_url: &str,
) -> std::result::Result<Vec<DownloadTask>, FetchError> {
    let page = fetcher.fetch_once(page_url).await?;
    let html = String::from_utf8_lossy(&page.bytes);
    let tasks = extract_image_urls(&html, page_url);
    tracing::info!("Found {} images on {}", tasks.len(), page_url);
    Ok(tasks)
}
