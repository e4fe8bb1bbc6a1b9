//! Website scraping: fetch pages, strip site chrome, convert to plain text.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument, warn};
use url::Url;

use prelytics_shared::{PrelyticsError, Result, ScrapeConfig};

/// Elements that never carry page content.
const CHROME_TAGS: [&str; 10] = [
    "nav", "header", "footer", "aside", "script", "style", "noscript", "svg", "iframe", "form",
];

/// Fetches company web pages and turns them into prompt-sized text.
#[derive(Debug, Clone)]
pub struct WebsiteScraper {
    client: Client,
    max_chars: usize,
}

impl WebsiteScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PrelyticsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_chars: config.max_chars,
        })
    }

    /// GET `url` and return the body of a successful response.
    pub async fn fetch_html(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| PrelyticsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrelyticsError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| PrelyticsError::Network(format!("{url}: failed to read body: {e}")))
    }

    /// Text of the site root plus `extra_paths`, joined and truncated.
    ///
    /// Pages that fail to load are skipped; an empty string means nothing
    /// could be read.
    #[instrument(skip_all, fields(base = %base))]
    pub async fn scrape(&self, base: &Url, extra_paths: &[&str]) -> String {
        let mut urls = vec![base.clone()];
        for path in extra_paths {
            match base.join(path) {
                Ok(url) => urls.push(url),
                Err(e) => warn!(path, error = %e, "skipping unjoinable path"),
            }
        }

        let mut parts = Vec::new();
        for url in &urls {
            match self.page_text(url).await {
                Ok(text) if !text.is_empty() => parts.push(text),
                Ok(_) => debug!(%url, "page has no text"),
                Err(e) => warn!(%url, error = %e, "page skipped"),
            }
        }

        let joined = parts.join("\n\n");
        debug!(pages = parts.len(), chars = joined.chars().count(), "scrape complete");
        truncate_chars(&joined, self.max_chars).to_string()
    }

    /// Text of the first of `paths` (relative to `base`) that loads.
    pub async fn first_available(&self, base: &Url, paths: &[&str], max_chars: usize) -> Option<String> {
        for path in paths {
            let Ok(url) = base.join(path) else { continue };
            match self.page_text(&url).await {
                Ok(text) if !text.is_empty() => {
                    return Some(truncate_chars(&text, max_chars).to_string());
                }
                Ok(_) => debug!(%url, "page has no text"),
                Err(e) => debug!(%url, error = %e, "page unavailable"),
            }
        }
        None
    }

    async fn page_text(&self, url: &Url) -> Result<String> {
        let html = self.fetch_html(url).await?;
        html_to_text(&html)
    }
}

// ---------------------------------------------------------------------------
// HTML → text
// ---------------------------------------------------------------------------

/// Convert a page to Markdown-flavoured text with site chrome removed.
pub fn html_to_text(html: &str) -> Result<String> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(CHROME_TAGS.to_vec())
        .build();

    let markdown = converter
        .convert(html)
        .map_err(|e| PrelyticsError::parse(format!("htmd conversion failed: {e}")))?;

    Ok(clean_text(&markdown))
}

/// Visible text of a whole document, whitespace-collapsed.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    doc.root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim trailing whitespace on each line and collapse blank-line runs.
fn clean_text(md: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let trimmed: Vec<&str> = md.lines().map(str::trim_end).collect();
    MULTI_BLANK_RE
        .replace_all(trimmed.join("\n").trim(), "\n\n")
        .to_string()
}

/// At most `max` chars of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
