use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 50;

/// Readable text of one page.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub title: String,
    pub content: String,
}

pub struct PageExtractor {
    client: Client,
    min_content_length: usize,
}

impl PageExtractor {
    pub fn new(timeout: Duration, min_content_length: usize) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            min_content_length,
        })
    }

    /// Fetch `page_url` and reduce it to plain text.
    pub async fn extract(&self, page_url: &str) -> Result<Page> {
        let url = check_url(page_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));

        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch page: HTTP {}", response.status()).into());
        }

        let html = response.text().await?;
        let content = extract_text(&html).unwrap_or_default();
        if content.chars().count() < self.min_content_length {
            tracing::debug!("Extracted content too short ({} chars)", content.len());
            return Err(AppError::Extraction(
                "Page content is too short or empty".to_string(),
            ));
        }

        let title = extract_title(&html).unwrap_or_else(|| url.to_string());
        Ok(Page {
            url: url.to_string(),
            title,
            content,
        })
    }
}

/// Reject pages that cannot be summarized: browser-internal pages, the
/// extension store, and anything that is not http(s).
pub fn check_url(page_url: &str) -> Result<Url> {
    let url = Url::parse(page_url.trim())
        .map_err(|e| AppError::RestrictedPage(format!("{}: {}", page_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::RestrictedPage(page_url.to_string()));
    }
    if url.host_str() == Some("chrome.google.com") && url.path().starts_with("/webstore") {
        return Err(AppError::RestrictedPage(page_url.to_string()));
    }
    Ok(url)
}

/// HTML to a single line of text with whitespace collapsed.
fn extract_text(html: &str) -> Option<String> {
    let text = match html2text::from_read(html.as_bytes(), 80) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!("Failed to convert HTML to text: {}", e);
            return None;
        }
    };
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn extract_title(html: &str) -> Option<String> {
    let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
    let title = title_re.captures(html)?.get(1)?.as_str();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
