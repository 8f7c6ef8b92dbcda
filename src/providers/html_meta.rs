//! Best-effort preview image resolution from page metadata
//!
//! Issues a single bounded GET per invocation (no crawl, no retries) and
//! walks a fixed priority list of metadata tags, reflecting their prevalence
//! on e-commerce pages.

use crate::core::preview::PreviewResolver;
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

// Strict priority order; the first match wins.
const IMAGE_META_SOURCES: [(&str, &str); 5] = [
    (r#"meta[property="og:image"]"#, "content"),
    (r#"meta[property="og:image:url"]"#, "content"),
    (r#"meta[name="twitter:image"]"#, "content"),
    (r#"meta[itemprop="image"]"#, "content"),
    (r#"link[rel="image_src"]"#, "href"),
];

pub struct HtmlMetaResolver {
    client: reqwest::Client,
}

impl HtmlMetaResolver {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build preview HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PreviewResolver for HtmlMetaResolver {
    #[instrument(name = "PreviewResolve", skip(self), fields(url = %url))]
    async fn resolve(&self, url: &str) -> Option<String> {
        let page_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Skipping preview for unparsable URL");
                return None;
            }
        };

        // Timing out or erroring drops the request, which aborts the
        // in-flight connection.
        let response = match self.client.get(page_url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Preview fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Preview fetch returned non-success status");
            return None;
        }

        // Redirects may have moved us; relative candidates resolve against
        // the page we actually landed on.
        let page_url = response.url().clone();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Failed to read preview response body");
                return None;
            }
        };

        let candidate = extract_image_candidate(&body)?;
        Some(absolutize(&candidate, &page_url))
    }
}

fn extract_image_candidate(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for (selector, attr) in IMAGE_META_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        if let Some(value) = document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attr))
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Resolves a candidate against the origin of the fetched page unless it is
/// already an absolute URL.
fn absolutize(candidate: &str, page_url: &Url) -> String {
    if Url::parse(candidate).is_ok() {
        return candidate.to_string();
    }

    let origin = page_url.origin().ascii_serialization();
    if candidate.starts_with('/') {
        format!("{origin}{candidate}")
    } else {
        format!("{origin}/{candidate}")
    }
}
