//! CryptoPanic "rising" feed used as headline context

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use super::traits::HeadlineSource;
use crate::config::HeadlineConfig;
use crate::error::{AdvisorError, Result};

/// Navigation and promo titles scraped feeds tend to include
const BOILERPLATE: &[&str] = &[
    "latest videos",
    "latest crypto news",
    "research",
    "press releases",
    "sponsored",
    "most read",
    "newsletters",
];

const MIN_TITLE_CHARS: usize = 6;
const MAX_TITLE_CHARS: usize = 140;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
}

/// Public CryptoPanic posts endpoint
pub struct CryptoPanicFeed {
    base_url: String,
    max_items: usize,
    http: Client,
}

impl CryptoPanicFeed {
    pub fn new(config: &HeadlineConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdvisorError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_items: config.max_items,
            http,
        })
    }
}

#[async_trait]
impl HeadlineSource for CryptoPanicFeed {
    async fn fetch_titles(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/posts/", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("filter", "rising"), ("public", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("CryptoPanic error: {}", status);
            return Err(AdvisorError::Headlines(format!("status {}", status)));
        }

        let posts: PostsResponse = response.json().await?;
        Ok(posts
            .results
            .into_iter()
            .take(self.max_items * 2)
            .filter_map(|p| p.title)
            .collect())
    }
}

/// Clean raw titles into a bullet list, at most `max_items` long.
///
/// Whitespace is collapsed, boilerplate and out-of-range lengths are skipped.
/// Returns `None` when nothing survives.
pub fn format_headlines<S: AsRef<str>>(titles: &[S], max_items: usize) -> Option<String> {
    let lines: Vec<String> = titles
        .iter()
        .map(|t| t.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .filter(|t| {
            let lower = t.to_lowercase();
            !BOILERPLATE.iter().any(|b| lower.contains(b))
        })
        .filter(|t| (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&t.chars().count()))
        .take(max_items)
        .map(|t| format!("- {}", t))
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}
