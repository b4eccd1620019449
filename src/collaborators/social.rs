//! Social-post source contract and the Twitter recent-search client.

use crate::error::SourceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const TWITTER_BASE_URL: &str = "https://api.x.com";
const MAX_RESULTS: usize = 10;

/// Supplies recent public posts matching a search keyword.
///
/// Rate limiting surfaces as [`SourceError::RateLimited`] so the consuming
/// step can degrade instead of aborting; every other failure is fatal.
#[async_trait]
pub trait SocialSource: Send + Sync {
    /// Fetches recent post texts for the given keyword.
    async fn recent_posts(&self, query: &str) -> Result<Vec<String>, SourceError>;
}

/// Credentials for the Twitter API, passed in at construction.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// Bearer token for the v2 API.
    pub bearer_token: String,
}

/// Twitter v2 recent-search client.
pub struct TwitterSearch {
    http: Client,
    config: TwitterConfig,
    base_url: String,
}

impl TwitterSearch {
    /// Creates a client against the public Twitter API.
    pub fn new(config: TwitterConfig) -> Self {
        Self::with_base_url(config, TWITTER_BASE_URL)
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(config: TwitterConfig, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Post>,
}

#[derive(Deserialize)]
struct Post {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl SocialSource for TwitterSearch {
    async fn recent_posts(&self, query: &str) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/2/tweets/search/recent", self.base_url);
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "text"),
            ])
            .bearer_auth(&self.config.bearer_token)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let search: SearchResponse = response.json().await?;
        Ok(search.data.into_iter().map(|post| post.text).collect())
    }
}
