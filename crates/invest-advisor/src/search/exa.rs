//! Exa search client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SearchOptions, SearchProvider};
use crate::error::{AdvisorError, Result};
use crate::model::SearchHit;

const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Exa client configuration
#[derive(Clone)]
pub struct ExaConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ExaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExaConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ExaConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
        }
    }

    /// Read `EXA_API_KEY` (required) and `EXA_BASE_URL` (optional)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("EXA_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AdvisorError::Config("EXA_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key.trim());
        if let Ok(url) = std::env::var("EXA_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

/// Exa `/search` client returning page text with each hit
pub struct ExaSearchClient {
    client: Client,
    config: ExaConfig,
}

impl ExaSearchClient {
    pub fn new(config: ExaConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AdvisorError::Config("Exa API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn request_body<'a>(query: &'a str, options: &SearchOptions) -> SearchRequest<'a> {
        SearchRequest {
            query,
            search_type: "auto",
            num_results: options.num_results,
            contents: Contents {
                text: TextOptions {
                    max_characters: options.max_characters,
                },
            },
        }
    }
}

#[async_trait]
impl SearchProvider for ExaSearchClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.config.base_url);

        let response = self.client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&Self::request_body(query, options))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Exa search failed {}: {}", status, body);
            return Err(AdvisorError::Search(format!(
                "{}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: SearchResponse = response.json().await?;

        let hits = parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title.unwrap_or_default(),
                url: r.url,
                text: r.text.unwrap_or_default(),
                published_date: r.published_date,
            })
            .collect();

        Ok(options.apply(hits))
    }

    fn name(&self) -> &str {
        "Exa"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'static str,
    num_results: usize,
    contents: Contents,
}

#[derive(Debug, Serialize)]
struct Contents {
    text: TextOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    title: Option<String>,
    url: String,
    text: Option<String>,
    published_date: Option<String>,
}
