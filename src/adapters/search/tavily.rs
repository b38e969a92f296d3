//! Tavily search adapter - Implementation of SearchProvider.
//!
//! Calls the Tavily search API and maps its result list to domain results.
//! Entries without a usable url are skipped.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{SearchError, SearchProvider, SearchResult};

/// Configuration for the Tavily adapter.
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.tavily.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl TavilyConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.tavily.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Tavily search API client.
pub struct TavilySearchProvider {
    config: TavilyConfig,
    client: Client,
}

impl TavilySearchProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: TavilyConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url)
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, SearchError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(SearchError::AuthenticationFailed),
            429 => Err(SearchError::RateLimited),
            _ => Err(SearchError::provider(format!(
                "Status {}: {}",
                status, error_body
            ))),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: u8,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let request = TavilyRequest {
            query: query.to_string(),
            max_results,
        };

        let response = self
            .client
            .post(self.search_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    SearchError::network(format!("Connection failed: {}", e))
                } else {
                    SearchError::network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| SearchError::parse(format!("Failed to parse response: {}", e)))?;

        Ok(to_results(body, max_results))
    }
}

/// Maps the provider response to domain results, bounded to `max_results`.
fn to_results(body: TavilyResponse, max_results: u8) -> Vec<SearchResult> {
    body.results
        .into_iter()
        .filter_map(|entry| {
            let url = entry.url.filter(|u| !u.is_empty())?;
            Some(SearchResult {
                title: entry.title.unwrap_or_default(),
                url,
                snippet: entry.content.unwrap_or_default(),
            })
        })
        .take(max_results as usize)
        .collect()
}

// ----- Tavily API Types -----

#[derive(Debug, Serialize)]
struct TavilyRequest {
    query: String,
    max_results: u8,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResultEntry>,
}

#[derive(Debug, Deserialize)]
struct TavilyResultEntry {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}
