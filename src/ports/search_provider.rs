//! Search Provider Port - Interface for the web-search tool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port for executing web searches on behalf of the model.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs a search and returns at most `max_results` ranked results.
    async fn search(&self, query: &str, max_results: u8)
        -> Result<Vec<SearchResult>, SearchError>;
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Short excerpt of the page content.
    pub snippet: String,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Error from the search provider.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("authentication with the search provider failed")]
    AuthenticationFailed,

    #[error("search provider rate limited the request")]
    RateLimited,

    #[error("search request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    #[error("network error calling search provider: {0}")]
    Network(String),

    #[error("search provider error: {0}")]
    Provider(String),

    #[error("malformed search response: {0}")]
    Parse(String),
}

impl SearchError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
