//! Mock search provider for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ports::{SearchError, SearchProvider, SearchResult};

/// Scripted mock search provider.
///
/// Returns a fixed result set (or a configured failure) and records every
/// query for verification.
#[derive(Clone, Default)]
pub struct MockSearchProvider {
    results: Arc<Mutex<Vec<SearchResult>>>,
    failure: Arc<Mutex<Option<SearchError>>>,
    calls: Arc<Mutex<Vec<(String, u8)>>>,
}

impl MockSearchProvider {
    /// Creates a mock that returns no results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the results every search returns.
    pub fn with_results(self, results: Vec<SearchResult>) -> Self {
        *self.results.lock().unwrap() = results;
        self
    }

    /// Makes every search fail with the given error.
    pub fn with_failure(self, error: SearchError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    /// Returns the recorded (query, max_results) pairs.
    pub fn calls(&self) -> Vec<(String, u8)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(
        &self,
        query: &str,
        max_results: u8,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}
