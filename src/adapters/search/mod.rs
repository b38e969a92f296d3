//! Search provider adapters.

mod mock_search;
mod tavily;

pub use mock_search::MockSearchProvider;
pub use tavily::{TavilyConfig, TavilySearchProvider};
