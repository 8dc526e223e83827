//! Web Search
//!
//! Abstraction over web search backends plus the result caps every
//! backend is held to.

mod exa;
mod mock;

pub use exa::{ExaConfig, ExaSearchClient};
pub use mock::StaticSearch;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::SearchHit;

/// Result limits for one search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of hits
    pub num_results: usize,

    /// Maximum characters of page text per hit
    pub max_characters: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_results: 3,
            max_characters: 2000,
        }
    }
}

impl SearchOptions {
    /// Enforce both caps locally, whatever the backend returned
    pub fn apply(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        hits.into_iter()
            .take(self.num_results)
            .map(|mut hit| {
                hit.text = truncate_chars(&hit.text, self.max_characters);
                hit
            })
            .collect()
    }
}

/// Search provider trait (Strategy pattern)
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query; an empty list means no results
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Truncate to at most `max` characters on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str) -> SearchHit {
        SearchHit {
            title: "t".into(),
            url: "https://example.com".into(),
            text: text.into(),
            published_date: None,
        }
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_caps_applied() {
        let hits = (0..5).map(|_| hit(&"x".repeat(2500))).collect();
        let capped = SearchOptions::default().apply(hits);
        assert_eq!(capped.len(), 3);
        assert!(capped.iter().all(|h| h.text.chars().count() == 2000));
    }
}
