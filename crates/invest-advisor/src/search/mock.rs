//! Static search provider for tests and offline demos

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{SearchOptions, SearchProvider};
use crate::error::{AdvisorError, Result};
use crate::model::SearchHit;

/// Returns the same hits for every query and records the queries
#[derive(Debug, Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    /// Every search fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        if let Some(message) = &self.failure {
            return Err(AdvisorError::Search(message.clone()));
        }

        Ok(options.apply(self.hits.clone()))
    }

    fn name(&self) -> &str {
        "StaticSearch"
    }
}
