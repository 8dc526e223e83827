//! Web Search Tool
//!
//! Current news, market trends and fund information through the search
//! provider. At most three hits, each capped at 2000 characters.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    tool::ParameterSchema,
    Result as CoreResult,
    Tool, ToolCall, ToolResult, ToolSchema,
};

use crate::model::SearchHit;
use crate::search::{SearchOptions, SearchProvider};

pub(crate) const NAME: &str = "search_the_web";

pub struct WebSearchTool {
    search: Arc<dyn SearchProvider>,
    options: SearchOptions,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            options: SearchOptions::default(),
        }
    }

    fn render(query: &str, hits: &[SearchHit]) -> String {
        let mut out = format!("Search results for \"{}\":\n", query);
        for (i, hit) in hits.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n   URL: {}\n", i + 1, hit.title, hit.url));
            if let Some(date) = &hit.published_date {
                out.push_str(&format!("   Published: {}\n", date));
            }
            out.push_str(&format!("   {}\n", hit.text.trim()));
        }
        out
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Search the internet for up-to-date information. Useful for economic \
                news, market trends, details about mutual funds or the outlook of a specific \
                company. Example queries: 'Indonesia economic outlook 2025', \
                'best performing equity mutual funds last year'."
                .into(),
            parameters: vec![ParameterSchema::required_string("query", "Search query")],
            category: Some("research".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(query) = call.str_arg("query") else {
            return Ok(ToolResult::failure(NAME, "missing required argument: query"));
        };

        tracing::debug!(query, provider = self.search.name(), "Searching the web");

        let hits = match self.search.search(query, &self.options).await {
            Ok(hits) => self.options.apply(hits),
            Err(e) => {
                tracing::warn!(query, "Web search failed: {}", e);
                return Ok(ToolResult::failure(NAME, format!("search failed: {}", e)));
            }
        };

        if hits.is_empty() {
            return Ok(ToolResult::success(NAME, format!("No results found for \"{}\".", query))
                .with_data(serde_json::json!([])));
        }

        Ok(ToolResult::success(NAME, Self::render(query, &hits))
            .with_data(serde_json::to_value(&hits)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::StaticSearch;

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: format!("Article {}", n),
            url: format!("https://news.example/{}", n),
            text: "ü".repeat(2600),
            published_date: None,
        }
    }

    #[tokio::test]
    async fn test_caps_results() {
        let search = Arc::new(StaticSearch::new((0..6).map(hit).collect()));
        let tool = WebSearchTool::new(search.clone());
        let call = ToolCall::new(NAME).with_argument("query", "IHSG outlook");

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);

        let data: Vec<SearchHit> = serde_json::from_value(result.data.unwrap()).unwrap();
        assert_eq!(data.len(), 3);
        assert!(data.iter().all(|h| h.text.chars().count() <= 2000));
        assert_eq!(search.queries(), vec!["IHSG outlook".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_text() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::failing("401 Unauthorized")));
        let call = ToolCall::new(NAME).with_argument("query", "gold");
        let result = tool.execute(&call).await.unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Error: search failed:"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch::new(vec![])));
        let call = ToolCall::new(NAME).with_argument("query", "zzzz");
        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("No results found"));
    }
}
