//! Mock implementations for testing.
//!
//! Chat and search backends that answer from canned data and record what they
//! were asked, so the retrieval pipeline can be exercised without a network.

use async_trait::async_trait;
use parking_lot::Mutex;
use patlaw::db::HybridSearch;
use patlaw::llm::LLMClient;
use patlaw::types::{AppError, HybridQuery, Result, ScoredDocument};
use std::collections::HashMap;

/// Mock chat client.
///
/// `generate_with_system` answers with a fixed expansion text.
/// `search_queries` looks the message up in a table and falls back to echoing it.
#[derive(Default)]
pub struct MockLLMClient {
    expansion: String,
    search_queries: HashMap<String, Vec<String>>,
    should_fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl MockLLMClient {
    pub fn new(expansion: &str) -> Self {
        Self {
            expansion: expansion.to_string(),
            ..Default::default()
        }
    }

    pub fn with_search_queries(mut self, message: &str, queries: &[&str]) -> Self {
        self.search_queries.insert(
            message.to_string(),
            queries.iter().map(|q| q.to_string()).collect(),
        );
        self
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.should_fail {
            return Err(AppError::Upstream("Mock chat failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.check()?;
        Ok(self.expansion.clone())
    }

    async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.check()?;
        Ok(self.expansion.clone())
    }

    async fn search_queries(&self, message: &str) -> Result<Vec<String>> {
        self.check()?;
        self.prompts.lock().push(message.to_string());
        Ok(self
            .search_queries
            .get(message)
            .cloned()
            .unwrap_or_else(|| vec![message.to_string()]))
    }

    fn model_name(&self) -> &str {
        "mock-chat"
    }
}

/// Mock hybrid search keyed by query text; unknown queries return nothing.
#[derive(Default)]
pub struct MockSearch {
    results: HashMap<String, Vec<ScoredDocument>>,
    pub queries: Mutex<Vec<HybridQuery>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, docs: Vec<ScoredDocument>) -> Self {
        self.results.insert(query.to_string(), docs);
        self
    }
}

#[async_trait]
impl HybridSearch for MockSearch {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn hybrid_search(&self, query: &HybridQuery) -> Result<Vec<ScoredDocument>> {
        self.queries.lock().push(query.clone());
        let mut docs = self.results.get(&query.query).cloned().unwrap_or_default();
        docs.truncate(query.limit);
        Ok(docs)
    }
}

pub fn doc(id: &str, score: f64) -> ScoredDocument {
    ScoredDocument {
        id: id.to_string(),
        text: Some(format!("Passage {}", id)),
        title: Some(format!("Guidelines {}", id)),
        url: Some(format!("https://www.epo.org/en/legal/{}", id)),
        score: Some(score),
    }
}
