//! Hybrid Search Abstraction Layer
//!
//! Retrieval tools talk to the vector database through the [`HybridSearch`]
//! trait, so the ranking pipeline can be exercised without a live server.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              HybridSearch Trait             │
//! │   keyword + vector query, optional rerank   │
//! └─────────────────────────────────────────────┘
//!                      ▲
//!               ┌──────┴──────┐
//!               │  Weaviate   │
//!               │  (GraphQL)  │
//!               └─────────────┘
//! ```

use crate::types::{HybridQuery, Result, ScoredDocument};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for search providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum SearchProvider {
    /// Weaviate server reached over its REST/GraphQL port.
    Weaviate {
        /// Base URL, e.g. `http://localhost:8088`
        url: String,
        /// Weaviate API key, if the instance requires one
        #[serde(default)]
        api_key: Option<String>,
        /// Key forwarded to the server-side Cohere module (embeddings + rerank)
        #[serde(default)]
        cohere_api_key: Option<String>,
    },
}

impl SearchProvider {
    /// Build a search client for this provider
    pub fn create_client(&self, http: reqwest::Client) -> Box<dyn HybridSearch> {
        match self {
            SearchProvider::Weaviate {
                url,
                api_key,
                cohere_api_key,
            } => Box::new(super::weaviate::WeaviateClient::new(
                http,
                url.clone(),
                api_key.clone(),
                cohere_api_key.clone(),
            )),
        }
    }
}

/// Keyword + vector retrieval with optional server-side reranking.
#[async_trait]
pub trait HybridSearch: Send + Sync {
    /// Name of the backend, for logs
    fn provider_name(&self) -> &'static str;

    /// Run one hybrid query. Returns at most `query.limit` documents.
    async fn hybrid_search(&self, query: &HybridQuery) -> Result<Vec<ScoredDocument>>;
}
