use crate::db::vectorstore::HybridSearch;
use crate::types::{AppError, HybridQuery, Result, ScoredDocument};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

/// Weaviate client speaking the GraphQL `Get` API.
///
/// Hybrid search and reranking both run server-side; the Cohere key is
/// forwarded as `X-Cohere-Api-Key` for the text2vec/reranker modules.
pub struct WeaviateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cohere_api_key: Option<String>,
}

impl WeaviateClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        cohere_api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            cohere_api_key,
        }
    }

    /// Render the GraphQL document for a hybrid query.
    ///
    /// String arguments are emitted as JSON string literals, which GraphQL accepts verbatim.
    pub fn build_graphql(query: &HybridQuery) -> String {
        let literal = |s: &str| Value::String(s.to_string()).to_string();

        let rerank = query
            .rerank
            .as_ref()
            .map(|r| {
                format!(
                    " rerank(property: {}, query: {}) {{ score }}",
                    literal(&r.property),
                    literal(&r.query)
                )
            })
            .unwrap_or_default();

        format!(
            "{{ Get {{ {}(hybrid: {{ query: {} }}, limit: {}) {{ text title url _additional {{ id score{} }} }} }} }}",
            query.collection,
            literal(&query.query),
            query.limit,
            rerank
        )
    }

    /// Map GraphQL hits to documents.
    ///
    /// When `reranked` is set, only the rerank score counts; hits the reranker
    /// did not score stay unscored and rank last. Otherwise the hybrid fusion
    /// score is used.
    fn parse_response(
        collection: &str,
        reranked: bool,
        body: GraphQlResponse,
    ) -> Result<Vec<ScoredDocument>> {
        if let Some(errors) = body.errors
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Upstream(format!(
                "Weaviate query failed: {}",
                messages.join("; ")
            )));
        }

        let objects = body
            .data
            .as_ref()
            .and_then(|d| d.get("Get"))
            .and_then(|g| g.get(collection))
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AppError::Upstream(format!("Weaviate response has no '{}' results", collection))
            })?;

        objects
            .iter()
            .map(|obj| {
                let additional = obj.get("_additional").unwrap_or(&Value::Null);
                let id = additional
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AppError::Upstream("Weaviate object without id".to_string()))?
                    .to_string();

                let rerank_score = additional
                    .get("rerank")
                    .and_then(Value::as_array)
                    .and_then(|r| r.first())
                    .and_then(|r| r.get("score"))
                    .and_then(Value::as_f64);
                // Hybrid score comes back as a string
                let hybrid_score = additional.get("score").and_then(|s| match s {
                    Value::String(s) => s.parse::<f64>().ok(),
                    other => other.as_f64(),
                });

                let field = |name: &str| obj.get(name).and_then(Value::as_str).map(String::from);

                Ok(ScoredDocument {
                    id,
                    text: field("text"),
                    title: field("title"),
                    url: field("url"),
                    score: if reranked { rerank_score } else { hybrid_score },
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[async_trait]
impl HybridSearch for WeaviateClient {
    fn provider_name(&self) -> &'static str {
        "weaviate"
    }

    async fn hybrid_search(&self, query: &HybridQuery) -> Result<Vec<ScoredDocument>> {
        let mut request = self
            .http
            .post(format!("{}/v1/graphql", self.base_url))
            .json(&json!({ "query": Self::build_graphql(query) }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(key) = &self.cohere_api_key {
            request = request.header("X-Cohere-Api-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Weaviate request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Weaviate returned {}: {}",
                status, body
            )));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid Weaviate response: {}", e)))?;

        let mut documents =
            Self::parse_response(&query.collection, query.rerank.is_some(), body)?;
        documents.truncate(query.limit);

        tracing::debug!(
            collection = %query.collection,
            query = %query.query,
            hits = documents.len(),
            "hybrid search complete"
        );

        Ok(documents)
    }
}
