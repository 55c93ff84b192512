//! European patent law retrieval.
//!
//! The tool answers a legal question with passages from the EPO legal corpus:
//!
//! 1. the chat model rewrites the question into simpler search-engine prompts
//! 2. each prompt is turned into concrete search queries (search-queries-only mode)
//! 3. each search query runs a hybrid search, reranked against the original question
//! 4. the pooled hits are deduplicated by id, sorted by rerank score and cut to `top_k`

use crate::db::HybridSearch;
use crate::llm::LLMClient;
use crate::tools::registry::Tool;
use crate::types::{AppError, HybridQuery, Rerank, Result, ScoredDocument, ToolDocument};
use crate::utils::toml_config::EplawToolConfig;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const TOOL_NAME: &str = "eplaw";

/// Marker the expansion preamble asks the model to prefix each prompt with
pub const EXPANSION_MARKER: &str = ">>>";

pub const EXPANSION_PREAMBLE: &str = "
Your role is to help user's answer questions about European patent law by generating search engine prompts for the User to search to find legal basis or the appropriate resources from the European Patent Office. You should return only a list of simpler questions. Do not include the original question or answers in your response. Always use the following format:

>>> Search engine prompt
>>> Search engine prompt
";

/// Split a model answer into search prompts.
///
/// Text before the first marker is discarded, fragments are trimmed, empty
/// ones dropped, and the original query is always appended last.
pub fn parse_expansions(text: &str, original: &str) -> Vec<String> {
    let mut prompts: Vec<String> = text
        .split(EXPANSION_MARKER)
        .skip(1)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    prompts.push(original.to_string());
    prompts
}

/// Deduplicate by id (last write wins), sort by descending score, keep `top_k`.
///
/// A duplicate keeps the position of the id's first appearance, so equal
/// scores stay in retrieval order. Missing or NaN scores sort last.
pub fn rank_documents(pool: Vec<ScoredDocument>, top_k: usize) -> Vec<ScoredDocument> {
    let mut unique: Vec<ScoredDocument> = Vec::with_capacity(pool.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for doc in pool {
        match positions.get(&doc.id) {
            Some(&idx) => unique[idx] = doc,
            None => {
                positions.insert(doc.id.clone(), unique.len());
                unique.push(doc);
            }
        }
    }

    let key = |d: &ScoredDocument| d.score.filter(|s| !s.is_nan()).unwrap_or(f64::NEG_INFINITY);
    unique.sort_by(|a, b| key(b).total_cmp(&key(a)));
    unique.truncate(top_k);
    unique
}

pub struct EplawTool {
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn HybridSearch>,
    settings: EplawToolConfig,
}

impl EplawTool {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn HybridSearch>,
        settings: EplawToolConfig,
    ) -> Self {
        Self {
            llm,
            search,
            settings,
        }
    }

    /// Rewrite the question into search prompts; the question itself is always included
    pub async fn expand_query(&self, query: &str) -> Result<Vec<String>> {
        let answer = self
            .llm
            .generate_with_system(EXPANSION_PREAMBLE, query)
            .await?;
        Ok(parse_expansions(&answer, query))
    }

    /// Collect the search queries the model proposes for each prompt, in order
    pub async fn extract_search_queries(&self, prompts: &[String]) -> Result<Vec<String>> {
        let mut queries = Vec::new();
        for prompt in prompts {
            let extracted = self.llm.search_queries(prompt).await?;
            debug!(prompt = %prompt, count = extracted.len(), "search queries extracted");
            queries.extend(extracted);
        }
        Ok(queries)
    }

    /// Run one hybrid search per query and pool every hit
    pub async fn retrieve(
        &self,
        search_queries: &[String],
        original: &str,
    ) -> Result<Vec<ScoredDocument>> {
        let mut pool = Vec::new();
        for search_query in search_queries {
            let hits = self
                .search
                .hybrid_search(&HybridQuery {
                    collection: self.settings.collection.clone(),
                    query: search_query.clone(),
                    limit: self.settings.search_limit,
                    rerank: Some(Rerank {
                        property: self.settings.rerank_property.clone(),
                        query: original.to_string(),
                    }),
                })
                .await?;
            pool.extend(hits);
        }
        Ok(pool)
    }

    /// The full pipeline: expand, extract, retrieve, rank
    pub async fn run(&self, query: &str) -> Result<Vec<ToolDocument>> {
        let prompts = self.expand_query(query).await?;
        let search_queries = self.extract_search_queries(&prompts).await?;
        let pool = self.retrieve(&search_queries, query).await?;
        let pooled = pool.len();
        let ranked = rank_documents(pool, self.settings.top_k);

        info!(
            prompts = prompts.len(),
            search_queries = search_queries.len(),
            pooled,
            returned = ranked.len(),
            backend = self.search.provider_name(),
            "eplaw retrieval complete"
        );

        Ok(ranked.into_iter().map(ToolDocument::from).collect())
    }
}

#[async_trait]
impl Tool for EplawTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search European patent law (EPC, Guidelines, case law) for passages relevant to a legal question"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A question about European patent law"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Value) -> Result<Vec<ToolDocument>> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Missing 'query' parameter".to_string()))?;

        self.run(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc(id: &str, score: Option<f64>) -> ScoredDocument {
        ScoredDocument {
            id: id.to_string(),
            text: Some(format!("text of {}", id)),
            title: None,
            url: None,
            score,
        }
    }

    #[rstest]
    #[case(">>> What is novelty?\n>>> What is prior art?", vec!["What is novelty?", "What is prior art?", "q"])]
    #[case("Sure! Here you go:\n>>> Art. 54 EPC", vec!["Art. 54 EPC", "q"])]
    #[case(">>>  \n>>>\n>>> only one", vec!["only one", "q"])]
    #[case("no marker at all", vec!["q"])]
    #[case("", vec!["q"])]
    fn test_parse_expansions(#[case] answer: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_expansions(answer, "q"), expected);
    }

    #[test]
    fn test_rank_dedups_last_write_wins() {
        let pool = vec![
            doc("a", Some(0.2)),
            doc("b", Some(0.5)),
            ScoredDocument {
                text: Some("newer a".to_string()),
                ..doc("a", Some(0.9))
            },
        ];

        let ranked = rank_documents(pool, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "a");
        assert_eq!(ranked[0].text.as_deref(), Some("newer a"));
        assert_eq!(ranked[1].id, "b");
    }

    #[test]
    fn test_rank_truncates_and_orders() {
        let pool: Vec<ScoredDocument> = (0..12)
            .map(|i| doc(&format!("d{}", i), Some((i % 7) as f64 / 10.0)))
            .collect();

        let ranked = rank_documents(pool, 5);
        assert_eq!(ranked.len(), 5);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_missing_scores_sort_last() {
        let pool = vec![doc("none", None), doc("nan", Some(f64::NAN)), doc("low", Some(-1.0))];
        let ranked = rank_documents(pool, 5);
        assert_eq!(ranked[0].id, "low");
    }

    #[test]
    fn test_rank_ties_keep_retrieval_order() {
        let pool = vec![doc("first", Some(0.5)), doc("second", Some(0.5))];
        let ranked = rank_documents(pool, 5);
        assert_eq!(ranked[0].id, "first");
        assert_eq!(ranked[1].id, "second");
    }
}
