use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cohere v1 chat client
pub struct CohereClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    preamble: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    search_queries_only: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    search_queries: Vec<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    text: String,
}

impl CohereClient {
    pub fn new(http: reqwest::Client, api_key: String, api_base: String, model: String) -> Self {
        Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        }
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        let response = self
            .http
            .post(format!("{}/chat", self.api_base))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Cohere request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AppError::UpstreamAuth(format!(
                "Cohere rejected the API key ({})",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Cohere API error {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid Cohere response: {}", e)))
    }
}

#[async_trait]
impl LLMClient for CohereClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .chat(&ChatRequest {
                model: &self.model,
                message: prompt,
                preamble: None,
                search_queries_only: false,
            })
            .await?;
        Ok(response.text)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let response = self
            .chat(&ChatRequest {
                model: &self.model,
                message: prompt,
                preamble: Some(system),
                search_queries_only: false,
            })
            .await?;
        Ok(response.text)
    }

    async fn search_queries(&self, message: &str) -> Result<Vec<String>> {
        let response = self
            .chat(&ChatRequest {
                model: &self.model,
                message,
                preamble: None,
                search_queries_only: true,
            })
            .await?;

        Ok(response
            .search_queries
            .into_iter()
            .map(|q| q.text)
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
