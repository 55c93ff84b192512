//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for chat completion providers:
//! - **Cohere**: chat with preamble and search-queries-only mode

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// Tools receive an `Arc<dyn LLMClient>` at construction, so tests can swap in
/// a scripted client without any network access.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with a system preamble
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Ask the model only for the search queries it would run to answer `message`.
    ///
    /// An empty list is a valid answer.
    async fn search_queries(&self, message: &str) -> Result<Vec<String>>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Preamble | Search queries only |
/// |----------|----------|---------------------|
/// | Cohere   | ✅       | ✅                  |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Cohere chat API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Cohere {
    ///     api_key: "co-...".to_string(),
    ///     api_base: "https://api.cohere.ai/v1".to_string(),
    ///     model: "command-r-plus".to_string(),
    /// };
    /// ```
    Cohere {
        api_key: String,
        api_base: String,
        model: String,
    },
}

impl Provider {
    /// Create a client instance for this provider, sharing the given HTTP client
    pub fn create_client(&self, http: reqwest::Client) -> Box<dyn LLMClient> {
        match self {
            Provider::Cohere {
                api_key,
                api_base,
                model,
            } => Box::new(super::cohere::CohereClient::new(
                http,
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Cohere { .. } => "Cohere",
        }
    }

    /// Model identifier this provider is configured with
    pub fn model(&self) -> &str {
        match self {
            Provider::Cohere { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let cohere = Provider::Cohere {
            api_key: "".to_string(),
            api_base: "".to_string(),
            model: "command-r-plus".to_string(),
        };
        assert_eq!(cohere.name(), "Cohere");
        assert_eq!(cohere.model(), "command-r-plus");
    }

    #[test]
    fn test_create_client_keeps_model() {
        let provider = Provider::Cohere {
            api_key: "test".to_string(),
            api_base: "http://localhost:1".to_string(),
            model: "command-r".to_string(),
        };
        let client = provider.create_client(reqwest::Client::new());
        assert_eq!(client.model_name(), "command-r");
    }
}
