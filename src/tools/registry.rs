use crate::db::HybridSearch;
use crate::llm::LLMClient;
use crate::tools::eplaw::EplawTool;
use crate::tools::patent_claims::{EpoOpsClient, PatentClaimsTool};
use crate::types::{AppError, Result, ToolDefinition, ToolDocument};
use crate::utils::toml_config::{ConfigError, PatlawConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn call(&self, args: Value) -> Result<Vec<ToolDocument>>;
}

pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Build the enabled tools from configuration.
    ///
    /// All network clients are created here and handed to the tools, so nothing
    /// is constructed as a side effect of loading a module.
    pub fn from_config(config: &PatlawConfig) -> std::result::Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.server.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {}", e)))?;

        let mut registry = Self::new();

        if config.tools.eplaw.enabled {
            let provider = config.chat.provider()?;
            tracing::info!(
                provider = provider.name(),
                model = provider.model(),
                "eplaw chat provider configured"
            );
            let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client(http.clone()));
            let search: Arc<dyn HybridSearch> = Arc::from(
                config
                    .search
                    .provider(&config.chat)?
                    .create_client(http.clone()),
            );
            registry.register(Arc::new(EplawTool::new(
                llm,
                search,
                config.tools.eplaw.clone(),
            )));
        }

        if config.tools.patent_claims.enabled {
            let client = EpoOpsClient::from_config(http, &config.tools.patent_claims)?;
            registry.register(Arc::new(PatentClaimsTool::new(client)));
        }

        tracing::info!(tools = ?registry.tool_names(), "tool registry ready");
        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub async fn call(&self, name: &str, args: Value) -> Result<Vec<ToolDocument>> {
        if let Some(tool) = self.tools.get(name) {
            tool.call(args).await
        } else {
            Err(AppError::NotFound(format!("Tool not found: {}", name)))
        }
    }

    /// Get a list of all registered tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}
