//! TOML-based configuration for patlaw
//!
//! This module provides declarative configuration for the server, database,
//! chat provider, search backend and tools via a TOML file (`patlaw.toml`).
//! Secrets never live in the file: each one is referenced by the name of the
//! environment variable that holds it.
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `ConfigManager` for thread-safe access to the current configuration.

use crate::db::SearchProvider;
use crate::llm::Provider;
use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from patlaw.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatlawConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat completion provider used by the retrieval tools
    #[serde(default)]
    pub chat: ChatConfig,

    /// Hybrid search backend
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Upper bound for the `limit` query parameter on list endpoints
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_page_size() -> u32 {
    1000
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_page_size: default_max_page_size(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or ":memory:"
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    #[serde(default)]
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    #[serde(default)]
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/patlaw.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

// ============= Chat Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Environment variable containing the API key
    #[serde(default = "default_chat_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_chat_api_base")]
    pub api_base: String,

    #[serde(default = "default_chat_model")]
    pub model: String,
}

fn default_chat_api_key_env() -> String {
    "COHERE_API_KEY".to_string()
}

fn default_chat_api_base() -> String {
    "https://api.cohere.ai/v1".to_string()
}

fn default_chat_model() -> String {
    "command-r-plus".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_chat_api_key_env(),
            api_base: default_chat_api_base(),
            model: default_chat_model(),
        }
    }
}

impl ChatConfig {
    /// Resolve the provider, reading the API key from the environment
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        Ok(Provider::Cohere {
            api_key: resolve_env(&self.api_key_env)?,
            api_base: self.api_base.clone(),
            model: self.model.clone(),
        })
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_weaviate_url")]
    pub url: String,

    /// Environment variable for the Weaviate API key (optional)
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Forward the chat API key to Weaviate's Cohere modules
    #[serde(default = "default_true")]
    pub forward_chat_key: bool,
}

fn default_weaviate_url() -> String {
    "http://localhost:8088".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_weaviate_url(),
            api_key_env: None,
            forward_chat_key: true,
        }
    }
}

impl SearchConfig {
    /// Resolve the search provider. The chat key is only forwarded when set.
    pub fn provider(&self, chat: &ChatConfig) -> Result<SearchProvider, ConfigError> {
        let api_key = match &self.api_key_env {
            Some(env) => Some(resolve_env(env)?),
            None => None,
        };
        let cohere_api_key = if self.forward_chat_key {
            std::env::var(&chat.api_key_env).ok()
        } else {
            None
        };

        Ok(SearchProvider::Weaviate {
            url: self.url.clone(),
            api_key,
            cohere_api_key,
        })
    }
}

// ============= Tool Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub eplaw: EplawToolConfig,

    #[serde(default)]
    pub patent_claims: PatentClaimsToolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EplawToolConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Collection holding the EPO legal texts
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Results requested per search query
    #[serde(default = "default_result_count")]
    pub search_limit: usize,

    /// Results kept after dedup and ranking
    #[serde(default = "default_result_count")]
    pub top_k: usize,

    /// Property the reranker scores against the user's query
    #[serde(default = "default_rerank_property")]
    pub rerank_property: String,
}

fn default_collection() -> String {
    "EPO_LEGAL_DOCS".to_string()
}

fn default_result_count() -> usize {
    5
}

fn default_rerank_property() -> String {
    "text".to_string()
}

impl Default for EplawToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collection: default_collection(),
            search_limit: default_result_count(),
            top_k: default_result_count(),
            rerank_property: default_rerank_property(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatentClaimsToolConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OAuth2 client-credentials endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Base of the OPS REST services
    #[serde(default = "default_ops_api_base")]
    pub api_base: String,

    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,

    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,
}

fn default_token_url() -> String {
    "https://ops.epo.org/3.2/auth/accesstoken".to_string()
}

fn default_ops_api_base() -> String {
    "https://ops.epo.org/3.2/rest-services".to_string()
}

fn default_client_id_env() -> String {
    "PATENT_CLIENT_EPO_API_KEY".to_string()
}

fn default_client_secret_env() -> String {
    "PATENT_CLIENT_EPO_SECRET".to_string()
}

impl Default for PatentClaimsToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token_url: default_token_url(),
            api_base: default_ops_api_base(),
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

/// Read a non-empty environment variable named by the config
pub fn resolve_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

impl PatlawConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: PatlawConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_page_size must be at least 1".to_string(),
            ));
        }

        match self.server.log_format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "server.log_format must be \"text\" or \"json\", got \"{}\"",
                    other
                )));
            }
        }

        let eplaw = &self.tools.eplaw;
        if eplaw.enabled {
            if eplaw.collection.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "tools.eplaw.collection must not be empty".to_string(),
                ));
            }
            if eplaw.search_limit == 0 || eplaw.top_k == 0 {
                return Err(ConfigError::ValidationError(
                    "tools.eplaw.search_limit and top_k must be at least 1".to_string(),
                ));
            }
            resolve_env(&self.chat.api_key_env)?;
            if let Some(env) = &self.search.api_key_env {
                resolve_env(env)?;
            }
        }

        let claims = &self.tools.patent_claims;
        if claims.enabled {
            resolve_env(&claims.client_id_env)?;
            resolve_env(&claims.client_secret_env)?;
        }

        #[cfg(feature = "turso")]
        {
            if let Some(ref env) = self.database.turso_url_env {
                resolve_env(env)?;
            }
            if let Some(ref env) = self.database.turso_token_env {
                resolve_env(env)?;
            }
        }

        Ok(())
    }

    /// Names of the tools switched on in this config
    pub fn enabled_tools(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.tools.eplaw.enabled {
            names.push(crate::tools::eplaw::TOOL_NAME);
        }
        if self.tools.patent_claims.enabled {
            names.push(crate::tools::patent_claims::TOOL_NAME);
        }
        names
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<PatlawConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = PatlawConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing).
    /// This won't have file watching capabilities.
    pub fn from_config(config: PatlawConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("patlaw.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<PatlawConfig> {
        self.config.load_full()
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = PatlawConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes.
    ///
    /// Only settings read per request (such as `server.max_page_size`) take
    /// effect without a restart; tool clients are built once at startup.
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let file_name = config_path.file_name().map(|n| n.to_os_string());
        let config_arc = Arc::clone(&self.config);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the parent directory so editors that replace the file are caught
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let debounce = Duration::from_millis(500);
            let mut last_reload: Option<std::time::Instant> = None;

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce) {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match PatlawConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: PatlawConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.chat.model, "command-r-plus");
        assert_eq!(config.search.url, "http://localhost:8088");
        assert_eq!(config.tools.eplaw.collection, "EPO_LEGAL_DOCS");
        assert_eq!(config.tools.eplaw.top_k, 5);
        assert_eq!(
            config.tools.patent_claims.token_url,
            "https://ops.epo.org/3.2/auth/accesstoken"
        );
    }

    #[test]
    fn test_tools_can_be_disabled() {
        let config: PatlawConfig = toml::from_str(
            r#"
[tools.eplaw]
enabled = false

[tools.patent_claims]
enabled = false
"#,
        )
        .unwrap();

        assert!(config.enabled_tools().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let config: PatlawConfig = toml::from_str(
            r#"
[chat]
api_key_env = "PATLAW_TEST_SURELY_UNSET_KEY"

[tools.patent_claims]
enabled = false
"#,
        )
        .unwrap();

        match config.validate() {
            Err(ConfigError::MissingEnvVar(name)) => {
                assert_eq!(name, "PATLAW_TEST_SURELY_UNSET_KEY")
            }
            other => panic!("expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let mut config = PatlawConfig::default();
        config.tools.eplaw.enabled = false;
        config.tools.patent_claims.enabled = false;
        config.server.log_format = "xml".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_config_is_readable() {
        let mut config = PatlawConfig::default();
        config.server.port = 9100;
        let manager = ConfigManager::from_config(config);
        assert_eq!(manager.config().server.port, 9100);
    }
}
