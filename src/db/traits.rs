//! Database abstraction traits
//!
//! This module provides the `DatabaseClient` trait that abstracts over different
//! database backends (in-memory SQLite, file-based SQLite, remote Turso).
//!
//! # Example
//!
//! ```rust,ignore
//! use patlaw::db::{DatabaseClient, DatabaseProvider};
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data.db".into() }.create_client().await?;
//! ```

use crate::types::{Agent, AgentToolMetadata, Result};
use crate::utils::toml_config::DatabaseConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<dyn DatabaseClient>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Resolve the provider from the `[database]` config section.
    ///
    /// Remote Turso wins when both of its env vars resolve to non-empty values.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        #[cfg(feature = "turso")]
        {
            let lookup = |name: &Option<String>| {
                name.as_deref()
                    .and_then(|n| std::env::var(n).ok())
                    .filter(|v| !v.is_empty())
            };
            if let (Some(url), Some(auth_token)) =
                (lookup(&config.turso_url_env), lookup(&config.turso_token_env))
            {
                return DatabaseProvider::Turso { url, auth_token };
            }
        }

        if config.url.is_empty() || config.url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: config.url.clone(),
            }
        }
    }
}

/// Abstract trait for database operations
///
/// Every agent and tool-metadata operation the API exposes goes through here.
/// Lookups return `Ok(None)` for missing rows; handlers turn that into
/// `AppError::NotFound`.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    // ============== Agent Operations ==============

    /// Insert a new agent
    async fn create_agent(&self, agent: &Agent) -> Result<()>;

    /// Insert an agent and its tool metadata rows in one transaction.
    ///
    /// Either every row is persisted or none is.
    async fn create_agent_with_metadata(
        &self,
        agent: &Agent,
        metadata: &[AgentToolMetadata],
    ) -> Result<()>;

    /// Get an agent by ID
    async fn get_agent_by_id(&self, id: &str) -> Result<Option<Agent>>;

    /// List agents ordered by creation time
    async fn list_agents(&self, offset: u32, limit: u32) -> Result<Vec<Agent>>;

    /// Overwrite a stored agent with the given values
    async fn update_agent(&self, agent: &Agent) -> Result<()>;

    /// Delete an agent and its tool metadata. Returns false if nothing was deleted.
    async fn delete_agent(&self, id: &str) -> Result<bool>;

    // ============== Tool Metadata Operations ==============

    /// Insert a tool metadata row
    async fn create_agent_tool_metadata(&self, metadata: &AgentToolMetadata) -> Result<()>;

    /// Get a tool metadata row by ID
    async fn get_agent_tool_metadata_by_id(&self, id: &str) -> Result<Option<AgentToolMetadata>>;

    /// List all tool metadata attached to an agent
    async fn list_agent_tool_metadata(&self, agent_id: &str) -> Result<Vec<AgentToolMetadata>>;

    /// Overwrite a stored tool metadata row
    async fn update_agent_tool_metadata(&self, metadata: &AgentToolMetadata) -> Result<()>;

    /// Delete a tool metadata row. Returns false if nothing was deleted.
    async fn delete_agent_tool_metadata(&self, id: &str) -> Result<bool>;
}
