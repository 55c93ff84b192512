use crate::db::traits::DatabaseClient;
use crate::types::{Agent, AgentToolMetadata, AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row, params};
use tokio::sync::Mutex;

const AGENT_COLUMNS: &str = "id, name, description, preamble, temperature, user_id, model, \
                             deployment, tools, created_at, updated_at";

const TOOL_METADATA_COLUMNS: &str =
    "id, user_id, agent_id, tool_name, artifacts, created_at, updated_at";

pub struct TursoClient {
    db: Database,
    /// In-memory databases live and die with a single connection, so it is kept here
    shared: Option<Connection>,
    /// Serialises writes so a transaction never interleaves with another writer
    writes: Mutex<()>,
}

impl TursoClient {
    /// Connect to a remote Turso database
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::init(db, false).await
    }

    /// Open (or create) a local SQLite file
    pub async fn new_local(path: &str) -> Result<Self> {
        if path == ":memory:" {
            return Self::new_memory().await;
        }

        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!("Failed to create database directory: {}", e))
            })?;
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        Self::init(db, false).await
    }

    /// Ephemeral in-memory database, used by tests and local development
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open memory database: {}", e)))?;

        Self::init(db, true).await
    }

    async fn init(db: Database, share_connection: bool) -> Result<Self> {
        let shared = if share_connection {
            Some(
                db.connect()
                    .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?,
            )
        } else {
            None
        };

        let client = Self {
            db,
            shared,
            writes: Mutex::new(()),
        };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        if let Some(conn) = &self.shared {
            return Ok(conn.clone());
        }

        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        // Agents table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                preamble TEXT,
                temperature REAL NOT NULL,
                user_id TEXT NOT NULL,
                model TEXT NOT NULL,
                deployment TEXT NOT NULL,
                tools TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create agents table: {}", e)))?;

        // Agent tool metadata table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_tool_metadata (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                agent_id TEXT NOT NULL,
                tool_name TEXT NOT NULL,
                artifacts TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (agent_id) REFERENCES agents(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create agent_tool_metadata table: {}", e))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_agent_tool_metadata_agent
             ON agent_tool_metadata(agent_id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;

        Ok(())
    }
}

// ============= Row Mapping =============

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

fn timestamp(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp: {}", millis)))
}

fn row_to_agent(row: &Row) -> Result<Agent> {
    let tools: String = row.get(8).map_err(db_err)?;
    Ok(Agent {
        id: row.get(0).map_err(db_err)?,
        name: row.get(1).map_err(db_err)?,
        description: row.get(2).map_err(db_err)?,
        preamble: row.get(3).map_err(db_err)?,
        temperature: row.get(4).map_err(db_err)?,
        user_id: row.get(5).map_err(db_err)?,
        model: row.get(6).map_err(db_err)?,
        deployment: row.get(7).map_err(db_err)?,
        tools: serde_json::from_str(&tools)
            .map_err(|e| AppError::Database(format!("Corrupt tools column: {}", e)))?,
        created_at: timestamp(row.get(9).map_err(db_err)?)?,
        updated_at: timestamp(row.get(10).map_err(db_err)?)?,
    })
}

fn row_to_tool_metadata(row: &Row) -> Result<AgentToolMetadata> {
    let artifacts: String = row.get(4).map_err(db_err)?;
    Ok(AgentToolMetadata {
        id: row.get(0).map_err(db_err)?,
        user_id: row.get(1).map_err(db_err)?,
        agent_id: row.get(2).map_err(db_err)?,
        tool_name: row.get(3).map_err(db_err)?,
        artifacts: serde_json::from_str(&artifacts)
            .map_err(|e| AppError::Database(format!("Corrupt artifacts column: {}", e)))?,
        created_at: timestamp(row.get(5).map_err(db_err)?)?,
        updated_at: timestamp(row.get(6).map_err(db_err)?)?,
    })
}

fn to_json(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}

async fn insert_agent(conn: &Connection, agent: &Agent) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO agents ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            AGENT_COLUMNS
        ),
        params![
            agent.id.as_str(),
            agent.name.as_str(),
            agent.description.clone(),
            agent.preamble.clone(),
            agent.temperature,
            agent.user_id.as_str(),
            agent.model.as_str(),
            agent.deployment.as_str(),
            to_json(&agent.tools)?,
            agent.created_at.timestamp_millis(),
            agent.updated_at.timestamp_millis(),
        ],
    )
    .await
    .map_err(|e| AppError::Database(format!("Failed to create agent: {}", e)))?;

    Ok(())
}

/// Insert a metadata row only while its agent exists.
///
/// Foreign keys are not enforced, so the existence check is part of the
/// statement itself.
async fn insert_tool_metadata(conn: &Connection, metadata: &AgentToolMetadata) -> Result<()> {
    let inserted = conn
        .execute(
            &format!(
                "INSERT INTO agent_tool_metadata ({})
                 SELECT ?, ?, ?, ?, ?, ?, ?
                 WHERE EXISTS (SELECT 1 FROM agents WHERE id = ?3)",
                TOOL_METADATA_COLUMNS
            ),
            params![
                metadata.id.as_str(),
                metadata.user_id.as_str(),
                metadata.agent_id.as_str(),
                metadata.tool_name.as_str(),
                to_json(&metadata.artifacts)?,
                metadata.created_at.timestamp_millis(),
                metadata.updated_at.timestamp_millis(),
            ],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create agent tool metadata: {}", e)))?;

    if inserted == 0 {
        return Err(AppError::NotFound(format!(
            "Agent with ID {} not found.",
            metadata.agent_id
        )));
    }

    Ok(())
}

#[async_trait]
impl DatabaseClient for TursoClient {
    // ============= Agent Operations =============

    async fn create_agent(&self, agent: &Agent) -> Result<()> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;
        insert_agent(&conn, agent).await
    }

    async fn create_agent_with_metadata(
        &self,
        agent: &Agent,
        metadata: &[AgentToolMetadata],
    ) -> Result<()> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let outcome = async {
            insert_agent(&tx, agent).await?;
            for row in metadata {
                insert_tool_metadata(&tx, row).await?;
            }
            Ok::<(), AppError>(())
        }
        .await;

        match outcome {
            Ok(()) => tx
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Failed to commit agent: {}", e))),
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback of agent creation failed");
                }
                Err(e)
            }
        }
    }

    async fn get_agent_by_id(&self, id: &str) -> Result<Option<Agent>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!("SELECT {} FROM agents WHERE id = ?", AGENT_COLUMNS),
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query agent: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(row_to_agent(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_agents(&self, offset: u32, limit: u32) -> Result<Vec<Agent>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM agents ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?",
                    AGENT_COLUMNS
                ),
                params![limit as i64, offset as i64],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list agents: {}", e)))?;

        let mut agents = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            agents.push(row_to_agent(&row)?);
        }

        Ok(agents)
    }

    async fn update_agent(&self, agent: &Agent) -> Result<()> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;

        conn.execute(
            "UPDATE agents SET name = ?, description = ?, preamble = ?, temperature = ?,
                model = ?, deployment = ?, tools = ?, updated_at = ?
             WHERE id = ?",
            params![
                agent.name.as_str(),
                agent.description.clone(),
                agent.preamble.clone(),
                agent.temperature,
                agent.model.as_str(),
                agent.deployment.as_str(),
                to_json(&agent.tools)?,
                agent.updated_at.timestamp_millis(),
                agent.id.as_str(),
            ],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update agent: {}", e)))?;

        Ok(())
    }

    async fn delete_agent(&self, id: &str) -> Result<bool> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Cascade by hand; foreign key enforcement is off by default in SQLite
        let outcome = async {
            tx.execute("DELETE FROM agent_tool_metadata WHERE agent_id = ?", [id])
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to delete agent tool metadata: {}", e))
                })?;
            tx.execute("DELETE FROM agents WHERE id = ?", [id])
                .await
                .map_err(|e| AppError::Database(format!("Failed to delete agent: {}", e)))
        }
        .await;

        match outcome {
            Ok(affected) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to commit delete: {}", e)))?;
                Ok(affected > 0)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback of agent deletion failed");
                }
                Err(e)
            }
        }
    }

    // ============= Tool Metadata Operations =============

    async fn create_agent_tool_metadata(&self, metadata: &AgentToolMetadata) -> Result<()> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;
        insert_tool_metadata(&conn, metadata).await
    }

    async fn get_agent_tool_metadata_by_id(&self, id: &str) -> Result<Option<AgentToolMetadata>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM agent_tool_metadata WHERE id = ?",
                    TOOL_METADATA_COLUMNS
                ),
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query agent tool metadata: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(row_to_tool_metadata(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_agent_tool_metadata(&self, agent_id: &str) -> Result<Vec<AgentToolMetadata>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM agent_tool_metadata WHERE agent_id = ?
                     ORDER BY created_at ASC, id ASC",
                    TOOL_METADATA_COLUMNS
                ),
                [agent_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to list agent tool metadata: {}", e)))?;

        let mut metadata = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            metadata.push(row_to_tool_metadata(&row)?);
        }

        Ok(metadata)
    }

    async fn update_agent_tool_metadata(&self, metadata: &AgentToolMetadata) -> Result<()> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;

        conn.execute(
            "UPDATE agent_tool_metadata SET tool_name = ?, artifacts = ?, updated_at = ?
             WHERE id = ?",
            params![
                metadata.tool_name.as_str(),
                to_json(&metadata.artifacts)?,
                metadata.updated_at.timestamp_millis(),
                metadata.id.as_str(),
            ],
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update agent tool metadata: {}", e)))?;

        Ok(())
    }

    async fn delete_agent_tool_metadata(&self, id: &str) -> Result<bool> {
        let _guard = self.writes.lock().await;
        let conn = self.connection()?;

        let affected = conn
            .execute("DELETE FROM agent_tool_metadata WHERE id = ?", [id])
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to delete agent tool metadata: {}", e))
            })?;

        Ok(affected > 0)
    }
}
