//! Agent and tool metadata handlers.
//!
//! Each handler validates its payload, performs one persistence call and
//! returns the resulting record. Deletes answer with an empty `{}` object.

use crate::{
    AppState,
    api::extract::{ApiJson, ApiQuery},
    auth::AuthUser,
    types::{
        Agent, AgentToolMetadata, AppError, CreateAgent, CreateAgentToolMetadata, DeleteAgent,
        DeleteAgentToolMetadata, Result, UpdateAgent, UpdateAgentToolMetadata,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

const MIN_TEMPERATURE: f64 = 0.0;
const MAX_TEMPERATURE: f64 = 5.0;

/// Pagination for list endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAgentsQuery {
    /// Number of agents to skip
    #[serde(default)]
    pub offset: u32,
    /// Maximum number of agents to return (capped by `server.max_page_size`)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// Stored timestamps have millisecond precision; match it so responses equal reads.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_temperature(temperature: f64) -> Result<()> {
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(AppError::InvalidInput(format!(
            "temperature must be between {} and {}, got {}",
            MIN_TEMPERATURE, MAX_TEMPERATURE, temperature
        )));
    }
    Ok(())
}

fn validate_tools<'a>(state: &AppState, tools: impl IntoIterator<Item = &'a String>) -> Result<()> {
    for tool in tools {
        if !state.tool_registry.has_tool(tool) {
            return Err(AppError::InvalidInput(format!(
                "Tool '{}' not found. Available tools: {:?}",
                tool,
                state.tool_registry.tool_names()
            )));
        }
    }
    Ok(())
}

async fn load_agent(state: &AppState, agent_id: &str) -> Result<Agent> {
    state
        .db
        .get_agent_by_id(agent_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Agent with ID {} not found.", agent_id)))
}

/// Metadata is only visible through the agent it belongs to.
async fn load_tool_metadata(
    state: &AppState,
    agent_id: &str,
    id: &str,
) -> Result<AgentToolMetadata> {
    state
        .db
        .get_agent_tool_metadata_by_id(id)
        .await?
        .filter(|m| m.agent_id == agent_id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Agent tool metadata with ID {} not found for agent {}.",
                id, agent_id
            ))
        })
}

fn ensure_owner(owner: &str, caller: &str, what: &str) -> Result<()> {
    if owner != caller {
        return Err(AppError::Forbidden(format!(
            "Not authorized to modify this {}",
            what
        )));
    }
    Ok(())
}

/// Create an agent, together with any tool metadata in one transaction.
#[utoipa::path(
    post,
    path = "/v1/agents",
    request_body = CreateAgent,
    responses(
        (status = 200, description = "Agent created", body = Agent),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing User-Id header")
    ),
    tag = "agents"
)]
pub async fn create_agent(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateAgent>,
) -> Result<Json<Agent>> {
    require_non_empty("name", &payload.name)?;
    require_non_empty("model", &payload.model)?;
    require_non_empty("deployment", &payload.deployment)?;
    validate_temperature(payload.temperature)?;
    validate_tools(&state, &payload.tools)?;
    validate_tools(&state, payload.tools_metadata.iter().map(|m| &m.tool_name))?;

    let now = now();
    let agent = Agent {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        description: payload.description,
        preamble: payload.preamble,
        temperature: payload.temperature,
        user_id: user_id.clone(),
        model: payload.model,
        deployment: payload.deployment,
        tools: payload.tools,
        created_at: now,
        updated_at: now,
    };

    let metadata: Vec<AgentToolMetadata> = payload
        .tools_metadata
        .into_iter()
        .map(|m| AgentToolMetadata {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            agent_id: agent.id.clone(),
            tool_name: m.tool_name,
            artifacts: m.artifacts,
            created_at: now,
            updated_at: now,
        })
        .collect();

    if metadata.is_empty() {
        state.db.create_agent(&agent).await?;
    } else {
        state.db.create_agent_with_metadata(&agent, &metadata).await?;
    }

    info!(agent_id = %agent.id, user_id = %user_id, metadata = metadata.len(), "agent created");
    Ok(Json(agent))
}

/// List agents, oldest first.
#[utoipa::path(
    get,
    path = "/v1/agents",
    params(ListAgentsQuery),
    responses(
        (status = 200, description = "List of agents", body = Vec<Agent>)
    ),
    tag = "agents"
)]
pub async fn list_agents(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListAgentsQuery>,
) -> Result<Json<Vec<Agent>>> {
    let max = state.config_manager.config().server.max_page_size;
    let agents = state
        .db
        .list_agents(query.offset, query.limit.min(max))
        .await?;
    Ok(Json(agents))
}

#[utoipa::path(
    get,
    path = "/v1/agents/{agent_id}",
    params(("agent_id" = String, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Agent details", body = Agent),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>> {
    Ok(Json(load_agent(&state, &agent_id).await?))
}

/// Apply a partial update; only supplied fields are validated and changed.
#[utoipa::path(
    put,
    path = "/v1/agents/{agent_id}",
    params(("agent_id" = String, Path, description = "Agent ID")),
    request_body = UpdateAgent,
    responses(
        (status = 200, description = "Agent updated", body = Agent),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller does not own the agent"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn update_agent(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(agent_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateAgent>,
) -> Result<Json<Agent>> {
    let mut agent = load_agent(&state, &agent_id).await?;
    ensure_owner(&agent.user_id, &user_id, "agent")?;

    if let Some(name) = payload.name {
        require_non_empty("name", &name)?;
        agent.name = name;
    }
    if let Some(model) = payload.model {
        require_non_empty("model", &model)?;
        agent.model = model;
    }
    if let Some(deployment) = payload.deployment {
        require_non_empty("deployment", &deployment)?;
        agent.deployment = deployment;
    }
    if let Some(temperature) = payload.temperature {
        validate_temperature(temperature)?;
        agent.temperature = temperature;
    }
    if let Some(tools) = payload.tools {
        validate_tools(&state, &tools)?;
        agent.tools = tools;
    }
    if payload.description.is_some() {
        agent.description = payload.description;
    }
    if payload.preamble.is_some() {
        agent.preamble = payload.preamble;
    }
    agent.updated_at = now();

    state.db.update_agent(&agent).await?;
    info!(agent_id = %agent.id, "agent updated");
    Ok(Json(agent))
}

/// Delete an agent; its tool metadata goes with it.
#[utoipa::path(
    delete,
    path = "/v1/agents/{agent_id}",
    params(("agent_id" = String, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Agent deleted", body = DeleteAgent),
        (status = 403, description = "Caller does not own the agent"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(agent_id): Path<String>,
) -> Result<Json<DeleteAgent>> {
    let agent = load_agent(&state, &agent_id).await?;
    ensure_owner(&agent.user_id, &user_id, "agent")?;

    if !state.db.delete_agent(&agent_id).await? {
        return Err(AppError::NotFound(format!(
            "Agent with ID {} not found.",
            agent_id
        )));
    }

    info!(agent_id = %agent_id, "agent deleted");
    Ok(Json(DeleteAgent {}))
}

#[utoipa::path(
    get,
    path = "/v1/agents/{agent_id}/tool-metadata",
    params(("agent_id" = String, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Tool metadata of the agent", body = Vec<AgentToolMetadata>),
        (status = 404, description = "Agent not found")
    ),
    tag = "tool-metadata"
)]
pub async fn list_agent_tool_metadata(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<AgentToolMetadata>>> {
    load_agent(&state, &agent_id).await?;
    let metadata = state.db.list_agent_tool_metadata(&agent_id).await?;
    Ok(Json(metadata))
}

#[utoipa::path(
    post,
    path = "/v1/agents/{agent_id}/tool-metadata",
    params(("agent_id" = String, Path, description = "Agent ID")),
    request_body = CreateAgentToolMetadata,
    responses(
        (status = 200, description = "Tool metadata created", body = AgentToolMetadata),
        (status = 400, description = "Unknown tool"),
        (status = 404, description = "Agent not found")
    ),
    tag = "tool-metadata"
)]
pub async fn create_agent_tool_metadata(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(agent_id): Path<String>,
    ApiJson(payload): ApiJson<CreateAgentToolMetadata>,
) -> Result<Json<AgentToolMetadata>> {
    load_agent(&state, &agent_id).await?;
    validate_tools(&state, [&payload.tool_name])?;

    let now = now();
    let metadata = AgentToolMetadata {
        id: uuid::Uuid::new_v4().to_string(),
        user_id,
        agent_id,
        tool_name: payload.tool_name,
        artifacts: payload.artifacts,
        created_at: now,
        updated_at: now,
    };

    state.db.create_agent_tool_metadata(&metadata).await?;
    info!(metadata_id = %metadata.id, agent_id = %metadata.agent_id, "tool metadata created");
    Ok(Json(metadata))
}

#[utoipa::path(
    put,
    path = "/v1/agents/{agent_id}/tool-metadata/{id}",
    params(
        ("agent_id" = String, Path, description = "Agent ID"),
        ("id" = String, Path, description = "Tool metadata ID")
    ),
    request_body = UpdateAgentToolMetadata,
    responses(
        (status = 200, description = "Tool metadata updated", body = AgentToolMetadata),
        (status = 403, description = "Caller does not own the metadata"),
        (status = 404, description = "Tool metadata not found")
    ),
    tag = "tool-metadata"
)]
pub async fn update_agent_tool_metadata(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((agent_id, id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<UpdateAgentToolMetadata>,
) -> Result<Json<AgentToolMetadata>> {
    let mut metadata = load_tool_metadata(&state, &agent_id, &id).await?;
    ensure_owner(&metadata.user_id, &user_id, "tool metadata")?;

    if let Some(tool_name) = payload.tool_name {
        validate_tools(&state, [&tool_name])?;
        metadata.tool_name = tool_name;
    }
    if let Some(artifacts) = payload.artifacts {
        metadata.artifacts = artifacts;
    }
    metadata.updated_at = now();

    state.db.update_agent_tool_metadata(&metadata).await?;
    Ok(Json(metadata))
}

#[utoipa::path(
    delete,
    path = "/v1/agents/{agent_id}/tool-metadata/{id}",
    params(
        ("agent_id" = String, Path, description = "Agent ID"),
        ("id" = String, Path, description = "Tool metadata ID")
    ),
    responses(
        (status = 200, description = "Tool metadata deleted", body = DeleteAgentToolMetadata),
        (status = 403, description = "Caller does not own the metadata"),
        (status = 404, description = "Tool metadata not found")
    ),
    tag = "tool-metadata"
)]
pub async fn delete_agent_tool_metadata(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((agent_id, id)): Path<(String, String)>,
) -> Result<Json<DeleteAgentToolMetadata>> {
    let metadata = load_tool_metadata(&state, &agent_id, &id).await?;
    ensure_owner(&metadata.user_id, &user_id, "tool metadata")?;

    if !state.db.delete_agent_tool_metadata(&id).await? {
        return Err(AppError::NotFound(format!(
            "Agent tool metadata with ID {} not found.",
            id
        )));
    }

    Ok(Json(DeleteAgentToolMetadata {}))
}
