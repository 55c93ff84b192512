//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//! - [`api::extract`](crate::api::extract) - Extractors that reject with `AppError`
//!
//! # API Endpoints
//!
//! ## Agents (`/v1/agents`)
//! - `POST /v1/agents` - Create an agent (optionally with tool metadata)
//! - `GET /v1/agents?offset&limit` - List agents
//! - `GET /v1/agents/{agent_id}` - Get an agent
//! - `PUT /v1/agents/{agent_id}` - Update an agent
//! - `DELETE /v1/agents/{agent_id}` - Delete an agent and its tool metadata
//!
//! ## Tool metadata (`/v1/agents/{agent_id}/tool-metadata`)
//! - `GET` / `POST` on the collection, `PUT` / `DELETE` on `{id}`
//!
//! ## Tools (`/v1/tools`)
//! - `GET /v1/tools` - List registered tools
//! - `POST /v1/tools/{name}/invoke` - Run a tool
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Identification
//!
//! Mutating endpoints require the caller's id in a header:
//! ```text
//! User-Id: <user id>
//! ```
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`. When the
//! `swagger-ui` feature is enabled, interactive documentation is available at
//! `/swagger-ui/`.

/// Extractors that reject with `AppError`.
pub mod extract;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    Agent, AgentToolMetadata, CreateAgent, CreateAgentToolMetadata, DeleteAgent,
    DeleteAgentToolMetadata, ToolDefinition, ToolDocument, UpdateAgent, UpdateAgentToolMetadata,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "patlaw",
        description = "Agent management and patent-law retrieval tools"
    ),
    paths(
        handlers::agents::create_agent,
        handlers::agents::list_agents,
        handlers::agents::get_agent,
        handlers::agents::update_agent,
        handlers::agents::delete_agent,
        handlers::agents::list_agent_tool_metadata,
        handlers::agents::create_agent_tool_metadata,
        handlers::agents::update_agent_tool_metadata,
        handlers::agents::delete_agent_tool_metadata,
        handlers::tools::list_tools,
        handlers::tools::invoke_tool,
    ),
    components(schemas(
        Agent,
        AgentToolMetadata,
        CreateAgent,
        UpdateAgent,
        CreateAgentToolMetadata,
        UpdateAgentToolMetadata,
        DeleteAgent,
        DeleteAgentToolMetadata,
        ToolDefinition,
        ToolDocument,
    )),
    tags(
        (name = "agents", description = "Agent CRUD"),
        (name = "tool-metadata", description = "Per-agent tool configuration"),
        (name = "tools", description = "Retrieval tools")
    )
)]
pub struct ApiDoc;
