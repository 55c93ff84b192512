//! Tool discovery and invocation handlers.

use crate::{
    AppState,
    api::extract::ApiJson,
    auth::AuthUser,
    types::{Result, ToolDefinition, ToolDocument},
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use tracing::info;

/// List the registered tools with their parameter schemas.
#[utoipa::path(
    get,
    path = "/v1/tools",
    responses(
        (status = 200, description = "Registered tools", body = Vec<ToolDefinition>)
    ),
    tag = "tools"
)]
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDefinition>> {
    Json(state.tool_registry.get_tool_definitions())
}

/// Run a tool with the given JSON parameters.
#[utoipa::path(
    post,
    path = "/v1/tools/{name}/invoke",
    params(("name" = String, Path, description = "Tool name")),
    request_body(content = Value, description = "Tool parameters"),
    responses(
        (status = 200, description = "Documents produced by the tool", body = Vec<ToolDocument>),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Missing User-Id header"),
        (status = 404, description = "Tool not found"),
        (status = 502, description = "Upstream service failed")
    ),
    tag = "tools"
)]
pub async fn invoke_tool(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
    ApiJson(params): ApiJson<Value>,
) -> Result<Json<Vec<ToolDocument>>> {
    info!(tool = %name, user_id = %user_id, "invoking tool");
    let documents = state.tool_registry.call(&name, params).await?;
    Ok(Json(documents))
}
