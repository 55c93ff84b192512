use crate::AppState;
use crate::api::handlers::{agents, tools};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Routes mounted under `/v1`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/agents/{agent_id}",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route(
            "/agents/{agent_id}/tool-metadata",
            get(agents::list_agent_tool_metadata).post(agents::create_agent_tool_metadata),
        )
        .route(
            "/agents/{agent_id}/tool-metadata/{id}",
            put(agents::update_agent_tool_metadata).delete(agents::delete_agent_tool_metadata),
        )
        .route("/tools", get(tools::list_tools))
        .route("/tools/{name}/invoke", post(tools::invoke_tool))
}
