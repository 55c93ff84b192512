//! # patlaw - Patent Law Agent Server
//!
//! An HTTP service that stores chat-agent configurations and hosts two
//! retrieval tools for European patent law work:
//!
//! - **`eplaw`**: answers a legal question with passages from the EPO legal
//!   corpus (query expansion with a chat model, hybrid search with rerank,
//!   dedup and top-k)
//! - **`patent_claims`**: fetches the English claims of a published patent
//!   from the EPO Open Patent Services
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use patlaw::{AppState, ConfigManager, ToolRegistry, build_app};
//! use patlaw::db::DatabaseProvider;
//! use std::sync::Arc;
//!
//! let config_manager = Arc::new(ConfigManager::new("patlaw.toml")?);
//! let config = config_manager.config();
//!
//! let state = AppState {
//!     db: DatabaseProvider::from_config(&config.database).create_client().await?,
//!     tool_registry: Arc::new(ToolRegistry::from_config(&config)?),
//!     config_manager,
//! };
//!
//! let app = build_app(state);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-db` | Local SQLite database via libsql (default) |
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - `User-Id` caller extraction
//! - [`db`] - Agent persistence (libsql) and hybrid search (Weaviate)
//! - [`llm`] - Chat completion clients
//! - [`tools`] - Retrieval tools and registry
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]

/// HTTP API handlers and routes.
pub mod api;
/// Caller identification.
pub mod auth;
/// Database and search clients.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval tools (EP law search, patent claims).
pub mod tools;
/// Core types (records, requests, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use db::{DatabaseClient, DatabaseProvider};
pub use llm::{LLMClient, Provider};
pub use tools::registry::{Tool, ToolRegistry};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, PatlawConfig};

use axum::{Json, Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Largest request body accepted, in bytes
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Agent and tool metadata storage
    pub db: Arc<dyn DatabaseClient>,
    /// Tools available to agents and to `/v1/tools`
    pub tool_registry: Arc<ToolRegistry>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full application router with middleware.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/v1", api::routes::create_router());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { Json(api::ApiDoc::openapi()) }),
    );

    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
