use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Agent Types =============

/// A configured chat persona owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub preamble: Option<String>,
    pub temperature: f64,
    pub user_id: String,
    pub model: String,
    pub deployment: String,
    pub tools: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-agent, per-tool opaque configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentToolMetadata {
    pub id: String,
    pub user_id: String,
    pub agent_id: String,
    pub tool_name: String,
    #[schema(value_type = Vec<Object>)]
    pub artifacts: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_temperature() -> f64 {
    0.3
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAgent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preamble: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub model: String,
    pub deployment: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Tool metadata rows created together with the agent
    #[serde(default)]
    pub tools_metadata: Vec<CreateAgentToolMetadata>,
}

/// Partial agent update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAgent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preamble: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAgentToolMetadata {
    pub tool_name: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub artifacts: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAgentToolMetadata {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub artifacts: Option<Vec<serde_json::Value>>,
}

/// Empty acknowledgment returned by agent deletion
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DeleteAgent {}

/// Empty acknowledgment returned by tool metadata deletion
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DeleteAgentToolMetadata {}

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[schema(value_type = Object)]
    pub parameters: serde_json::Value,
}

/// Uniform output of every tool: a list of these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToolDocument {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ToolDocument {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
            url: None,
        }
    }
}

// ============= Search Types =============

/// A document returned by a hybrid search, with its rerank score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Backend-assigned identifier, unique per document
    pub id: String,
    pub text: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<f64>,
}

impl From<ScoredDocument> for ToolDocument {
    fn from(doc: ScoredDocument) -> Self {
        Self {
            text: doc.text.unwrap_or_default(),
            title: doc.title,
            url: doc.url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HybridQuery {
    pub collection: String,
    /// Keyword/vector query string
    pub query: String,
    pub limit: usize,
    /// Optional server-side rerank against a reference text
    pub rerank: Option<Rerank>,
}

#[derive(Debug, Clone)]
pub struct Rerank {
    pub property: String,
    pub query: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamAuth(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let message = match self {
            AppError::Database(msg)
            | AppError::UpstreamAuth(msg)
            | AppError::Upstream(msg)
            | AppError::Auth(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidInput(msg)
            | AppError::Internal(msg) => msg,
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
