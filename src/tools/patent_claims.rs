use crate::tools::registry::Tool;
use crate::types::{AppError, Result, ToolDocument};
use crate::utils::toml_config::{ConfigError, PatentClaimsToolConfig, resolve_env};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

pub const TOOL_NAME: &str = "patent_claims";

/// Returned in place of claims when the OAuth2 exchange fails
pub const TOKEN_FAILURE: &str = "Error: Failed to obtain access token";

/// Returned in place of claims when the claims request fails
pub const DATA_FAILURE: &str = "Error: Failed to retrieve data";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client for the EPO Open Patent Services REST API
pub struct EpoOpsClient {
    http: reqwest::Client,
    token_url: String,
    api_base: String,
    client_id: String,
    client_secret: String,
}

impl EpoOpsClient {
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        api_base: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            token_url,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    pub fn from_config(
        http: reqwest::Client,
        config: &PatentClaimsToolConfig,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(
            http,
            config.token_url.clone(),
            config.api_base.clone(),
            resolve_env(&config.client_id_env)?,
            resolve_env(&config.client_secret_env)?,
        ))
    }

    /// Exchange the client credentials for a bearer token
    pub async fn access_token(&self) -> Result<String> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("EPO token request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(AppError::UpstreamAuth(format!(
                "EPO token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Invalid EPO token response: {}", e)))?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::UpstreamAuth("EPO token response has no access_token".into()))
    }

    /// Fetch all claims of a publication, in every language
    pub async fn fetch_claims(&self, token: &str, number: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}/published-data/publication/epodoc/{}/claims",
            self.api_base, number
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("EPO claims request failed: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(AppError::Upstream(format!(
                "EPO claims endpoint returned {} for {}",
                response.status(),
                number
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid EPO claims response: {}", e)))?;

        Ok(extract_claims(&body))
    }

    /// Token exchange followed by a claims fetch, keeping English claims only
    pub async fn english_claims(&self, number: &str) -> Result<Vec<Value>> {
        let token = self.access_token().await?;
        let claims = self.fetch_claims(&token, number).await?;
        Ok(filter_english(claims))
    }
}

/// Pull the claims out of an OPS full-text envelope.
///
/// OPS returns a bare object when a publication has a single claims block.
pub fn extract_claims(body: &Value) -> Vec<Value> {
    let claims = body
        .get("ops:world-patent-data")
        .and_then(|v| v.get("ftxt:fulltext-documents"))
        .and_then(|v| v.get("ftxt:fulltext-document"))
        .and_then(|v| v.get("claims"));

    match claims {
        Some(Value::Array(items)) => items.clone(),
        Some(obj @ Value::Object(_)) => vec![obj.clone()],
        _ => Vec::new(),
    }
}

pub fn filter_english(claims: Vec<Value>) -> Vec<Value> {
    claims
        .into_iter()
        .filter(|claim| claim.get("@lang").and_then(Value::as_str) == Some("EN"))
        .collect()
}

fn valid_publication_number(number: &str) -> bool {
    number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.')
}

pub struct PatentClaimsTool {
    client: EpoOpsClient,
}

impl PatentClaimsTool {
    pub fn new(client: EpoOpsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for PatentClaimsTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch the English claims of a published patent from the EPO Open Patent Services"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patent_number": {
                    "type": "string",
                    "description": "Publication number in epodoc format, e.g. EP1000000"
                }
            },
            "required": ["patent_number"]
        })
    }

    async fn call(&self, args: Value) -> Result<Vec<ToolDocument>> {
        let number = args
            .get("patent_number")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AppError::InvalidInput("Missing 'patent_number' parameter".to_string())
            })?;

        if !valid_publication_number(number) {
            return Err(AppError::InvalidInput(format!(
                "Invalid publication number: {}",
                number
            )));
        }

        let token = match self.client.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "EPO token exchange failed");
                return Ok(vec![ToolDocument::text(TOKEN_FAILURE)]);
            }
        };

        let claims = match self.client.fetch_claims(&token, number).await {
            Ok(claims) => filter_english(claims),
            Err(e) => {
                warn!(error = %e, patent_number = number, "EPO claims fetch failed");
                return Ok(vec![ToolDocument::text(DATA_FAILURE)]);
            }
        };

        info!(patent_number = number, claims = claims.len(), "patent claims retrieved");
        let text = serde_json::to_string(&claims)
            .map_err(|e| AppError::Internal(format!("Failed to render claims: {}", e)))?;
        Ok(vec![ToolDocument::text(text)])
    }
}
