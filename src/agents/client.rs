//! Agent Client
//!
//! Thin wrapper over the hosted inference endpoint. One call per request,
//! no retries: a failed call aborts whatever pipeline issued it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::types::{AppError, AppResult};

pub const INFERENCE_PATH: &str = "/v3/inference/chat/";

/// Field names that may carry an agent's answer, in preference order
const RESPONSE_FIELDS: [&str; 2] = ["response", "message"];

/// Opaque handle to an uploaded asset (or a URL standing in for one)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetReference(String);

impl AssetReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a chat-style inference call
#[derive(Debug, Clone, Serialize)]
pub struct AgentCallRequest {
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetReference>,
}

impl AgentCallRequest {
    pub fn new(
        agent_id: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            agent_id: agent_id.into(),
            session_id: session_id.into(),
            message: message.into(),
            assets: Vec::new(),
        }
    }

    pub fn with_assets(mut self, assets: Vec<AssetReference>) -> Self {
        self.assets = assets;
        self
    }
}

/// Decoded agent reply
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCallResult {
    /// First non-empty answer field, or empty when the agent sent neither
    pub response_text: String,
    pub raw: Value,
}

impl AgentCallResult {
    pub fn from_raw(raw: Value) -> Self {
        let response_text = RESPONSE_FIELDS
            .iter()
            .filter_map(|field| raw.get(*field).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
            .to_string();

        Self { response_text, raw }
    }

    pub fn text(&self) -> &str {
        &self.response_text
    }
}

/// Anything that can answer an agent call
#[async_trait]
pub trait AgentApi: Send + Sync {
    async fn call_agent(&self, request: &AgentCallRequest) -> AppResult<AgentCallResult>;
}

/// HTTP client for the inference platform
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    /// Share an existing connection pool
    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, INFERENCE_PATH)
    }
}

#[async_trait]
impl AgentApi for AgentClient {
    async fn call_agent(&self, request: &AgentCallRequest) -> AppResult<AgentCallResult> {
        info!(
            agent_id = %request.agent_id,
            session_id = %request.session_id,
            message_len = request.message.len(),
            assets = request.assets.len(),
            "Calling agent"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(AppError::upstream(
                format!("Agent {}", request.agent_id),
                status,
                error_text,
            ));
        }

        let raw: Value = response.json().await?;
        let result = AgentCallResult::from_raw(raw);
        debug!(
            agent_id = %request.agent_id,
            response_len = result.response_text.len(),
            "Agent replied"
        );

        Ok(result)
    }
}
