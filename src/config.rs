use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub agents: AgentConfig,
    pub blob: BlobConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: String,
}

/// Inference platform endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub user_id: String,
}

/// Opaque ids of the hosted agents making up the study pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub input_router: String,
    pub content_extractor: String,
    pub content_analyzer: String,
    pub note_generator: String,
    pub question_generator: String,
    pub error_displayer: String,
    pub package_formatter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    pub base_url: String,
    pub read_write_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    pub base_url: String,
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("LYZR_API_BASE_URL")
            .unwrap_or_else(|_| "https://agent-prod.studio.lyzr.ai".to_string());

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "frontend/dist".to_string()),
            },
            upstream: UpstreamConfig {
                api_base_url: api_base_url.clone(),
                api_key: non_empty_var("LYZR_API_KEY"),
                user_id: env::var("LYZR_USER_ID")
                    .unwrap_or_else(|_| "study-assistant".to_string()),
            },
            agents: AgentConfig {
                input_router: env::var("AGENT_INPUT_ROUTER")
                    .unwrap_or_else(|_| "694636cf6363be71980e708c".to_string()),
                content_extractor: env::var("AGENT_CONTENT_EXTRACTOR")
                    .unwrap_or_else(|_| "694636fe2be72f04a7d631a9".to_string()),
                content_analyzer: env::var("AGENT_CONTENT_ANALYZER")
                    .unwrap_or_else(|_| "6946372b81c8a74f1ca94db5".to_string()),
                note_generator: env::var("AGENT_NOTE_GENERATOR")
                    .unwrap_or_else(|_| "69463835cf278553868d5d4b".to_string()),
                question_generator: env::var("AGENT_QUESTION_GENERATOR")
                    .unwrap_or_else(|_| "6946390581c8a74f1ca94db6".to_string()),
                error_displayer: env::var("AGENT_ERROR_DISPLAYER")
                    .unwrap_or_else(|_| "694639396363be71980e708d".to_string()),
                package_formatter: env::var("AGENT_PACKAGE_FORMATTER")
                    .unwrap_or_else(|_| "693a59eebc73a1ed4a58e823".to_string()),
            },
            blob: BlobConfig {
                base_url: env::var("BLOB_API_URL")
                    .unwrap_or_else(|_| "https://blob.vercel-storage.com".to_string()),
                read_write_token: non_empty_var("BLOB_READ_WRITE_TOKEN"),
            },
            workflow: WorkflowConfig {
                // The DAG engine is served next to the inference API unless overridden
                base_url: env::var("WORKFLOW_API_URL").unwrap_or(api_base_url),
                max_attempts: env::var("WORKFLOW_MAX_ATTEMPTS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()?,
                interval_ms: env::var("WORKFLOW_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            },
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl Config {
    /// Configuration pointing every upstream at `base_url`, with credentials set
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec![],
                static_dir: "frontend/dist".to_string(),
            },
            upstream: UpstreamConfig {
                api_base_url: base_url.to_string(),
                api_key: Some("test-api-key".to_string()),
                user_id: "test-user".to_string(),
            },
            agents: AgentConfig {
                input_router: "router".to_string(),
                content_extractor: "extractor".to_string(),
                content_analyzer: "analyzer".to_string(),
                note_generator: "notes".to_string(),
                question_generator: "questions".to_string(),
                error_displayer: "error-display".to_string(),
                package_formatter: "formatter".to_string(),
            },
            blob: BlobConfig {
                base_url: base_url.to_string(),
                read_write_token: Some("test-blob-token".to_string()),
            },
            workflow: WorkflowConfig {
                base_url: base_url.to_string(),
                max_attempts: 60,
                interval_ms: 1,
            },
        }
    }
}
