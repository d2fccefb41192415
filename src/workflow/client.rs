// Workflow engine client: submit a task graph, then read its status by id

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::graph::WorkflowTaskGraph;
use crate::types::{AppError, AppResult};

pub const RUN_DAG_PATH: &str = "/run-dag/";
pub const TASK_STATUS_PATH: &str = "/task-status/";

/// Lifecycle of a submitted workflow as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Error,
    /// Anything the engine reports that we don't recognise; keep polling
    Unknown,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Running => "running",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Error => "error",
            WorkflowStatus::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Error
        )
    }
}

impl From<String> for WorkflowStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => WorkflowStatus::Pending,
            "running" | "in_progress" => WorkflowStatus::Running,
            "completed" | "success" => WorkflowStatus::Completed,
            "failed" => WorkflowStatus::Failed,
            "error" => WorkflowStatus::Error,
            _ => WorkflowStatus::Unknown,
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusResponse {
    pub status: WorkflowStatus,
    /// Per-task outputs keyed by task name, present once completed
    #[serde(default)]
    pub results: Value,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: Option<String>,
}

#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Returns the engine's task id for the submitted graph
    async fn submit(&self, graph: &WorkflowTaskGraph) -> AppResult<String>;

    async fn fetch_status(&self, task_id: &str) -> AppResult<TaskStatusResponse>;
}

#[derive(Clone)]
pub struct WorkflowClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WorkflowClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WorkflowApi for WorkflowClient {
    async fn submit(&self, graph: &WorkflowTaskGraph) -> AppResult<String> {
        info!(
            flow = %graph.flow_name(),
            session_id = %graph.session_id(),
            tasks = graph.tasks().len(),
            "Submitting workflow"
        );

        let response = self
            .client
            .post(format!("{}{}", self.base_url, RUN_DAG_PATH))
            .header("x-api-key", &self.api_key)
            .json(graph)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::upstream("Workflow submission", status, text));
        }

        let body: SubmitResponse = serde_json::from_str(&text)?;
        let task_id = body
            .task_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Internal(format!("Workflow engine returned no task id: {}", text)))?;

        info!(task_id = %task_id, "Workflow submitted");
        Ok(task_id)
    }

    async fn fetch_status(&self, task_id: &str) -> AppResult<TaskStatusResponse> {
        let response = self
            .client
            .get(format!("{}{}{}", self.base_url, TASK_STATUS_PATH, task_id))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::upstream("Workflow status", status, text));
        }

        let body: TaskStatusResponse = serde_json::from_str(&text)?;
        debug!(task_id = %task_id, status = %body.status, "Workflow status");
        Ok(body)
    }
}
