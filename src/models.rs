use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agents::{AgentApi, AgentClient, PipelineOutcome, StudyPipeline};
use crate::config::Config;
use crate::storage::{AssetClient, AssetUploader, BlobClient, BlobStore};
use crate::types::{AppError, AppResult};
use crate::workflow::{PollPolicy, StudyWorkflow, WorkflowApi, WorkflowClient, WorkflowOutcome};

/// Shared, read-only handler state. A client is absent when the secret it
/// needs is not configured.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub agents: Option<Arc<dyn AgentApi>>,
    pub assets: Option<Arc<dyn AssetUploader>>,
    pub blobs: Option<Arc<dyn BlobStore>>,
    pub workflows: Option<Arc<dyn WorkflowApi>>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let http = reqwest::Client::new();
        let base_url = config.upstream.api_base_url.clone();

        let agents = config.upstream.api_key.clone().map(|key| {
            Arc::new(AgentClient::with_client(http.clone(), base_url.clone(), key)) as Arc<dyn AgentApi>
        });
        let assets = config.upstream.api_key.clone().map(|key| {
            Arc::new(AssetClient::with_client(http.clone(), base_url.clone(), key)) as Arc<dyn AssetUploader>
        });
        let workflows = config.upstream.api_key.clone().map(|key| {
            Arc::new(WorkflowClient::with_client(http.clone(), config.workflow.base_url.clone(), key))
                as Arc<dyn WorkflowApi>
        });
        let blobs = config.blob.read_write_token.clone().map(|token| {
            Arc::new(BlobClient::with_client(http.clone(), config.blob.base_url.clone(), token)) as Arc<dyn BlobStore>
        });

        Self {
            config,
            agents,
            assets,
            blobs,
            workflows,
        }
    }

    /// Whether uploads can be processed
    pub fn pdf_ready(&self) -> bool {
        self.agents.is_some() && self.assets.is_some() && self.blobs.is_some()
    }

    pub fn pipeline(&self) -> AppResult<StudyPipeline> {
        let agents = self.agents.clone().ok_or(AppError::NotConfigured)?;
        Ok(StudyPipeline::new(
            agents,
            self.config.agents.clone(),
            self.config.upstream.user_id.clone(),
        ))
    }

    pub fn upload_targets(&self) -> AppResult<(Arc<dyn AssetUploader>, Arc<dyn BlobStore>)> {
        match (&self.assets, &self.blobs) {
            (Some(assets), Some(blobs)) => Ok((assets.clone(), blobs.clone())),
            _ => Err(AppError::NotConfigured),
        }
    }

    pub fn study_workflow(&self) -> AppResult<StudyWorkflow> {
        let api = self.workflows.clone().ok_or(AppError::NotConfigured)?;
        Ok(StudyWorkflow::new(
            api,
            self.config.agents.clone(),
            self.config.upstream.user_id.clone(),
            PollPolicy::from(&self.config.workflow),
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body returned by every processing route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProcessResponse {
    fn failure(error_message: String) -> Self {
        Self {
            success: false,
            is_error: true,
            notes: None,
            questions: None,
            full_response: None,
            error_message: Some(error_message),
        }
    }
}

impl From<PipelineOutcome> for ProcessResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Success { notes, questions } => Self {
                success: true,
                is_error: false,
                notes: Some(notes),
                questions: Some(questions),
                full_response: None,
                error_message: None,
            },
            PipelineOutcome::Failure { error_message } => Self::failure(error_message),
        }
    }
}

impl From<WorkflowOutcome> for ProcessResponse {
    fn from(outcome: WorkflowOutcome) -> Self {
        match outcome {
            WorkflowOutcome::Package {
                notes,
                questions,
                full_response,
            } => Self {
                success: true,
                is_error: false,
                notes: Some(notes),
                questions: Some(questions),
                full_response: Some(full_response),
                error_message: None,
            },
            WorkflowOutcome::Failure { error_message } => Self::failure(error_message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub configured: bool,
}
