//! Pipeline Orchestrator
//!
//! Runs the fixed agent sequence for one submission:
//!
//! ```text
//! InputRouting → ContentExtraction → [check] → ContentAnalysis → [check]
//!      → NoteGeneration → QuestionGeneration → Done
//!                  │                      │
//!                  └──────► ErrorDisplay ◄┘  (absorbing)
//! ```
//!
//! Each check runs the error classifier over the previous reply. A flagged
//! reply is handed to the error-display agent, whose answer is what the user
//! sees. Upstream failures abort the run.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::classifier::classify;
use super::client::{AgentApi, AgentCallRequest, AgentCallResult, AssetReference};
use super::source::ContentSource;
use crate::config::AgentConfig;
use crate::types::AppResult;
use crate::utils::clean_markdown_response;

pub const ERROR_FALLBACK_MESSAGE: &str =
    "An error occurred while processing your file. Please try uploading a different file.";
pub const NOTES_FALLBACK: &str = "Notes could not be generated";
pub const QUESTIONS_FALLBACK: &str = "Questions could not be generated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InputRouting,
    ContentExtraction,
    ContentAnalysis,
    NoteGeneration,
    QuestionGeneration,
    ErrorDisplay,
}

impl Stage {
    fn agent_id<'a>(&self, agents: &'a AgentConfig) -> &'a str {
        match self {
            Stage::InputRouting => &agents.input_router,
            Stage::ContentExtraction => &agents.content_extractor,
            Stage::ContentAnalysis => &agents.content_analyzer,
            Stage::NoteGeneration => &agents.note_generator,
            Stage::QuestionGeneration => &agents.question_generator,
            Stage::ErrorDisplay => &agents.error_displayer,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::InputRouting => write!(f, "input_routing"),
            Stage::ContentExtraction => write!(f, "content_extraction"),
            Stage::ContentAnalysis => write!(f, "content_analysis"),
            Stage::NoteGeneration => write!(f, "note_generation"),
            Stage::QuestionGeneration => write!(f, "question_generation"),
            Stage::ErrorDisplay => write!(f, "error_display"),
        }
    }
}

/// Result of one submission, consumed once by the HTTP layer
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success { notes: String, questions: String },
    Failure { error_message: String },
}

pub struct StudyPipeline {
    agents: Arc<dyn AgentApi>,
    agent_ids: AgentConfig,
    user_id: String,
}

impl StudyPipeline {
    pub fn new(agents: Arc<dyn AgentApi>, agent_ids: AgentConfig, user_id: impl Into<String>) -> Self {
        Self {
            agents,
            agent_ids,
            user_id: user_id.into(),
        }
    }

    /// Run the whole sequence under a fresh session id
    pub async fn run(&self, source: &dyn ContentSource) -> AppResult<PipelineOutcome> {
        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, source = %source.describe(), "Starting study pipeline");

        let outcome = self.run_session(source, &session_id).await;
        match &outcome {
            Ok(PipelineOutcome::Success { .. }) => info!(session_id = %session_id, "Study pipeline complete"),
            Ok(PipelineOutcome::Failure { .. }) => {
                warn!(session_id = %session_id, "Study pipeline ended with a content error")
            }
            Err(e) => error!(session_id = %session_id, error = %e, "Study pipeline aborted"),
        }
        outcome
    }

    async fn run_session(&self, source: &dyn ContentSource, session_id: &str) -> AppResult<PipelineOutcome> {
        let input = source.prepare().await?;

        let routed = self
            .call(Stage::InputRouting, session_id, input.router_message, input.assets.clone())
            .await?;

        let extracted = self
            .call(Stage::ContentExtraction, session_id, routed.response_text, input.assets)
            .await?;
        if let Some(failure) = self.check(Stage::ContentExtraction, session_id, &extracted).await? {
            return Ok(failure);
        }

        let analyzed = self
            .call(Stage::ContentAnalysis, session_id, extracted.response_text, Vec::new())
            .await?;
        if let Some(failure) = self.check(Stage::ContentAnalysis, session_id, &analyzed).await? {
            return Ok(failure);
        }

        // Both generators read the analysis and do not depend on each other
        let notes = self
            .call(Stage::NoteGeneration, session_id, analyzed.response_text.clone(), Vec::new())
            .await?;
        let questions = self
            .call(Stage::QuestionGeneration, session_id, analyzed.response_text, Vec::new())
            .await?;

        Ok(PipelineOutcome::Success {
            notes: clean_markdown_response(or_fallback(notes.text(), NOTES_FALLBACK)),
            questions: clean_markdown_response(or_fallback(questions.text(), QUESTIONS_FALLBACK)),
        })
    }

    async fn call(
        &self,
        stage: Stage,
        session_id: &str,
        message: String,
        assets: Vec<AssetReference>,
    ) -> AppResult<AgentCallResult> {
        info!(stage = %stage, "Calling agent for stage");
        let request = AgentCallRequest::new(
            stage.agent_id(&self.agent_ids),
            self.user_id.as_str(),
            session_id,
            message,
        )
        .with_assets(assets);

        let result = self.agents.call_agent(&request).await?;
        info!(stage = %stage, response_len = result.response_text.len(), "Stage completed");
        Ok(result)
    }

    /// Route a flagged reply to the error-display agent
    async fn check(
        &self,
        stage: Stage,
        session_id: &str,
        result: &AgentCallResult,
    ) -> AppResult<Option<PipelineOutcome>> {
        let verdict = classify(result.text());
        if !verdict.is_error() {
            return Ok(None);
        }

        warn!(
            stage = %stage,
            verdict = ?verdict,
            preview = %preview(result.text()),
            "Agent reported a content error"
        );
        let explained = self
            .call(Stage::ErrorDisplay, session_id, result.response_text.clone(), Vec::new())
            .await?;

        Ok(Some(PipelineOutcome::Failure {
            error_message: or_fallback(explained.text(), ERROR_FALLBACK_MESSAGE).to_string(),
        }))
    }
}

fn or_fallback<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
