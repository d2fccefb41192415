//! Workflow Mode
//!
//! The URL pipeline expressed as a task graph and executed by the remote
//! workflow engine instead of step by step:
//!
//! ```text
//! input_router → content_extractor → error_check ─┬─► error_displayer
//!                                                  └─► content_analyzer
//!                                                        │
//!                                     note_generator ◄───┴───► question_generator
//!                                              └──► package_formatter ◄──┘
//! ```
//!
//! The graph is submitted once and its status polled until it settles.

pub mod client;
pub mod graph;
pub mod poller;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

pub use client::{TaskStatusResponse, WorkflowApi, WorkflowClient, WorkflowStatus};
pub use graph::{MessageInput, TaskKind, WorkflowGraphBuilder, WorkflowTask, WorkflowTaskGraph};
pub use poller::{poll_status, PollPolicy};

use crate::agents::source::url_router_message;
use crate::agents::{AgentCallResult, AssetReference};
use crate::agents::pipeline::{ERROR_FALLBACK_MESSAGE, NOTES_FALLBACK, QUESTIONS_FALLBACK};
use crate::config::AgentConfig;
use crate::types::AppResult;
use crate::utils::{clean_markdown_response, split_study_package};

pub const FLOW_NAME: &str = "study-package";

pub const INPUT_ROUTER: &str = "input_router";
pub const CONTENT_EXTRACTOR: &str = "content_extractor";
pub const ERROR_CHECK: &str = "error_check";
pub const ERROR_DISPLAYER: &str = "error_displayer";
pub const CONTENT_ANALYZER: &str = "content_analyzer";
pub const NOTE_GENERATOR: &str = "note_generator";
pub const QUESTION_GENERATOR: &str = "question_generator";
pub const PACKAGE_FORMATTER: &str = "package_formatter";

const ERROR_CONDITION: &str = "The text is empty, reports 'STATUS: Error', starts with 'ERROR:', \
     says the content needs OCR, or says a transcript is unavailable or could not be extracted";

const FORMATTER_TEMPLATE: &str = "Notes:\n{note_generator}\n\nQuestions:\n{question_generator}";

/// Settled result of a workflow run
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    Package {
        notes: String,
        questions: String,
        full_response: String,
    },
    Failure {
        error_message: String,
    },
}

/// The URL pipeline as a task graph
pub fn study_package_graph(
    agents: &AgentConfig,
    user_id: &str,
    session_id: &str,
    url: &str,
) -> AppResult<WorkflowTaskGraph> {
    let from = |task: &str| MessageInput::FromTask {
        from_task: task.to_string(),
    };
    let url_asset = vec![AssetReference::new(url)];

    WorkflowGraphBuilder::new(FLOW_NAME, user_id, session_id)
        .agent(
            INPUT_ROUTER,
            &agents.input_router,
            MessageInput::Literal(url_router_message(url)),
            url_asset.clone(),
            &[],
        )
        .agent(
            CONTENT_EXTRACTOR,
            &agents.content_extractor,
            from(INPUT_ROUTER),
            url_asset,
            &[INPUT_ROUTER],
        )
        .conditional(ERROR_CHECK, CONTENT_EXTRACTOR, ERROR_CONDITION, ERROR_DISPLAYER, CONTENT_ANALYZER)
        .agent(
            ERROR_DISPLAYER,
            &agents.error_displayer,
            from(CONTENT_EXTRACTOR),
            vec![],
            &[CONTENT_EXTRACTOR, ERROR_CHECK],
        )
        .agent(
            CONTENT_ANALYZER,
            &agents.content_analyzer,
            from(CONTENT_EXTRACTOR),
            vec![],
            &[CONTENT_EXTRACTOR, ERROR_CHECK],
        )
        .agent(
            NOTE_GENERATOR,
            &agents.note_generator,
            from(CONTENT_ANALYZER),
            vec![],
            &[CONTENT_ANALYZER],
        )
        .agent(
            QUESTION_GENERATOR,
            &agents.question_generator,
            from(CONTENT_ANALYZER),
            vec![],
            &[CONTENT_ANALYZER],
        )
        .agent(
            PACKAGE_FORMATTER,
            &agents.package_formatter,
            MessageInput::Template {
                template: FORMATTER_TEMPLATE.to_string(),
            },
            vec![],
            &[NOTE_GENERATOR, QUESTION_GENERATOR],
        )
        .build()
}

pub struct StudyWorkflow {
    api: Arc<dyn WorkflowApi>,
    agent_ids: AgentConfig,
    user_id: String,
    policy: PollPolicy,
}

impl StudyWorkflow {
    pub fn new(api: Arc<dyn WorkflowApi>, agent_ids: AgentConfig, user_id: impl Into<String>, policy: PollPolicy) -> Self {
        Self {
            api,
            agent_ids,
            user_id: user_id.into(),
            policy,
        }
    }

    pub async fn submit_workflow(&self, graph: &WorkflowTaskGraph) -> AppResult<String> {
        self.api.submit(graph).await
    }

    pub async fn run(&self, url: &str) -> AppResult<WorkflowOutcome> {
        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, url = %url, "Starting study workflow");

        let graph = study_package_graph(&self.agent_ids, &self.user_id, &session_id, url)?;
        let task_id = self.submit_workflow(&graph).await?;
        let results = poll_status(self.api.as_ref(), &task_id, self.policy).await?;

        let outcome = outcome_from_results(&results);
        if let WorkflowOutcome::Failure { .. } = outcome {
            warn!(task_id = %task_id, "Study workflow took the error branch");
        }
        Ok(outcome)
    }
}

/// Read one task's answer out of the engine results
fn task_output(results: &Value, task: &str) -> Option<String> {
    let text = match results.get(task)? {
        Value::String(text) => text.clone(),
        value @ Value::Object(_) => AgentCallResult::from_raw(value.clone()).response_text,
        _ => return None,
    };
    let text = clean_markdown_response(&text);
    (!text.is_empty()).then_some(text)
}

/// The formatted package wins; generator outputs fill in whatever the
/// formatter did not label.
pub fn outcome_from_results(results: &Value) -> WorkflowOutcome {
    let formatted = task_output(results, PACKAGE_FORMATTER);
    let notes = task_output(results, NOTE_GENERATOR);
    let questions = task_output(results, QUESTION_GENERATOR);

    if formatted.is_none() && notes.is_none() && questions.is_none() {
        let error_message = task_output(results, ERROR_DISPLAYER).unwrap_or_else(|| ERROR_FALLBACK_MESSAGE.to_string());
        return WorkflowOutcome::Failure { error_message };
    }

    let full_response = formatted.unwrap_or_default();
    let (notes, questions) = match split_study_package(&full_response) {
        Some((split_notes, split_questions)) => (split_notes, split_questions),
        None => (
            notes.unwrap_or_else(|| NOTES_FALLBACK.to_string()),
            questions.unwrap_or_else(|| QUESTIONS_FALLBACK.to_string()),
        ),
    };

    WorkflowOutcome::Package {
        notes,
        questions,
        full_response,
    }
}

#[cfg(test)]
mod tests {
    use super::poller::tests::ScriptedWorkflow;
    use super::*;
    use crate::config::Config;
    use crate::types::AppError;
    use serde_json::json;
    use std::time::Duration;

    fn agents() -> AgentConfig {
        Config::for_tests("http://unused").agents
    }

    fn workflow(api: Arc<ScriptedWorkflow>) -> StudyWorkflow {
        let policy = PollPolicy {
            max_attempts: 5,
            interval: Duration::from_millis(1),
        };
        StudyWorkflow::new(api, agents(), "test-user", policy)
    }

    #[test]
    fn test_study_graph_layout() {
        let graph = study_package_graph(&agents(), "test-user", "session-1", "https://example.com/a").unwrap();

        assert_eq!(graph.tasks().len(), 8);
        let router = graph.task(INPUT_ROUTER).unwrap();
        match &router.kind {
            TaskKind::Agent { agent_id, message, assets } => {
                assert_eq!(agent_id, "router");
                assert_eq!(
                    message,
                    &MessageInput::Literal("Prepare study materials from this URL: https://example.com/a".into())
                );
                assert_eq!(assets, &vec![AssetReference::new("https://example.com/a")]);
            }
            other => panic!("router should be an agent task: {other:?}"),
        }

        match &graph.task(ERROR_CHECK).unwrap().kind {
            TaskKind::Conditional { if_true, if_false, .. } => {
                assert_eq!(if_true, ERROR_DISPLAYER);
                assert_eq!(if_false, CONTENT_ANALYZER);
            }
            other => panic!("error_check should be conditional: {other:?}"),
        }

        let formatter = graph.task(PACKAGE_FORMATTER).unwrap();
        assert_eq!(formatter.depends_on, vec![NOTE_GENERATOR, QUESTION_GENERATOR]);
    }

    #[test]
    fn test_outcome_splits_formatted_package() {
        let results = json!({
            "package_formatter": {"response": "```markdown\nNotes:\n- Mitochondria\n\nQuestions:\n1. What is ATP?\n```"},
            "note_generator": "ignored notes",
        });

        assert_eq!(
            outcome_from_results(&results),
            WorkflowOutcome::Package {
                notes: "- Mitochondria".to_string(),
                questions: "1. What is ATP?".to_string(),
                full_response: "Notes:\n- Mitochondria\n\nQuestions:\n1. What is ATP?".to_string(),
            }
        );
    }

    #[test]
    fn test_outcome_falls_back_to_generators() {
        let results = json!({
            "package_formatter": "A study package without labels",
            "note_generator": {"message": "generator notes"},
            "question_generator": "",
        });

        assert_eq!(
            outcome_from_results(&results),
            WorkflowOutcome::Package {
                notes: "generator notes".to_string(),
                questions: QUESTIONS_FALLBACK.to_string(),
                full_response: "A study package without labels".to_string(),
            }
        );
    }

    #[test]
    fn test_outcome_error_branch() {
        let results = json!({
            "content_extractor": "Error - Needs OCR",
            "error_displayer": "This scan has no selectable text.",
        });
        assert_eq!(
            outcome_from_results(&results),
            WorkflowOutcome::Failure {
                error_message: "This scan has no selectable text.".to_string()
            }
        );

        assert_eq!(
            outcome_from_results(&json!({})),
            WorkflowOutcome::Failure {
                error_message: ERROR_FALLBACK_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_run_submits_once_and_polls() {
        let api = Arc::new(ScriptedWorkflow::pending_then(
            2,
            WorkflowStatus::Completed,
            json!({"package_formatter": "Notes: n\nQuestions: q"}),
        ));

        let outcome = workflow(api.clone()).run("https://example.com/a").await.unwrap();

        assert!(matches!(outcome, WorkflowOutcome::Package { ref notes, .. } if notes == "n"));
        assert_eq!(api.fetch_count(), 3);
        let submitted = api.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert!(Uuid::parse_str(submitted[0].session_id()).is_ok());
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let api = Arc::new(ScriptedWorkflow::new(vec![WorkflowStatus::Running], Value::Null));

        let err = workflow(api.clone()).run("https://example.com/a").await.unwrap_err();
        assert!(matches!(err, AppError::WorkflowTimeout { attempts: 5, .. }));
        assert_eq!(api.fetch_count(), 5);
    }
}
