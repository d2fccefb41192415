//! Status polling
//!
//! One status request per attempt with a fixed pause in between. The first
//! terminal status ends polling; running out of attempts is a timeout.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::{WorkflowApi, WorkflowStatus};
use crate::config::WorkflowConfig;
use crate::types::{AppError, AppResult};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&WorkflowConfig> for PollPolicy {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            interval: Duration::from_millis(config.interval_ms),
        }
    }
}

/// Poll until the workflow completes, fails, or the attempts run out.
///
/// Returns the engine's per-task results on completion.
pub async fn poll_status(api: &dyn WorkflowApi, task_id: &str, policy: PollPolicy) -> AppResult<Value> {
    for attempt in 1..=policy.max_attempts {
        let response = api.fetch_status(task_id).await?;
        debug!(task_id = %task_id, attempt, status = %response.status, "Polled workflow");

        if response.status == WorkflowStatus::Completed {
            info!(task_id = %task_id, attempts = attempt, "Workflow completed");
            return Ok(response.results);
        }
        if response.status.is_terminal() {
            warn!(task_id = %task_id, status = %response.status, "Workflow failed");
            return Err(AppError::WorkflowFailed {
                task_id: task_id.to_string(),
                status: response.status.to_string(),
            });
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!(task_id = %task_id, attempts = policy.max_attempts, "Workflow polling timed out");
    Err(AppError::WorkflowTimeout {
        task_id: task_id.to_string(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::workflow::client::TaskStatusResponse;
    use crate::workflow::graph::WorkflowTaskGraph;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    /// Replays a fixed status sequence, repeating the last entry
    pub(crate) struct ScriptedWorkflow {
        statuses: Vec<WorkflowStatus>,
        results: Value,
        pub fetches: Mutex<u32>,
        pub submitted: Mutex<Vec<WorkflowTaskGraph>>,
    }

    impl ScriptedWorkflow {
        pub fn new(statuses: Vec<WorkflowStatus>, results: Value) -> Self {
            Self {
                statuses,
                results,
                fetches: Mutex::new(0),
                submitted: Mutex::new(Vec::new()),
            }
        }

        pub fn pending_then(pending: usize, last: WorkflowStatus, results: Value) -> Self {
            let mut statuses = vec![WorkflowStatus::Pending; pending];
            statuses.push(last);
            Self::new(statuses, results)
        }

        pub fn fetch_count(&self) -> u32 {
            *self.fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl WorkflowApi for ScriptedWorkflow {
        async fn submit(&self, graph: &WorkflowTaskGraph) -> AppResult<String> {
            self.submitted.lock().unwrap().push(graph.clone());
            Ok("task-1".to_string())
        }

        async fn fetch_status(&self, _task_id: &str) -> AppResult<TaskStatusResponse> {
            let mut fetches = self.fetches.lock().unwrap();
            let index = (*fetches as usize).min(self.statuses.len() - 1);
            *fetches += 1;
            Ok(TaskStatusResponse {
                status: self.statuses[index],
                results: self.results.clone(),
            })
        }
    }

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_completes_on_last_allowed_attempt() {
        let api = ScriptedWorkflow::pending_then(59, WorkflowStatus::Completed, json!({"done": true}));

        let results = assert_ok!(poll_status(&api, "task-1", fast_policy(60)).await);
        assert_eq!(results, json!({"done": true}));
        assert_eq!(api.fetch_count(), 60);
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let api = ScriptedWorkflow::pending_then(60, WorkflowStatus::Completed, Value::Null);

        let err = assert_err!(poll_status(&api, "task-1", fast_policy(60)).await);
        assert!(matches!(err, AppError::WorkflowTimeout { attempts: 60, .. }));
        assert_eq!(api.fetch_count(), 60);
    }

    #[tokio::test]
    async fn test_failure_stops_polling() {
        let api = ScriptedWorkflow::new(
            vec![WorkflowStatus::Running, WorkflowStatus::Failed, WorkflowStatus::Completed],
            Value::Null,
        );

        let err = assert_err!(poll_status(&api, "task-1", fast_policy(60)).await);
        match err {
            AppError::WorkflowFailed { status, .. } => assert_eq!(status, "failed"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let api = ScriptedWorkflow::new(vec![WorkflowStatus::Error], Value::Null);

        let err = assert_err!(poll_status(&api, "task-1", fast_policy(5)).await);
        assert!(matches!(err, AppError::WorkflowFailed { .. }));
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let api = ScriptedWorkflow::new(
            vec![WorkflowStatus::Unknown, WorkflowStatus::Unknown, WorkflowStatus::Completed],
            json!({}),
        );

        assert_ok!(poll_status(&api, "task-1", fast_policy(5)).await);
        assert_eq!(api.fetch_count(), 3);
    }

    #[test]
    fn test_policy_from_config() {
        let config = WorkflowConfig {
            base_url: "http://localhost".to_string(),
            max_attempts: 0,
            interval_ms: 250,
        };
        let policy = PollPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(PollPolicy::default().max_attempts, 60);
    }
}
