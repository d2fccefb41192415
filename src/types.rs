// Error types shared by the clients, the pipeline and the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Server not configured")]
    NotConfigured,

    #[error("{target} failed ({status}): {body}")]
    Upstream {
        target: String,
        status: u16,
        body: String,
    },

    #[error("No asset ID in upload response. Response: {0}")]
    MissingAssetId(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workflow {task_id} ended with status '{status}'")]
    WorkflowFailed { task_id: String, status: String },

    #[error("Workflow {task_id} did not finish after {attempts} status checks")]
    WorkflowTimeout { task_id: String, attempts: u32 },

    #[error("Invalid workflow graph: {0}")]
    InvalidGraph(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn upstream(target: impl Into<String>, status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        AppError::Upstream {
            target: target.into(),
            status: status.as_u16(),
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Input and configuration problems answer with `{error}`; everything that
/// aborted a running pipeline answers with the uniform failure payload.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::InvalidRequest(_) | AppError::NotConfigured => {
                json!({ "error": self.to_string() })
            }
            _ => json!({
                "success": false,
                "isError": true,
                "errorMessage": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_embeds_status_and_body() {
        let err = AppError::upstream("Agent extractor", reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "Agent extractor failed (502): upstream down");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidRequest("No file provided".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotConfigured.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::WorkflowTimeout { task_id: "t".into(), attempts: 60 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_into_response_shapes() {
        let response = AppError::InvalidRequest("No URL provided".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No URL provided");

        let response = AppError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["isError"], true);
        assert_eq!(body["errorMessage"], "Internal error: boom");
    }
}
