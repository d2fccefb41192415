use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::models::{AppState, ProcessResponse, ProcessUrlRequest};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/process-url/workflow", post(process_url_workflow))
        .with_state(state)
}

/// URL processing through the workflow engine
async fn process_url_workflow(
    State(state): State<AppState>,
    payload: Result<Json<ProcessUrlRequest>, JsonRejection>,
) -> AppResult<Json<ProcessResponse>> {
    let url = payload
        .ok()
        .and_then(|Json(request)| request.url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No URL provided".to_string()))?;

    let workflow = state.study_workflow()?;
    info!(url = %url, "Processing URL through workflow");
    let outcome = workflow.run(&url).await?;

    Ok(Json(outcome.into()))
}
