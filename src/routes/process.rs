use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::info;

use crate::agents::{SubmittedUrl, UploadedFile};
use crate::models::{AppState, ProcessResponse, ProcessUrlRequest};
use crate::types::{AppError, AppResult};

const FILE_FIELD: &str = "file";
const DEFAULT_FILENAME: &str = "upload.pdf";
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/process-pdf", post(process_pdf))
        .route("/api/process-url", post(process_url))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn process_pdf(State(state): State<AppState>, multipart: Multipart) -> AppResult<Json<ProcessResponse>> {
    let (filename, bytes) = read_file_field(multipart)
        .await?
        .ok_or_else(|| AppError::InvalidRequest("No file provided".to_string()))?;

    if !state.pdf_ready() {
        return Err(AppError::NotConfigured);
    }
    let (assets, blobs) = state.upload_targets()?;

    info!(filename = %filename, size = bytes.len(), "Processing uploaded file");
    let source = UploadedFile::new(bytes, filename, assets, blobs);
    let outcome = state.pipeline()?.run(&source).await?;

    Ok(Json(outcome.into()))
}

async fn process_url(
    State(state): State<AppState>,
    payload: Result<Json<ProcessUrlRequest>, JsonRejection>,
) -> AppResult<Json<ProcessResponse>> {
    let url = payload
        .ok()
        .and_then(|Json(request)| request.url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No URL provided".to_string()))?;

    let pipeline = state.pipeline()?;
    info!(url = %url, "Processing submitted URL");
    let outcome = pipeline.run(&SubmittedUrl::new(url)).await?;

    Ok(Json(outcome.into()))
}

/// First non-empty `file` part of the form, if any
async fn read_file_field(mut multipart: Multipart) -> AppResult<Option<(String, Bytes)>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Invalid form data: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Invalid form data: {}", e)))?;
        if !bytes.is_empty() {
            return Ok(Some((filename, bytes)));
        }
    }
    Ok(None)
}
