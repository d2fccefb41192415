//! Static File Serving
//!
//! Serves the built frontend. Unknown paths get `index.html` so client-side
//! routes (`/results`, `/error`) survive a reload.

use std::path::PathBuf;

use axum::{
    http::header,
    response::{Html, IntoResponse},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

const PLACEHOLDER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Study Assistant - API Server</title>
</head>
<body>
    <h1>Study Assistant</h1>
    <p>The API is running but the frontend has not been built.</p>
    <ul>
        <li><code>GET /api/health</code></li>
        <li><code>POST /api/process-pdf</code> (multipart field <code>file</code>)</li>
        <li><code>POST /api/process-url</code> (<code>{"url": "..."}</code>)</li>
        <li><code>POST /api/process-url/workflow</code> (<code>{"url": "..."}</code>)</li>
    </ul>
</body>
</html>"#;

pub fn router(static_dir: &str) -> Router {
    let dir = PathBuf::from(static_dir);
    if !dir.is_dir() {
        warn!(path = %dir.display(), "Static files directory not found, frontend may not be built");
        return Router::new().fallback(serve_placeholder);
    }

    info!(path = %dir.display(), "Serving frontend");
    let index = ServeFile::new(dir.join("index.html"));
    Router::new().fallback_service(
        ServeDir::new(&dir)
            .append_index_html_on_directories(true)
            .fallback(index),
    )
}

async fn serve_placeholder() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(PLACEHOLDER_PAGE),
    )
}
