//! API Routes
//!
//! - `/api/process-pdf` - Uploaded document to study package
//! - `/api/process-url` - Web page or video URL to study package
//! - `/api/process-url/workflow` - Same, executed by the workflow engine
//! - `/api/health` - Health checks
//! - `/` - Static file serving (frontend)

pub mod health;
pub mod process;
pub mod static_files;
pub mod workflow;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
///
/// API routes take precedence; everything else falls through to the
/// frontend.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);
    let static_dir = state.config.server.static_dir.clone();

    let api_router = Router::new()
        .merge(process::router(state.clone()))
        .merge(workflow::router(state.clone()))
        .merge(health::router(state));

    Router::new()
        .merge(api_router)
        .merge(static_files::router(&static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_api_routes_are_mounted() {
        let state = AppState::from_config(Config::for_tests("http://unused"));
        let response = create_router(state)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let mut config = Config::for_tests("http://unused");
        config.server.cors_allowed_origins = vec!["http://localhost:5173".to_string()];
        let app = create_router(AppState::from_config(config));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/process-url")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }
}
