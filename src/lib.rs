// Oxidized Study - Turns documents and links into study notes and practice questions

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod storage;
pub mod workflow;  // Remote DAG execution of the URL pipeline
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
