use tokio::net::TcpListener;
use tracing::{info, warn};
use oxidized_study::{config::Config, create_router, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config);
    if state.agents.is_none() {
        warn!("LYZR_API_KEY is not set, processing routes will answer 'Server not configured'");
    } else if !state.pdf_ready() {
        warn!("BLOB_READ_WRITE_TOKEN is not set, PDF uploads are disabled");
    }

    let app = create_router(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
