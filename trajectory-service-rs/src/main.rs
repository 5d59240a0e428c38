// trajectory-service-rs/src/main.rs
// Trajectory Viewer - REST query API over normalized agent trajectories
// Loads all configured data sources once at startup; read-only afterwards

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use trajectory_service::api::{create_router, START_TIME};
use trajectory_service::loader::TrajectoryLoader;
use trajectory_service::query::TrajectoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let _ = *START_TIME;

    let sources = config_rs::get_data_sources();
    if sources.is_empty() {
        tracing::warn!("TRAJECTORY_DATA_SOURCES is empty; starting with an empty corpus");
    }

    // Synchronous, blocking load at startup. Failed sources are logged by the
    // loader and contribute nothing; the process still starts.
    let loader = TrajectoryLoader::new();
    let corpus = loader.load_many(&sources)?;
    tracing::info!("corpus ready: {} trajectories from {} configured sources", corpus.len(), sources.len());

    let store = Arc::new(TrajectoryStore::new(corpus));
    let app = create_router(store);

    let addr = config_rs::get_bind_address("TRAJECTORY", 8000);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Trajectory service starting on {}", addr);
    println!("Trajectory service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
