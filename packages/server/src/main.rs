use std::path::PathBuf;
use std::sync::Arc;

use common::storage::filesystem::FilesystemArtifactStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::services::ai::AiClient;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;

    if config.seed.demo_users {
        server::seed::seed_demo_users(&db).await?;
    }

    let store = FilesystemArtifactStore::new(
        PathBuf::from(&config.storage.root_dir),
        config.storage.max_artifact_size,
    )
    .await?;

    let ai = AiClient::new(config.ai.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        store: Arc::new(store),
        ai,
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
