use std::sync::Arc;

use common::storage::ArtifactStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::ai::AiClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ArtifactStore>,
    pub ai: AiClient,
    pub config: AppConfig,
}
