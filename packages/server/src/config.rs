use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. No default — startup fails without one.
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub root_dir: String,
    pub max_artifact_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentsConfig {
    /// When true, document updates honor `expected_version` and conflict on
    /// mismatch. When false (the default) concurrent updates are
    /// last-writer-wins.
    pub optimistic_locking: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Seed the demo identities (user1/user2/user3) at startup.
    pub demo_users: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    pub api_url: String,
    /// When absent the AI endpoints answer 503 AI_UNAVAILABLE.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub documents: DocumentsConfig,
    pub seed: SeedConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://data/larkhub.db?mode=rwc")?
            .set_default("storage.root_dir", "./data/artifacts")?
            .set_default("storage.max_artifact_size", 64 * 1024 * 1024)?
            .set_default("documents.optimistic_locking", false)?
            .set_default("seed.demo_users", false)?
            .set_default("ai.api_url", "https://openrouter.ai/api/v1/chat/completions")?
            .set_default("ai.model", "anthropic/claude-3-haiku")?
            .set_default("ai.timeout_secs", 30)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., LARKHUB__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("LARKHUB").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
